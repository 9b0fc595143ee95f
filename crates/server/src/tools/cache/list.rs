//! cache_list tool implementation.
//!
//! Lists the keys stored in one region.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellkeep_core::{CacheStore, Region};

use crate::tools::json_result;

/// Parameters for the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListParams {
    /// Region to list: "staging", "content" or "manifest_record" (full
    /// region names are accepted too).
    pub region: String,
}

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    pub region: String,
    pub exists: bool,
    pub keys: Vec<String>,
}

/// Implementation of the cache_list tool.
pub async fn list_impl(store: &dyn CacheStore, params: CacheListParams) -> Result<CallToolResult, McpError> {
    let region: Region = params.region.parse()?;

    let output = CacheListOutput {
        region: region.name().to_string(),
        exists: store.has_region(region).await?,
        keys: store.keys(region).await?,
    };
    json_result(&output)
}
