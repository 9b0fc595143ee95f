//! cache_purge tool implementation.
//!
//! Deletes one region, or all of them. Purging ManifestRecord makes the
//! next activate a fresh install.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellkeep_core::{CacheStore, Region};

use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Region to delete, or "all" for every region.
    pub region: String,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Names of regions that existed and were deleted.
    pub deleted: Vec<String>,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(store: &dyn CacheStore, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    let regions: Vec<Region> = if params.region.eq_ignore_ascii_case("all") {
        Region::ALL.to_vec()
    } else {
        vec![params.region.parse()?]
    };

    let mut deleted = Vec::new();
    for region in regions {
        if store.delete_region(region).await? {
            deleted.push(region.name().to_string());
        }
    }

    tracing::info!(deleted = ?deleted, "purged cache regions");
    json_result(&CachePurgeOutput { deleted })
}
