//! MCP tool implementations.
//!
//! Each tool drives one host-side lever of the worker lifecycle and answers
//! with pretty-printed JSON text.

pub mod cache;
pub mod fetch;
pub mod lifecycle;
pub mod message;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use shellkeep_core::Error;

pub use cache::{CacheListParams, CachePurgeParams};
pub use fetch::SwFetchParams;
pub use message::SwMessageParams;

/// Serialize a tool output into a successful text result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Pull the JSON text back out of a tool result.
#[cfg(test)]
pub(crate) fn result_json(result: &CallToolResult) -> serde_json::Value {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
