//! sw_message tool implementation.
//!
//! Posts a page message to the worker. A spawned offline download is
//! awaited so the caller learns how it went.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellkeep_core::{ControlMessage, Worker, WorkerHost};

use super::json_result;
use crate::error::ServerError;

/// Parameters for the sw_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwMessageParams {
    /// Message payload: "skipWaiting" or "downloadOffline".
    pub data: String,
}

/// Output from the sw_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwMessageOutput {
    /// Whether the worker recognized the message.
    pub recognized: bool,
    pub skip_waiting_requested: bool,
    /// Resources stored by an offline download.
    pub downloaded: Option<usize>,
}

/// Implementation of the sw_message tool.
pub async fn message_impl(
    worker: &Worker, host: &WorkerHost, params: SwMessageParams,
) -> Result<CallToolResult, McpError> {
    let recognized = params.data.parse::<ControlMessage>().is_ok();

    let downloaded = match worker.on_message(&params.data) {
        Some(task) => {
            let stored = task
                .await
                .map_err(|e| ServerError::TaskFailed(format!("offline download: {e}")))??;
            Some(stored)
        }
        None => None,
    };

    let output = SwMessageOutput { recognized, skip_waiting_requested: host.skip_waiting_requested(), downloaded };
    json_result(&output)
}
