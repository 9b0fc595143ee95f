//! worker_status tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::Serialize;
use shellkeep_core::{Worker, WorkerHost, WorkerState, WorkerStatus};

use super::json_result;

/// Output from the worker_status tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WorkerStatusOutput {
    pub state: WorkerState,
    pub skip_waiting_requested: bool,
    pub clients_claimed: bool,
    #[serde(flatten)]
    pub status: WorkerStatus,
}

/// Implementation of the worker_status tool.
pub async fn status_impl(worker: &Worker, host: &WorkerHost) -> Result<CallToolResult, McpError> {
    let output = WorkerStatusOutput {
        state: host.state(),
        skip_waiting_requested: host.skip_waiting_requested(),
        clients_claimed: host.clients_claimed(),
        status: worker.status().await?,
    };
    json_result(&output)
}
