//! sw_install and sw_activate tool implementations.
//!
//! The host fires install once the worker script is loaded, and activate
//! once the previous instance steps aside (immediately here, since install
//! always asks to skip waiting).

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::Serialize;
use shellkeep_core::{ActivateReport, Worker, WorkerHost, WorkerState};

use super::json_result;

/// Output from the sw_install tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SwInstallOutput {
    /// Shell paths now in the staging region.
    pub staged: Vec<String>,
    /// Digest of the manifest this worker was built for.
    pub manifest_digest: String,
    pub state: WorkerState,
}

/// Output from the sw_activate tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SwActivateOutput {
    #[serde(flatten)]
    pub report: ActivateReport,
    pub clients_claimed: bool,
    pub state: WorkerState,
}

/// Implementation of the sw_install tool.
pub async fn install_impl(worker: &Worker, host: &WorkerHost) -> Result<CallToolResult, McpError> {
    worker.install().await?;

    let output = SwInstallOutput {
        staged: worker.shell().paths().to_vec(),
        manifest_digest: worker.manifest().digest(),
        state: host.state(),
    };
    json_result(&output)
}

/// Implementation of the sw_activate tool.
///
/// Activation never fails; a rolled-back reconcile is reported in the output.
pub async fn activate_impl(worker: &Worker, host: &WorkerHost) -> Result<CallToolResult, McpError> {
    let report = worker.activate().await;

    let output = SwActivateOutput { report, clients_claimed: host.clients_claimed(), state: host.state() };
    json_result(&output)
}
