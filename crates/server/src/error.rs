//! Errors raised by the server surface itself.
//!
//! Lifecycle and store failures arrive as `shellkeep_core::Error`; these
//! cover what only the host side can get wrong.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Structured errors for the shellkeep server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid tool parameters (e.g., empty URL).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// A spawned lifecycle task panicked or was cancelled.
    #[error("TASK_FAILED: {0}")]
    TaskFailed(String),
}

impl From<ServerError> for McpError {
    fn from(err: ServerError) -> Self {
        let code = match &err {
            ServerError::InvalidInput(_) => -32602,
            ServerError::TaskFailed(_) => -32603,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
