//! sw_fetch tool implementation.
//!
//! Routes one page request through the worker. Same-origin GETs the worker
//! does not govern are fetched straight from the network, as a host would do
//! when no worker answers. Other methods and foreign origins are declined
//! without any network traffic.

use std::collections::BTreeMap;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellkeep_core::{CachedResponse, FetchOutcome, FetchRequest, Fetcher, ResponseSource, Worker};

use super::json_result;
use crate::error::ServerError;

/// Bodies longer than this are cut off in the tool output.
const PREVIEW_CHARS: usize = 4096;

/// Parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL the page requested.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default)]
    pub method: Option<String>,
}

/// Who produced the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Served {
    Cache,
    Network,
    /// Not governed by the worker; fetched directly.
    Passthrough,
    /// Non-GET or foreign-origin request; nothing was fetched.
    Declined,
}

/// Output from the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    pub served: Served,
    /// Absent when the request was declined.
    pub status: Option<u16>,
    pub headers: BTreeMap<String, String>,
    pub body_bytes: usize,
    /// UTF-8 body, cut to a preview; absent for binary bodies.
    pub body: Option<String>,
    pub truncated: bool,
}

impl SwFetchOutput {
    fn new(served: Served, response: &CachedResponse) -> Self {
        let (body, truncated) = match std::str::from_utf8(&response.body) {
            Ok(text) if text.chars().count() > PREVIEW_CHARS => (Some(text.chars().take(PREVIEW_CHARS).collect()), true),
            Ok(text) => (Some(text.to_string()), false),
            Err(_) => (None, false),
        };

        Self {
            served,
            status: Some(response.status),
            headers: response.headers.clone(),
            body_bytes: response.body.len(),
            body,
            truncated,
        }
    }

    fn declined() -> Self {
        Self {
            served: Served::Declined,
            status: None,
            headers: BTreeMap::new(),
            body_bytes: 0,
            body: None,
            truncated: false,
        }
    }
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl(
    worker: &Worker, network: &dyn Fetcher, params: SwFetchParams,
) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(ServerError::InvalidInput("url must not be empty".into()).into());
    }

    let mut request = FetchRequest::get(params.url.trim());
    if let Some(method) = params.method {
        request = request.with_method(method);
    }

    let output = match worker.fetch(&request).await? {
        FetchOutcome::Respond { response, source } => {
            let served = match source {
                ResponseSource::Cache => Served::Cache,
                ResponseSource::Network => Served::Network,
            };
            SwFetchOutput::new(served, &response)
        }
        FetchOutcome::Passthrough => {
            if !request.is_read() || worker.origin().request_key(&request.url).is_none() {
                tracing::debug!(url = %request.url, method = %request.method, "declined ungoverned request");
                SwFetchOutput::declined()
            } else {
                let response = network.fetch(&request).await?;
                SwFetchOutput::new(Served::Passthrough, &response)
            }
        }
    };

    json_result(&output)
}
