//! MCP server handler implementation.
//!
//! The server is the worker's host runtime: each tool call is one lifecycle
//! event or one page request, routed to the shared `Worker`.
use std::sync::Arc;

use crate::tools::{
    CacheListParams, CachePurgeParams, SwFetchParams, SwMessageParams, cache, fetch::fetch_impl, lifecycle,
    message::message_impl, status::status_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use shellkeep_core::{Fetcher, Worker, WorkerHost};

/// The main MCP server handler for shellkeep.
#[derive(Clone)]
pub struct ShellkeepServer {
    worker: Worker,
    host: Arc<WorkerHost>,
    /// Default network handling for requests the worker passes through.
    network: Arc<dyn Fetcher>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ShellkeepServer {
    /// Create a new server handler around a worker and its host.
    pub fn new(worker: Worker, host: Arc<WorkerHost>, network: Arc<dyn Fetcher>) -> Self {
        Self { worker, host, network, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Fire the install event: fetch the app shell bypassing HTTP caches and stage it. Fails if any shell resource cannot be fetched."
    )]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        lifecycle::install_impl(&self.worker, &self.host).await
    }

    #[tool(
        description = "Fire the activate event: evict stale content against the previous manifest, promote the staged shell and claim pages. Rolls back to empty caches on failure."
    )]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        lifecycle::activate_impl(&self.worker, &self.host).await
    }

    #[tool(
        description = "Route a page request through the worker. Reports whether it was served from cache, the network, or passed through."
    )]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, self.network.as_ref(), params.0).await
    }

    #[tool(description = "Post a page message to the worker: \"skipWaiting\" or \"downloadOffline\".")]
    async fn sw_message(&self, params: Parameters<SwMessageParams>) -> Result<CallToolResult, McpError> {
        message_impl(&self.worker, &self.host, params.0).await
    }

    #[tool(description = "List the keys stored in a cache region (staging, content or manifest_record).")]
    async fn cache_list(&self, params: Parameters<CacheListParams>) -> Result<CallToolResult, McpError> {
        cache::list_impl(self.worker.store().as_ref(), params.0).await
    }

    #[tool(description = "Delete a cache region, or \"all\" regions. The next activate after purging everything is a fresh install.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        cache::purge_impl(self.worker.store().as_ref(), params.0).await
    }

    #[tool(description = "Report the worker state, manifest digests and region entry counts.")]
    async fn worker_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.worker, &self.host).await
    }
}

impl ServerHandler for ShellkeepServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "shellkeep".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Host runtime for a Flutter web app-shell cache. Call sw_install then sw_activate once per deployment, \
                 then sw_fetch for page requests."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
