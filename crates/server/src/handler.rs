//! MCP server handler implementation.
//!
//! Each tool is one of the host-facing surfaces of the worker: lifecycle
//! events, intercepted fetches, control messages, and cache inspection.
use std::sync::Arc;

use crate::tools::cache::{CacheKeysParams, keys_impl, list_impl};
use crate::tools::lifecycle::{activate_impl, install_impl};
use crate::tools::sw_fetch::{SwFetchParams, fetch_impl};
use crate::tools::sw_message::{SwMessageParams, message_impl};
use shellcache_client::Worker;

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

/// The MCP server handler wrapping one worker.
#[derive(Clone)]
pub struct ShellcacheServer {
    tool_router: ToolRouter<Self>,
    worker: Arc<Worker>,
}

#[tool_router]
impl ShellcacheServer {
    pub fn new(worker: Arc<Worker>) -> Self {
        Self { tool_router: Self::tool_router(), worker }
    }

    #[tool(description = "Install event: fetch every app-shell asset into the current shell cache. Fails as a whole if any asset fails.")]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.worker).await
    }

    #[tool(description = "Activate event: delete shell cache generations from other versions. Refused until sw_install has succeeded for the current version.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.worker).await
    }

    #[tool(description = "Intercept a request: route it to cache-first, network-first or passthrough handling and return the response.")]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a control message, e.g. {\"action\":\"cleanGiphyCache\",\"giphys\":[...]}. Unrecognized messages are ignored.")]
    async fn sw_message(&self, params: Parameters<SwMessageParams>) -> Result<CallToolResult, McpError> {
        message_impl(&self.worker, params.0).await
    }

    #[tool(description = "List cache generations with their entry counts.")]
    async fn cache_list(&self) -> Result<CallToolResult, McpError> {
        list_impl(self.worker.db()).await
    }

    #[tool(description = "List the entries stored in one cache.")]
    async fn cache_keys(&self, params: Parameters<CacheKeysParams>) -> Result<CallToolResult, McpError> {
        keys_impl(self.worker.db(), params.0).await
    }
}

impl ServerHandler for ShellcacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "shellcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
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
