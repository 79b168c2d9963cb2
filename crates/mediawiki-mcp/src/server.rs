//! The MCP server.
//!
//! [`WikiMcpServer`] implements rmcp's `ServerHandler` by delegating
//! `list_tools` and `call_tool` to a [`ToolRegistry`]. It is cheap to clone:
//! the streamable-HTTP transport creates one per session.

use std::sync::Arc;

use mediawiki_client::WikiClient;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, ErrorData, Implementation, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::transport::stdio;
use rmcp::{ServerHandler, ServiceExt};
use serde_json::Value;
use tracing::info;

use crate::error::{Error, Result};
use crate::registry::{CompositeRegistry, ToolRegistry};
use crate::tools::{StatusTools, WikiTools};

/// Server name reported to MCP clients.
pub const SERVER_NAME: &str = "mcp-mediawiki";

/// Instructions reported to MCP clients.
pub const INSTRUCTIONS: &str = "MediaWiki MCP server for searching and retrieving wiki content.";

/// Server metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Name in the `initialize` response.
    pub name: String,
    /// Version in the `initialize` response.
    pub version: String,
    /// Usage instructions for the model.
    pub instructions: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            instructions: INSTRUCTIONS.to_string(),
        }
    }
}

/// MCP server over a tool registry.
#[derive(Clone)]
pub struct WikiMcpServer {
    registry: Arc<dyn ToolRegistry>,
    config: ServerConfig,
}

impl WikiMcpServer {
    /// Create a server for `registry` with default metadata.
    pub fn new<R: ToolRegistry + 'static>(registry: R) -> Self {
        Self {
            registry: Arc::new(registry),
            config: ServerConfig::default(),
        }
    }

    /// The five wiki tools over `client`.
    pub fn for_client(client: Arc<WikiClient>) -> Self {
        let registry = CompositeRegistry::new()
            .add(WikiTools::new(Arc::clone(&client)))
            .add(StatusTools::new(client));
        Self::new(registry)
    }

    /// Override the reported server name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Override the reported version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    /// Server metadata.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// All registered tools.
    pub fn tools(&self) -> Vec<Tool> {
        self.registry.tools()
    }

    /// Run the named tool.
    ///
    /// Unknown names fail with `invalid_params`.
    pub async fn dispatch(
        &self,
        name: &str,
        args: Value,
    ) -> std::result::Result<CallToolResult, ErrorData> {
        match self.registry.call(name, args) {
            Some(future) => future.await,
            None => Err(ErrorData::invalid_params(
                format!("Unknown tool: {name}"),
                None,
            )),
        }
    }

    /// Serve MCP over stdin/stdout until the client disconnects.
    pub async fn serve_stdio(self) -> Result<()> {
        info!(
            tools = self.registry.tool_count(),
            "Serving {} over stdio", self.config.name
        );
        let service = self
            .serve(stdio())
            .await
            .map_err(|e| Error::transport(e.to_string()))?;
        service
            .waiting()
            .await
            .map_err(|e| Error::transport(e.to_string()))?;
        info!("stdio client disconnected");
        Ok(())
    }
}

impl std::fmt::Debug for WikiMcpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WikiMcpServer")
            .field("config", &self.config)
            .field("tools", &self.registry.tool_count())
            .finish()
    }
}

impl ServerHandler for WikiMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::default();
        server_info.name = self.config.name.clone();
        server_info.version = self.config.version.clone();

        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info = server_info;
        info.instructions = Some(self.config.instructions.clone());
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.registry.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, ErrorData> {
        let args = request.arguments.map(Value::Object).unwrap_or(Value::Null);
        self.dispatch(&request.name, args).await
    }
}
