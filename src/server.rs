//! MCP server implementation using rmcp.
//!
//! Implements the stdio MCP surface: `tools/list`, `tools/call`,
//! `resources/list`, and `resources/read`. Per-call failures are answered
//! through the uniform result envelope; only transport establishment is
//! fatal.

use std::sync::Arc;

use anyhow::Result;
use rmcp::{
    ErrorData as McpError,
    ServiceExt,
    handler::server::ServerHandler,
    model::*,
    service::{NotificationContext, RequestContext, RoleServer},
    transport::stdio,
};

use crate::config::ServerConfig;
use crate::project::ProjectContext;
use crate::resources::{ResourceCatalog, ResourceError};
use crate::runtime::RuntimeSnapshot;
use crate::tools::{
    AnalyzePackageHandler, ListDependenciesHandler, ProjectInfoHandler, RuntimeInfoHandler,
    ToolContext, ToolRegistry,
};

/// MCP server that answers protocol requests by inspecting local project
/// files through the tool registry and resource catalog.
#[derive(Clone)]
pub struct McpServer {
    registry: Arc<ToolRegistry>,
    catalog: ResourceCatalog,
    context: ToolContext,
}

impl McpServer {
    /// Create a server over the given registry and project root.
    pub fn new(
        registry: Arc<ToolRegistry>,
        project: Arc<ProjectContext>,
        runtime: Arc<RuntimeSnapshot>,
    ) -> Self {
        Self {
            registry,
            catalog: ResourceCatalog::new(project.clone()),
            context: ToolContext { project, runtime },
        }
    }

    /// Get the tool registry.
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }
}

impl ServerHandler for McpServer {
    fn ping(
        &self,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<(), McpError>> + Send + '_ {
        std::future::ready(Ok(()))
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let result = ListToolsResult {
            tools: self.registry.list_tools(),
            next_cursor: None,
            ..Default::default()
        };
        std::future::ready(Ok(result))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let tool_name = request.name.to_string();
        let args = request.arguments.unwrap_or_default();
        let registry = self.registry.clone();
        let ctx = self.context.clone();

        async move {
            // Unknown tools and handler failures are per-call results, never
            // protocol errors.
            Ok(registry.dispatch(&tool_name, args, &ctx).await)
        }
    }

    fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        let result = ListResourcesResult {
            meta: None,
            resources: self.catalog.list(),
            next_cursor: None,
        };
        std::future::ready(Ok(result))
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        let catalog = self.catalog.clone();
        let uri = request.uri.to_string();

        async move {
            match catalog.read(&uri) {
                Ok(result) => Ok(result),
                Err(e @ (ResourceError::InvalidScheme(_) | ResourceError::InvalidPath(_))) => {
                    // -32602: Invalid params (per MCP spec for invalid URI)
                    Err(McpError::invalid_params(e.to_string(), None))
                }
                Err(e @ ResourceError::Unreadable { .. }) => {
                    // -32002: Resource not found (custom error code per MCP spec)
                    Err(McpError::new(ErrorCode(-32002), e.to_string(), None))
                }
            }
        }
    }

    fn on_initialized(
        &self,
        _context: NotificationContext<RoleServer>,
    ) -> impl Future<Output = ()> + Send + '_ {
        std::future::ready(())
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Developer-experience bridge that reports project metadata, runtime \
                 diagnostics, and dependency information for the Bun project in its \
                 working directory."
                    .to_string(),
            ),
        }
    }
}

/// Create a fully configured MCP server: runtime snapshot, project context,
/// and the four built-in tools.
pub fn create_server(config: ServerConfig) -> McpServer {
    let project = Arc::new(ProjectContext::new(&config.root));
    let runtime = Arc::new(RuntimeSnapshot::capture(&config.env_prefix));

    let registry = ToolRegistry::new()
        .register_handler(ProjectInfoHandler)
        .register_handler(RuntimeInfoHandler)
        .register_handler(ListDependenciesHandler)
        .register_handler(AnalyzePackageHandler);

    McpServer::new(Arc::new(registry), project, runtime)
}

/// Run the server over stdio until the session ends.
///
/// Failing to establish the transport is fatal and propagates to the caller;
/// everything after that is answered per call.
pub async fn serve_stdio(server: McpServer) -> Result<()> {
    let service = server
        .serve(stdio())
        .await
        .inspect_err(|e| tracing::error!("serving error: {:?}", e))?;

    tracing::info!("dx-mcp server running on stdio");

    // Block until the MCP session ends.
    service.waiting().await?;
    Ok(())
}
