//! Tool registry and dispatcher for MCP tool handlers.
//!
//! Provides a `ToolHandler` trait for implementing tools and a `ToolRegistry`
//! that lists them in a stable order and dispatches calls to them. Handler
//! outcomes stay a tagged `Result` internally; they are flattened into the
//! uniform `CallToolResult` envelope only here, at the dispatch boundary.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool as McpTool};

use crate::project::ProjectContext;
use crate::runtime::RuntimeSnapshot;

/// Context passed to tool handlers during execution.
///
/// Handlers read project files and process state only through this value,
/// never from ambient globals.
#[derive(Clone)]
pub struct ToolContext {
    pub project: Arc<ProjectContext>,
    pub runtime: Arc<RuntimeSnapshot>,
}

/// Trait for handling MCP tool invocations.
///
/// Each tool implements this trait to define its schema and execution logic.
pub trait ToolHandler: Send + Sync {
    /// Returns the tool's name (e.g., "list_dependencies").
    fn name(&self) -> &str;

    /// Returns the tool's description.
    fn description(&self) -> &str;

    /// Returns the input schema for this tool. Properties may declare a
    /// `default`, which the dispatcher applies when the argument is omitted.
    fn input_schema(&self) -> JsonObject;

    /// Executes the tool with the given arguments.
    fn execute(
        &self,
        args: JsonObject,
        ctx: &ToolContext,
    ) -> Pin<Box<dyn Future<Output = Result<CallToolResult>> + Send + '_>>;

    /// Converts this handler to an `McpTool` for use in `list_tools`.
    fn to_mcp_tool(&self) -> McpTool {
        use std::borrow::Cow;

        McpTool {
            name: Cow::Owned(self.name().to_string()),
            title: None,
            description: Some(Cow::Owned(self.description().to_string())),
            input_schema: Arc::new(self.input_schema()),
            output_schema: None,
            annotations: None,
            icons: None,
            meta: None,
        }
    }
}

/// Registry for managing tool handlers.
///
/// Handlers are kept in registration order so `list_tools` is stable.
#[derive(Clone)]
pub struct ToolRegistry {
    handlers: Vec<Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register a tool handler from a type that implements `ToolHandler`.
    pub fn register_handler<T: ToolHandler + 'static>(mut self, handler: T) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Get a tool handler by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.iter().find(|h| h.name() == name).cloned()
    }

    /// List all registered tool names, in registration order.
    pub fn list_names(&self) -> Vec<String> {
        self.handlers.iter().map(|h| h.name().to_string()).collect()
    }

    /// Get all registered tools as `McpTool` instances for `list_tools`.
    pub fn list_tools(&self) -> Vec<McpTool> {
        self.handlers.iter().map(|h| h.to_mcp_tool()).collect()
    }

    /// Check if a tool with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.iter().any(|h| h.name() == name)
    }

    /// Return the number of registered tools.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Return `true` if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Dispatch a tool call, producing the uniform result envelope.
    ///
    /// Per-call failures never escape as errors: an unknown tool name or a
    /// handler failure both come back as an error-flagged `CallToolResult`.
    pub async fn dispatch(&self, name: &str, args: JsonObject, ctx: &ToolContext) -> CallToolResult {
        let Some(handler) = self.get(name) else {
            return error_result(format!("Unknown tool: {name}"));
        };

        let args = apply_defaults(&handler.input_schema(), args);

        match handler.execute(args, ctx).await {
            Ok(result) => result,
            Err(e) => error_result(format!("Error: {e}")),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Insert schema-declared defaults for arguments missing from the input.
fn apply_defaults(schema: &JsonObject, mut args: JsonObject) -> JsonObject {
    if let Some(properties) = schema.get("properties").and_then(|v| v.as_object()) {
        for (name, property) in properties {
            if args.contains_key(name) {
                continue;
            }
            if let Some(default) = property.get("default") {
                args.insert(name.clone(), default.clone());
            }
        }
    }
    args
}

/// Build a successful result: one text block with a markdown heading and a
/// pretty-printed JSON payload.
pub(crate) fn report(heading: &str, payload: &serde_json::Value) -> Result<CallToolResult> {
    let text = format!("## {heading}\n\n{}", serde_json::to_string_pretty(payload)?);
    Ok(CallToolResult {
        content: vec![Content::text(text)],
        structured_content: None,
        is_error: Some(false),
        meta: None,
    })
}

/// Build an error-flagged result with a single text block.
fn error_result(text: String) -> CallToolResult {
    CallToolResult {
        content: vec![Content::text(text)],
        structured_content: None,
        is_error: Some(true),
        meta: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_context(dir: &TempDir) -> ToolContext {
        ToolContext {
            project: Arc::new(ProjectContext::new(dir.path())),
            runtime: Arc::new(RuntimeSnapshot::capture("BUN_")),
        }
    }

    /// Stub handler that echoes its (post-default) arguments back as JSON.
    struct EchoHandler;

    impl ToolHandler for EchoHandler {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo arguments for testing"
        }

        fn input_schema(&self) -> JsonObject {
            let mut schema = JsonObject::new();
            schema.insert("type".to_string(), json!("object"));
            schema.insert(
                "properties".to_string(),
                json!({
                    "mode": {"type": "string", "default": "all"},
                    "label": {"type": "string"}
                }),
            );
            schema
        }

        fn execute(
            &self,
            args: JsonObject,
            _ctx: &ToolContext,
        ) -> Pin<Box<dyn Future<Output = Result<CallToolResult>> + Send + '_>> {
            Box::pin(async move { report("Echo", &serde_json::Value::Object(args)) })
        }
    }

    /// Stub handler that always fails.
    struct FailingHandler;

    impl ToolHandler for FailingHandler {
        fn name(&self) -> &str {
            "failing"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        fn input_schema(&self) -> JsonObject {
            let mut schema = JsonObject::new();
            schema.insert("type".to_string(), json!("object"));
            schema.insert("properties".to_string(), json!({}));
            schema
        }

        fn execute(
            &self,
            _args: JsonObject,
            _ctx: &ToolContext,
        ) -> Pin<Box<dyn Future<Output = Result<CallToolResult>> + Send + '_>> {
            Box::pin(async move { anyhow::bail!("No package.json found in project root") })
        }
    }

    fn first_text(result: &CallToolResult) -> &str {
        result.content[0].as_text().map(|t| t.text.as_str()).unwrap()
    }

    #[tokio::test]
    async fn dispatch_unknown_tool_returns_error_envelope() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(&dir);

        // Holds for an empty registry too.
        let empty = ToolRegistry::new();
        let result = empty.dispatch("nonexistent", JsonObject::new(), &ctx).await;
        assert_eq!(result.is_error, Some(true));
        assert!(first_text(&result).starts_with("Unknown tool:"));

        let registry = ToolRegistry::new().register_handler(EchoHandler);
        let result = registry.dispatch("nonexistent", JsonObject::new(), &ctx).await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(first_text(&result), "Unknown tool: nonexistent");
    }

    #[tokio::test]
    async fn dispatch_applies_schema_defaults() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(&dir);
        let registry = ToolRegistry::new().register_handler(EchoHandler);

        let result = registry.dispatch("echo", JsonObject::new(), &ctx).await;
        assert_eq!(result.is_error, Some(false));
        // `mode` has a default and must be filled in; `label` has none.
        assert!(first_text(&result).contains("\"mode\": \"all\""));
        assert!(!first_text(&result).contains("label"));
    }

    #[tokio::test]
    async fn dispatch_does_not_override_explicit_arguments() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(&dir);
        let registry = ToolRegistry::new().register_handler(EchoHandler);

        let mut args = JsonObject::new();
        args.insert("mode".to_string(), json!("dependencies"));
        let result = registry.dispatch("echo", args, &ctx).await;
        assert!(first_text(&result).contains("\"mode\": \"dependencies\""));
    }

    #[tokio::test]
    async fn dispatch_wraps_handler_failure() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(&dir);
        let registry = ToolRegistry::new().register_handler(FailingHandler);

        let result = registry.dispatch("failing", JsonObject::new(), &ctx).await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(
            first_text(&result),
            "Error: No package.json found in project root"
        );
    }

    #[test]
    fn list_tools_preserves_registration_order() {
        let registry = ToolRegistry::new()
            .register_handler(FailingHandler)
            .register_handler(EchoHandler);

        assert_eq!(registry.list_names(), vec!["failing", "echo"]);
        let tools = registry.list_tools();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "failing");
        assert_eq!(tools[1].name, "echo");
        assert!(registry.contains("echo"));
        assert!(!registry.contains("missing"));
    }
}
