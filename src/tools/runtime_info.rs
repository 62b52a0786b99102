//! Handler for the `get_runtime_info` tool.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use rmcp::model::{CallToolResult, JsonObject};
use serde_json::json;

use crate::tools::registry::report;
use crate::tools::{ToolContext, ToolHandler};

/// Reports process diagnostics from the runtime snapshot: platform, arch,
/// filtered environment variables, cwd, pid, and uptime.
pub struct RuntimeInfoHandler;

impl ToolHandler for RuntimeInfoHandler {
    fn name(&self) -> &str {
        "get_runtime_info"
    }

    fn description(&self) -> &str {
        "Get runtime information and diagnostics for the dx-mcp server process"
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
        ctx: &ToolContext,
    ) -> Pin<Box<dyn Future<Output = Result<CallToolResult>> + Send + '_>> {
        let runtime = ctx.runtime.clone();

        Box::pin(async move {
            let payload = json!({
                "serverVersion": env!("CARGO_PKG_VERSION"),
                "platform": runtime.platform,
                "arch": runtime.arch,
                "environment": runtime.environment,
                "cwd": runtime.cwd.display().to_string(),
                "pid": runtime.pid,
                "uptime": runtime.uptime_secs(),
                "startedAt": runtime.started_at.to_rfc3339(),
                "envPrefix": runtime.env_prefix,
                "envVars": runtime.env_vars,
            });

            report("Runtime Information", &payload)
        })
    }
}
