//! Handler for the `get_project_info` tool.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use rmcp::model::{CallToolResult, JsonObject};
use serde_json::json;

use crate::project::{ENTRY_POINT_CANDIDATES, MANIFEST_FILE, RUNTIME_CONFIG_FILE};
use crate::tools::registry::report;
use crate::tools::{ToolContext, ToolHandler};

/// Longest raw `bunfig.toml` preview included in the report.
const RUNTIME_CONFIG_PREVIEW_CHARS: usize = 500;

/// Reports project metadata: manifest fields, runtime config preview, and
/// detected entry points. A missing manifest means omitted fields, not a
/// failure.
pub struct ProjectInfoHandler;

impl ToolHandler for ProjectInfoHandler {
    fn name(&self) -> &str {
        "get_project_info"
    }

    fn description(&self) -> &str {
        "Get information about the current Bun project (package.json, bunfig.toml, entry points)"
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
        let project = ctx.project.clone();
        let runtime = ctx.runtime.clone();

        Box::pin(async move {
            let mut info = serde_json::Map::new();
            info.insert("cwd".to_string(), json!(runtime.cwd.display().to_string()));
            info.insert("serverVersion".to_string(), json!(env!("CARGO_PKG_VERSION")));

            if project.file_exists(MANIFEST_FILE) {
                match project.manifest() {
                    Ok(manifest) => {
                        info.insert(
                            "packageJson".to_string(),
                            json!({
                                "name": manifest.name,
                                "version": manifest.version,
                                "description": manifest.description,
                                "scripts": manifest.scripts,
                                "bun": manifest.bun,
                            }),
                        );
                    }
                    // An unparseable manifest is reported, not fatal.
                    Err(e) => {
                        info.insert("packageJsonError".to_string(), json!(e.to_string()));
                    }
                }
            }

            if project.file_exists(RUNTIME_CONFIG_FILE) {
                match project.read_to_string(RUNTIME_CONFIG_FILE) {
                    Ok(raw) => {
                        info.insert("bunfigExists".to_string(), json!(true));
                        info.insert("bunfigRaw".to_string(), json!(preview(&raw)));
                    }
                    Err(e) => {
                        info.insert("bunfigError".to_string(), json!(e.to_string()));
                    }
                }
            }

            let detected: Vec<&str> = ENTRY_POINT_CANDIDATES
                .iter()
                .copied()
                .filter(|candidate| project.file_exists(candidate))
                .collect();
            info.insert("detectedEntryPoints".to_string(), json!(detected));

            report("Bun Project Information", &serde_json::Value::Object(info))
        })
    }
}

/// Truncate the runtime config to a short preview, marking elision.
fn preview(raw: &str) -> String {
    if raw.chars().count() <= RUNTIME_CONFIG_PREVIEW_CHARS {
        return raw.to_string();
    }
    let mut out: String = raw.chars().take(RUNTIME_CONFIG_PREVIEW_CHARS).collect();
    out.push_str("...");
    out
}
