//! Handler for the `list_dependencies` tool.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use rmcp::model::{CallToolResult, JsonObject};
use serde_json::json;

use crate::tools::registry::report;
use crate::tools::{ToolContext, ToolHandler};

/// Accepted values for the `type` argument.
const DEPENDENCY_TYPES: &[&str] = &["all", "dependencies", "devDependencies", "peerDependencies"];

/// Lists dependency maps from the manifest, filtered by category. A category
/// absent from the manifest comes back as an empty object; a missing manifest
/// is a failure.
pub struct ListDependenciesHandler;

impl ToolHandler for ListDependenciesHandler {
    fn name(&self) -> &str {
        "list_dependencies"
    }

    fn description(&self) -> &str {
        "List project dependencies from package.json"
    }

    fn input_schema(&self) -> JsonObject {
        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert(
            "properties".to_string(),
            json!({
                "type": {
                    "type": "string",
                    "enum": DEPENDENCY_TYPES,
                    "default": "all",
                    "description": "Type of dependencies to list"
                }
            }),
        );
        schema.insert("required".to_string(), json!([]));
        schema
    }

    fn execute(
        &self,
        args: JsonObject,
        ctx: &ToolContext,
    ) -> Pin<Box<dyn Future<Output = Result<CallToolResult>> + Send + '_>> {
        let project = ctx.project.clone();

        Box::pin(async move {
            // The dispatcher applies the schema default; fall back anyway so
            // direct callers get the same behavior.
            let dep_type = args
                .get("type")
                .and_then(|v| v.as_str())
                .unwrap_or("all")
                .to_string();

            if !project.manifest_exists() {
                anyhow::bail!("No package.json found in {}", project.root().display());
            }
            let manifest = project.manifest()?;

            let mut deps = serde_json::Map::new();
            if dep_type == "all" || dep_type == "dependencies" {
                deps.insert("dependencies".to_string(), json!(manifest.dependencies));
            }
            if dep_type == "all" || dep_type == "devDependencies" {
                deps.insert(
                    "devDependencies".to_string(),
                    json!(manifest.dev_dependencies),
                );
            }
            if dep_type == "all" || dep_type == "peerDependencies" {
                deps.insert(
                    "peerDependencies".to_string(),
                    json!(manifest.peer_dependencies),
                );
            }

            report(
                &format!("Dependencies ({dep_type})"),
                &serde_json::Value::Object(deps),
            )
        })
    }
}
