//! Handler for the `analyze_package` tool.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use rmcp::model::{CallToolResult, JsonObject};
use serde_json::json;

use crate::project::RUNTIME_CONFIG_FILE;
use crate::tools::registry::report;
use crate::tools::{ToolContext, ToolHandler};

/// Scripts every Bun project is expected to declare.
const RECOMMENDED_SCRIPTS: &[&str] = &["build", "dev", "test", "lint"];

/// Substring that marks a script as Bun-specific.
const BUN_MARKER: &str = "bun";

/// Analyzes the manifest for Bun-specific configuration: marker scripts,
/// missing recommended scripts, runtime config, and optional manifest fields.
/// Fails when no manifest exists.
pub struct AnalyzePackageHandler;

impl ToolHandler for AnalyzePackageHandler {
    fn name(&self) -> &str {
        "analyze_package"
    }

    fn description(&self) -> &str {
        "Analyze package.json for Bun-specific configuration"
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

        Box::pin(async move {
            if !project.manifest_exists() {
                anyhow::bail!("No package.json found in {}", project.root().display());
            }
            let manifest = project.manifest()?;

            let has_bun_scripts = manifest
                .scripts
                .iter()
                .any(|(name, body)| name.contains(BUN_MARKER) || body.contains(BUN_MARKER));

            let missing_recommended: Vec<&str> = RECOMMENDED_SCRIPTS
                .iter()
                .copied()
                .filter(|script| !manifest.scripts.contains_key(*script))
                .collect();

            let analysis = json!({
                "name": manifest.name,
                "version": manifest.version,
                "hasBunScripts": has_bun_scripts,
                "missingRecommendedScripts": missing_recommended,
                "hasBunConfig": project.file_exists(RUNTIME_CONFIG_FILE),
                "bunSpecificFields": {
                    "hasBunField": manifest.bun.is_some(),
                    "hasTrustedDependencies": manifest.trusted_dependencies.is_some(),
                    "hasWorkspaceConfig": manifest.workspaces.is_some(),
                },
            });

            report("Package Analysis", &analysis)
        })
    }
}
