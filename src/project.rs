//! Project state access: the manifest and well-known project files.
//!
//! Every handler call re-reads the filesystem through `ProjectContext`;
//! nothing here is cached, so two calls may legitimately observe different
//! file states.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The project's primary metadata file.
pub const MANIFEST_FILE: &str = "package.json";

/// Bun runtime configuration file.
pub const RUNTIME_CONFIG_FILE: &str = "bunfig.toml";

/// TypeScript configuration file.
pub const TYPE_CONFIG_FILE: &str = "tsconfig.json";

/// Entry-point filenames probed by `get_project_info`, in report order.
pub const ENTRY_POINT_CANDIDATES: &[&str] = &[
    "src/index.ts",
    "src/index.js",
    "index.ts",
    "index.js",
    "app.ts",
    "app.js",
    "server.ts",
    "server.js",
];

/// Parsed `package.json`. All fields are optional so that partial manifests
/// parse; unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Manifest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub scripts: BTreeMap<String, String>,
    pub dependencies: BTreeMap<String, String>,
    pub dev_dependencies: BTreeMap<String, String>,
    pub peer_dependencies: BTreeMap<String, String>,
    /// Bun-specific configuration block, shape left to the project.
    pub bun: Option<serde_json::Value>,
    pub trusted_dependencies: Option<serde_json::Value>,
    pub workspaces: Option<serde_json::Value>,
}

/// Read-only view of a project directory, shared by tool handlers and the
/// resource catalog.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    root: PathBuf,
}

impl ProjectContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a project-relative path.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Point-in-time existence probe. Not cached.
    pub fn file_exists(&self, rel: &str) -> bool {
        self.path(rel).is_file()
    }

    pub fn read_to_string(&self, rel: &str) -> Result<String> {
        std::fs::read_to_string(self.path(rel))
            .with_context(|| format!("Failed to read file {rel}"))
    }

    /// Whether a manifest exists right now.
    pub fn manifest_exists(&self) -> bool {
        self.file_exists(MANIFEST_FILE)
    }

    /// Read and parse the manifest. Fails if the file is missing or is not
    /// valid JSON.
    pub fn manifest(&self) -> Result<Manifest> {
        let raw = self.read_to_string(MANIFEST_FILE)?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {MANIFEST_FILE}"))
    }
}
