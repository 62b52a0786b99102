//! Server configuration.
//!
//! The server needs very little: which directory to treat as the project
//! root, and which environment-variable prefix the runtime snapshot filters
//! on. Everything else is re-read from the filesystem on every call.

use std::path::PathBuf;

/// Default prefix used to filter environment variables in the runtime
/// snapshot. Bun projects use `BUN_`; override for other ecosystems.
pub const DEFAULT_ENV_PREFIX: &str = "BUN_";

/// Configuration for a dx-mcp server instance.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Project root that handlers and the resource catalog read from.
    pub root: PathBuf,
    /// Environment-variable prefix exposed by `get_runtime_info`.
    pub env_prefix: String,
}

impl ServerConfig {
    /// Create a configuration rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// Override the environment-variable filter prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(root)
    }
}
