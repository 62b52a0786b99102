// Core modules
mod client;
mod config;
mod project;
mod resources;
mod runtime;
mod tools;

pub mod server;

// Re-export key types and functions
pub use client::{ClientError, DEFAULT_PROGRAM, DEFAULT_TIMEOUT, DxCli, FsOperation};
pub use config::{DEFAULT_ENV_PREFIX, ServerConfig};
pub use project::{Manifest, ProjectContext};
pub use resources::{ResourceCatalog, ResourceError};
pub use runtime::RuntimeSnapshot;
pub use server::{McpServer, create_server, serve_stdio};
pub use tools::{ToolContext, ToolHandler, ToolRegistry};
