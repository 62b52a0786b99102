//! Tool handler registry and the built-in project-inspection tools.
//!
//! This module provides a simple way to register and invoke tool handlers,
//! making it easy to add new tools without modifying the core `ServerHandler`
//! implementation.

mod registry;

pub use registry::{ToolContext, ToolHandler, ToolRegistry};

// Tool handler implementations
mod analyze_package;
mod list_dependencies;
mod project_info;
mod runtime_info;

pub use analyze_package::AnalyzePackageHandler;
pub use list_dependencies::ListDependenciesHandler;
pub use project_info::ProjectInfoHandler;
pub use runtime_info::RuntimeInfoHandler;
