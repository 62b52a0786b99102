//! Resource catalog: well-known project files exposed as MCP resources.
//!
//! Listing probes a fixed candidate set on every call (no caching), so the
//! catalog always reflects the filesystem at call time. Reads accept only
//! `file://` URIs and resolve relative paths against the project root.

use std::sync::Arc;

use rmcp::model::{
    AnnotateAble, RawResource, ReadResourceResult, Resource, ResourceContents,
};

use crate::project::{MANIFEST_FILE, ProjectContext, RUNTIME_CONFIG_FILE, TYPE_CONFIG_FILE};

/// A well-known project file the catalog probes for.
struct WellKnownFile {
    name: &'static str,
    mime_type: &'static str,
    description: &'static str,
}

/// Candidate set, in listing order.
const WELL_KNOWN_FILES: &[WellKnownFile] = &[
    WellKnownFile {
        name: MANIFEST_FILE,
        mime_type: "application/json",
        description: "Project package.json file",
    },
    WellKnownFile {
        name: RUNTIME_CONFIG_FILE,
        mime_type: "application/toml",
        description: "Bun configuration file",
    },
    WellKnownFile {
        name: TYPE_CONFIG_FILE,
        mime_type: "application/json",
        description: "TypeScript configuration file",
    },
];

/// Error types for resource operations.
#[derive(Debug)]
pub enum ResourceError {
    /// URI does not use the `file://` scheme.
    InvalidScheme(String),
    /// URI path contains traversal segments or unsafe bytes. Absolute paths
    /// are accepted and read as-is.
    InvalidPath(String),
    /// The file could not be read.
    Unreadable {
        path: String,
        source: std::io::Error,
    },
}

impl std::fmt::Display for ResourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceError::InvalidScheme(uri) => {
                write!(f, "Only file:// URIs are supported, got: {uri}")
            }
            ResourceError::InvalidPath(uri) => write!(f, "Invalid resource path: {uri}"),
            ResourceError::Unreadable { path, source } => {
                write!(f, "Failed to read file {path}: {source}")
            }
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Unreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Infer a MIME type from the file extension. Unrecognized extensions fall
/// back to plain text.
pub fn mime_for_path(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("json") => "application/json",
        Some("toml") => "application/toml",
        Some("ts") => "application/typescript",
        Some("js") => "application/javascript",
        Some("md") => "text/markdown",
        _ => "text/plain",
    }
}

/// Serves well-known project files as addressable resources.
#[derive(Clone)]
pub struct ResourceCatalog {
    project: Arc<ProjectContext>,
}

impl ResourceCatalog {
    pub fn new(project: Arc<ProjectContext>) -> Self {
        Self { project }
    }

    /// List descriptors for the well-known files that exist right now.
    /// Stable order, no side effects, never fails.
    pub fn list(&self) -> Vec<Resource> {
        WELL_KNOWN_FILES
            .iter()
            .filter(|file| self.project.file_exists(file.name))
            .map(|file| {
                RawResource {
                    uri: format!("file://{}", file.name),
                    name: file.name.to_string(),
                    title: None,
                    description: Some(file.description.to_string()),
                    mime_type: Some(file.mime_type.to_string()),
                    size: None,
                    icons: None,
                    meta: None,
                }
                .no_annotation()
            })
            .collect()
    }

    /// Read a resource by URI. The scheme is checked before any filesystem
    /// access; read failures carry the underlying cause.
    pub fn read(&self, uri: &str) -> Result<ReadResourceResult, ResourceError> {
        let Some(rel) = uri.strip_prefix("file://") else {
            return Err(ResourceError::InvalidScheme(uri.to_string()));
        };

        if rel.is_empty() || rel.contains("../") || rel.contains("..\\") || rel.contains('\0') {
            return Err(ResourceError::InvalidPath(uri.to_string()));
        }

        let text = std::fs::read_to_string(self.project.path(rel)).map_err(|source| {
            ResourceError::Unreadable {
                path: rel.to_string(),
                source,
            }
        })?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::TextResourceContents {
                uri: uri.to_string(),
                mime_type: Some(mime_for_path(rel).to_string()),
                text,
                meta: None,
            }],
        })
    }
}
