//! Error types shared across the crate

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by structural graph edits
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("node already exists: {0}")]
    DuplicateNode(String),

    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("node type already registered: {0}")]
    DuplicateNodeType(String),

    #[error("port not found: node {node}, port {port}")]
    PortNotFound { node: String, port: String },
}

/// Errors a plugin may return from `execute`
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("missing input '{0}'")]
    MissingInput(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("plugin execution failed: {0}")]
    Execution(String),
}

/// Errors from loading or saving project files
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("invalid canvas size {width} x {height} mm")]
    InvalidCanvas { width: f64, height: f64 },

    #[error("failed to access project file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse project file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported project version {0}")]
    UnsupportedVersion(String),
}

/// Errors from external data fetchers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("fetch failed: {0}")]
    Failed(String),

    #[error("fetch worker disconnected")]
    Disconnected,
}
