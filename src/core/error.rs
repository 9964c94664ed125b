//! Error types for treeshift
//!
//! This module provides structured error handling using thiserror.

use std::path::PathBuf;
use thiserror::Error;
use treeshift_ast::AstError;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while normalizing input, serializing collections
/// or registering plugins
#[derive(Error, Debug)]
pub enum CoreError {
    /// The value matches none of the recognized input shapes
    #[error("Unsupported input kind: {kind} (expected source text, a node, a path, or a sequence of nodes or paths)")]
    InvalidInput { kind: String },

    /// Parser or printer failure, passed through untouched
    #[error(transparent)]
    Ast(#[from] AstError),

    /// `to_source` on elements that do not share one root
    #[error("Cannot print a collection spanning {count} unrelated roots")]
    MultipleRoots { count: usize },

    /// No method of that name has been installed
    #[error("Unknown collection method: {name}")]
    UnknownMethod { name: String },

    /// A method of that name is already installed
    #[error("Collection method already installed: {name}")]
    DuplicateMethod { name: String },

    /// An installed method returned an error
    #[error("Collection method '{name}' failed: {source}")]
    Method {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// A plugin returned an error from its setup
    #[error("Plugin setup failed: {0}")]
    Plugin(#[source] anyhow::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Config file not found
    #[error("Config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// IO error while reading configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    /// Wrap an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CoreError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        CoreError::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(kind: impl Into<String>) -> Self {
        CoreError::InvalidInput { kind: kind.into() }
    }

    /// The collaborator error, if this is one
    pub fn as_ast(&self) -> Option<&AstError> {
        match self {
            CoreError::Ast(err) => Some(err),
            CoreError::WithContext { source, .. } => source.as_ast(),
            _ => None,
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(ctx))
    }
}
