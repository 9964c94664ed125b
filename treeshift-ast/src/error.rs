//! Error types for treeshift-ast
//!
//! Parser and printer failures are surfaced to callers as-is; the core never
//! rewraps them with its own message.

use crate::ir::LanguageId;
use thiserror::Error;

/// Errors from tree operations, parsing and printing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AstError {
    /// Source text could not be parsed into a tree without errors
    #[error("Parse error at line {line}, column {column}: {message}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    /// No grammar is bundled for the requested language
    #[error("Unsupported language: {}", .0.name())]
    UnsupportedLanguage(LanguageId),

    /// Tree-sitter specific error
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),

    /// Printing a tree back to text failed
    #[error("Print error: {0}")]
    PrintError(String),

    /// A child slot does not exist on the node
    #[error("Invalid slot {index} on '{kind}' node with {len} children")]
    InvalidSlot {
        kind: String,
        index: usize,
        len: usize,
    },

    /// A path no longer matches its parent's node at its slot
    #[error("Stale path: parent '{parent_kind}' no longer holds this node at slot {index}")]
    StalePath { parent_kind: String, index: usize },

    /// A node was attached inside its own subtree
    #[error("Cannot attach '{kind}' node inside its own subtree")]
    CyclicTree { kind: String },

}

impl AstError {
    /// Create a parse error at a 1-indexed line and column
    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        AstError::ParseError {
            message: message.into(),
            line,
            column,
        }
    }

    /// Create a print error
    pub fn print_error(message: impl Into<String>) -> Self {
        AstError::PrintError(message.into())
    }

    /// Whether this error came out of the parser
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            AstError::ParseError { .. } | AstError::TreeSitterError(_)
        )
    }
}

/// Result type alias for AstError
pub type Result<T> = std::result::Result<T, AstError>;
