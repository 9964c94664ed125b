//! treeshift-ast: Syntax Trees You Can Edit and Print Back
//!
//! This crate provides the tree layer for treeshift:
//!
//! - [`Node`]: an owned, shared, mutable syntax tree node with identity
//! - [`NodePath`]: a node plus its parent linkage, for in-place replacement
//! - [`Parser`] / [`TreeSitterParser`]: source text to tree
//! - [`Printer`] / [`DiffPrinter`]: tree back to text, reusing the original
//!   text for every region that was not modified
//!
//! # Example
//!
//! ```rust,ignore
//! use treeshift_ast::{DiffPrinter, NodePath, Parser, Printer, TreeSitterParser};
//!
//! let root = TreeSitterParser::javascript().parse("var foo;\n")?;
//! let path = NodePath::root(root.clone());
//! let ident = path.get(0)?.get(1)?.get(0)?;
//! ident.replace(treeshift_ast::Node::leaf("identifier", "bar"))?;
//!
//! let file = root.source_file();
//! assert_eq!(DiffPrinter::default().print(&root, file.as_deref())?, "var bar;\n");
//! ```

pub mod error;
pub mod ir;
pub mod parser;
pub mod path;
pub mod printer;

pub use error::AstError;
pub use ir::{Edge, LanguageId, Node, NodeId, NodeSnapshot, Origin, Slot, SourceFile, Span};
pub use parser::{grammar, Parser, TreeSitterParser};
pub use path::NodePath;
pub use printer::{DiffPrinter, PrintOptions, Printer};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
