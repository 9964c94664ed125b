//! treeshift - Collections over editable syntax trees
//!
//! This library is the entry point of a source-to-source transformation
//! toolkit. It turns source text, nodes or node paths into a [`Collection`],
//! lets plugins extend every collection with named methods, and prints the
//! (possibly edited) tree back to source text, keeping the original
//! formatting of everything that was not touched.
//!
//! # Architecture
//!
//! - **treeshift-ast**: node model, paths, tree-sitter parser, diff-aware printer
//! - **core** (this crate): entry point, input normalization, collections,
//!   plugin registry
//!
//! # Example
//!
//! ```rust,ignore
//! use treeshift::{wrap, Node};
//!
//! let program = wrap("var foo;\n")?;
//! let ids = program
//!     .descendants()
//!     .filter(|p| p.node().is_kind("identifier"));
//! ids.paths()[0].replace(Node::leaf("identifier", "bar"))?;
//! assert_eq!(program.to_source()?, "var bar;\n");
//! ```

pub mod core;

pub use crate::core::{
    global_core, normalize, use_plugin, wrap, Collection, Core, CoreConfig, CoreError, ElementKind,
    Input, Method, MethodOutput, MethodTable, PluginFn, PluginKey, PluginRegistry, Result,
    ResultExt, CONFIG_FILE_NAME,
};

/// The tree layer
pub use treeshift_ast as ast;
pub use treeshift_ast::{
    AstError, DiffPrinter, LanguageId, Node, NodePath, Parser, PrintOptions, Printer, SourceFile,
    TreeSitterParser,
};

/// Returns the version of the treeshift library
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
