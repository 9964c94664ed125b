//! Core module for treeshift
//!
//! # Architecture
//!
//! - `entry`: [`Core`], the process-wide default, `wrap` and `use_plugin`
//! - `input`: input shapes and normalization into paths
//! - `collection`: [`Collection`] and its element kind tag
//! - `methods`: the per-core table of plugin-installed collection methods
//! - `registry`: once-only plugin bookkeeping
//! - `config`: `.treeshift.json` loading
//! - `error`: error types using thiserror

pub mod collection;
pub mod config;
pub mod entry;
pub mod error;
pub mod input;
pub mod methods;
pub mod registry;

// Re-export commonly used types
pub use collection::{Collection, ElementKind};
pub use config::{CoreConfig, CONFIG_FILE_NAME};
pub use entry::{global_core, use_plugin, wrap, Core};
pub use error::{CoreError, Result, ResultExt};
pub use input::{normalize, Input};
pub use methods::{Method, MethodOutput, MethodTable};
pub use registry::{PluginFn, PluginKey, PluginRegistry};
