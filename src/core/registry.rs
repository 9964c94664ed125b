//! Plugin registry
//!
//! A plugin is a plain function that receives the [`Core`] it is attached
//! to, so it can install collection methods (or register further plugins).
//! Each distinct function runs at most once per core; identity is the
//! function itself, not its name or what it does.

use indexmap::IndexSet;
use parking_lot::Mutex;

use crate::core::entry::Core;

/// Plugin setup function
pub type PluginFn = fn(&Core) -> anyhow::Result<()>;

/// Identity of a plugin function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginKey(usize);

impl PluginKey {
    pub fn of(plugin: PluginFn) -> Self {
        Self(plugin as usize)
    }
}

/// Set of plugins that have been applied to a core, in registration order
#[derive(Debug, Default)]
pub struct PluginRegistry {
    applied: Mutex<IndexSet<PluginKey>>,
}

impl PluginRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a plugin; false if it was already recorded.
    ///
    /// The lock is released before returning so the caller can invoke the
    /// plugin without holding it.
    pub fn record(&self, key: PluginKey) -> bool {
        self.applied.lock().insert(key)
    }

    pub fn contains(&self, key: PluginKey) -> bool {
        self.applied.lock().contains(&key)
    }

    pub fn is_registered(&self, plugin: PluginFn) -> bool {
        self.contains(PluginKey::of(plugin))
    }

    pub fn len(&self) -> usize {
        self.applied.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.lock().is_empty()
    }

    /// Applied plugins in registration order
    pub fn keys(&self) -> Vec<PluginKey> {
        self.applied.lock().iter().copied().collect()
    }

    /// Forget every recorded plugin
    pub fn reset(&self) {
        self.applied.lock().clear();
    }
}
