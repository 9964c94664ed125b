//! Collection capability table
//!
//! Plugins extend collections by installing named methods here. The table
//! lives on the [`Core`](crate::Core), and collections look methods up at
//! call time, so a method installed after a collection was created is still
//! callable on it.

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::core::collection::Collection;
use crate::core::error::{CoreError, Result};

/// An installed collection method
pub type Method = Arc<dyn Fn(&Collection, &[Value]) -> anyhow::Result<MethodOutput> + Send + Sync>;

/// What a collection method returns
#[derive(Debug, Clone)]
pub enum MethodOutput {
    /// A new (or the same) collection, for chaining
    Collection(Collection),
    /// Plain data
    Value(Value),
    Unit,
}

impl MethodOutput {
    pub fn into_collection(self) -> Option<Collection> {
        match self {
            MethodOutput::Collection(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            MethodOutput::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Collection> for MethodOutput {
    fn from(collection: Collection) -> Self {
        MethodOutput::Collection(collection)
    }
}

impl From<Value> for MethodOutput {
    fn from(value: Value) -> Self {
        MethodOutput::Value(value)
    }
}

/// Named methods available on every collection of one core
#[derive(Default)]
pub struct MethodTable {
    methods: RwLock<IndexMap<String, Method>>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `method` under `name`. Names are never overwritten.
    pub fn install(&self, name: &str, method: Method) -> Result<()> {
        let mut methods = self.methods.write();
        if methods.contains_key(name) {
            return Err(CoreError::DuplicateMethod {
                name: name.to_string(),
            });
        }
        tracing::debug!(method = name, "installing collection method");
        methods.insert(name.to_string(), method);
        Ok(())
    }

    /// Look up a method. The returned handle is independent of the table
    /// lock, so the method may itself install or call methods.
    pub fn get(&self, name: &str) -> Option<Method> {
        self.methods.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.read().contains_key(name)
    }

    /// Installed names in installation order
    pub fn names(&self) -> Vec<String> {
        self.methods.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.methods.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.read().is_empty()
    }

    pub fn clear(&self) {
        self.methods.write().clear();
    }
}

impl fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodTable")
            .field("methods", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: Value) -> Method {
        Arc::new(move |_: &Collection, _: &[Value]| Ok(MethodOutput::Value(value.clone())))
    }

    #[test]
    fn test_install_and_get() {
        let table = MethodTable::new();
        table.install("answer", constant(Value::from(42))).unwrap();
        assert!(table.contains("answer"));
        assert!(table.get("answer").is_some());
        assert!(table.get("question").is_none());
    }

    #[test]
    fn test_duplicate_install_is_rejected() {
        let table = MethodTable::new();
        table.install("size", constant(Value::from(1))).unwrap();
        let err = table.install("size", constant(Value::from(2))).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateMethod { ref name } if name == "size"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_names_in_install_order() {
        let table = MethodTable::new();
        assert!(table.is_empty());
        table.install("zeta", constant(Value::Null)).unwrap();
        table.install("alpha", constant(Value::Null)).unwrap();
        assert_eq!(table.names(), vec!["zeta", "alpha"]);
        assert!(format!("{table:?}").contains("zeta"));
    }

    #[test]
    fn test_method_output_accessors() {
        assert_eq!(
            MethodOutput::from(Value::from("x")).into_value(),
            Some(Value::from("x"))
        );
        assert!(MethodOutput::Unit.into_value().is_none());
        assert!(MethodOutput::Unit.into_collection().is_none());
    }
}
