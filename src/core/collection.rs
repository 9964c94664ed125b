//! Collections of node paths
//!
//! A [`Collection`] is an ordered list of [`NodePath`]s bound to the
//! [`Core`] that created it. It carries an element kind tag, the built-in
//! traversal helpers, access to every method installed on its core, and
//! serialization back to source text.

use serde_json::Value;
use std::fmt;
use treeshift_ast::{Node, NodePath};

use crate::core::entry::Core;
use crate::core::error::{CoreError, Result};
use crate::core::methods::MethodOutput;

/// Element kind tag of a collection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Empty, or elements of more than one kind
    Generic,
    /// Every element has this node kind
    Kind(String),
}

impl ElementKind {
    /// Most specific tag shared by every element
    pub fn infer(paths: &[NodePath]) -> Self {
        let mut kinds = paths.iter().map(|p| p.node().kind());
        let Some(first) = kinds.next() else {
            return ElementKind::Generic;
        };
        if kinds.all(|k| k == first) {
            ElementKind::Kind(first.to_string())
        } else {
            ElementKind::Generic
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, ElementKind::Generic)
    }

    /// Node kind name, or `None` for the generic tag
    pub fn name(&self) -> Option<&str> {
        match self {
            ElementKind::Generic => None,
            ElementKind::Kind(kind) => Some(kind),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Generic => write!(f, "Node"),
            ElementKind::Kind(kind) => write!(f, "{kind}"),
        }
    }
}

/// Ordered node paths plus the core they belong to
#[derive(Clone)]
pub struct Collection {
    paths: Vec<NodePath>,
    kind: ElementKind,
    core: Core,
}

impl Collection {
    /// Wrap `paths` exactly as given
    pub fn new(paths: Vec<NodePath>, core: &Core) -> Self {
        let kind = ElementKind::infer(&paths);
        tracing::trace!(len = paths.len(), %kind, "creating collection");
        Self {
            paths,
            kind,
            core: core.clone(),
        }
    }

    /// New collection on the same core
    pub fn with_paths(&self, paths: Vec<NodePath>) -> Self {
        Self::new(paths, &self.core)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NodePath> {
        self.paths.get(index)
    }

    pub fn paths(&self) -> &[NodePath] {
        &self.paths
    }

    /// Current node of each element
    pub fn nodes(&self) -> Vec<Node> {
        self.paths.iter().map(NodePath::node).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodePath> {
        self.paths.iter()
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    /// Whether every element has node kind `kind` (false when empty)
    pub fn is_of_kind(&self, kind: &str) -> bool {
        self.kind.name() == Some(kind)
    }

    /// Single-element collection, empty when out of range
    pub fn at(&self, index: usize) -> Self {
        self.with_paths(self.paths.get(index).cloned().into_iter().collect())
    }

    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&NodePath) -> bool,
    {
        self.with_paths(self.paths.iter().filter(|p| predicate(p)).cloned().collect())
    }

    pub fn for_each<F>(&self, mut f: F) -> &Self
    where
        F: FnMut(&NodePath, usize),
    {
        for (i, path) in self.paths.iter().enumerate() {
            f(path, i);
        }
        self
    }

    /// Replace each element by the paths `f` returns for it, in order
    pub fn map_paths<F, I>(&self, f: F) -> Self
    where
        F: FnMut(&NodePath) -> I,
        I: IntoIterator<Item = NodePath>,
    {
        self.with_paths(self.paths.iter().flat_map(f).collect())
    }

    /// Every descendant path (preorder) of every element, in element order
    pub fn descendants(&self) -> Self {
        self.map_paths(|p| p.descendants())
    }

    /// Root path of each distinct tree the elements live in, first-seen order
    pub fn roots(&self) -> Vec<NodePath> {
        let mut roots: Vec<NodePath> = Vec::new();
        for path in &self.paths {
            let root = path.root_path();
            let node = root.node();
            if !roots.iter().any(|r| Node::ptr_eq(&r.node(), &node)) {
                roots.push(root.clone());
            }
        }
        roots
    }

    /// Print the tree this collection lives in.
    ///
    /// An empty collection prints as the empty string. Elements spread over
    /// more than one tree are an error; otherwise the shared root is printed,
    /// reusing the text it was parsed from for every untouched region.
    pub fn to_source(&self) -> Result<String> {
        match self.roots().as_slice() {
            [] => Ok(String::new()),
            [root] => {
                let node = root.node();
                let original = node.source_file();
                tracing::debug!(kind = %node.kind(), diff_aware = original.is_some(), "printing collection");
                Ok(self.core.printer().print(&node, original.as_deref())?)
            }
            roots => Err(CoreError::MultipleRoots { count: roots.len() }),
        }
    }

    /// Invoke an installed method by name
    pub fn call(&self, name: &str, args: &[Value]) -> Result<MethodOutput> {
        let method = self
            .core
            .methods()
            .get(name)
            .ok_or_else(|| CoreError::UnknownMethod {
                name: name.to_string(),
            })?;
        tracing::trace!(method = name, len = self.len(), "calling collection method");
        method(self, args).map_err(|source| CoreError::Method {
            name: name.to_string(),
            source,
        })
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.core.methods().contains(name)
    }

    pub fn method_names(&self) -> Vec<String> {
        self.core.methods().names()
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("kind", &self.kind)
            .field("len", &self.paths.len())
            .finish()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a NodePath;
    type IntoIter = std::slice::Iter<'a, NodePath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CoreConfig;
    use std::sync::Arc;

    fn core() -> Core {
        Core::new(CoreConfig::default()).unwrap()
    }

    fn identifiers(collection: &Collection) -> Collection {
        collection
            .descendants()
            .filter(|p| p.node().is_kind("identifier"))
    }

    #[test]
    fn test_element_kind_inference() {
        let a = NodePath::root(Node::leaf("identifier", "a"));
        let b = NodePath::root(Node::leaf("identifier", "b"));
        let n = NodePath::root(Node::leaf("number", "1"));

        assert_eq!(ElementKind::infer(&[]), ElementKind::Generic);
        assert_eq!(
            ElementKind::infer(&[a.clone(), b]),
            ElementKind::Kind("identifier".to_string())
        );
        assert_eq!(ElementKind::infer(&[a, n]), ElementKind::Generic);
    }

    #[test]
    fn test_element_kind_display() {
        assert_eq!(ElementKind::Generic.to_string(), "Node");
        assert_eq!(ElementKind::Kind("program".into()).to_string(), "program");
        assert!(ElementKind::Generic.is_generic());
    }

    #[test]
    fn test_collection_of_parsed_text() {
        let collection = core().wrap("var foo;\n").unwrap();
        assert_eq!(collection.len(), 1);
        assert!(collection.is_of_kind("program"));
        assert!(!collection.is_of_kind("identifier"));
    }

    #[test]
    fn test_traversal_helpers() {
        let collection = core().wrap("a(b, c);\n").unwrap();
        let ids = identifiers(&collection);
        assert_eq!(ids.len(), 3);
        assert!(ids.is_of_kind("identifier"));

        let names: Vec<String> = ids.nodes().iter().filter_map(Node::text).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        assert_eq!(ids.at(1).nodes()[0].text().as_deref(), Some("b"));
        assert!(ids.at(9).is_empty());

        let mut seen = Vec::new();
        ids.for_each(|_, i| seen.push(i));
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn test_to_source_of_empty_collection() {
        let empty = core().wrap(Vec::<Node>::new()).unwrap();
        assert_eq!(empty.to_source().unwrap(), "");
        assert!(empty.kind().is_generic());
    }

    #[test]
    fn test_to_source_prints_shared_root() {
        let source = "foo(1);\nbar(2);\n";
        let collection = core().wrap(source).unwrap();
        let ids = identifiers(&collection);
        ids.paths()[0].replace(Node::leaf("identifier", "baz")).unwrap();

        assert_eq!(ids.to_source().unwrap(), "baz(1);\nbar(2);\n");
        assert_eq!(collection.to_source().unwrap(), "baz(1);\nbar(2);\n");
    }

    #[test]
    fn test_to_source_rejects_multiple_roots() {
        let core = core();
        let first = core.parse("a;").unwrap();
        let second = core.parse("b;").unwrap();
        let collection = core.wrap(vec![first, second]).unwrap();

        let err = collection.to_source().unwrap_err();
        assert!(matches!(err, CoreError::MultipleRoots { count: 2 }));
    }

    #[test]
    fn test_roots_are_deduplicated_by_identity() {
        let collection = core().wrap("x + y;\n").unwrap();
        let ids = identifiers(&collection);
        assert_eq!(ids.len(), 2);
        assert_eq!(ids.roots().len(), 1);
    }

    #[test]
    fn test_call_unknown_method() {
        let collection = core().wrap("x;").unwrap();
        let err = collection.call("nope", &[]).unwrap_err();
        assert!(matches!(err, CoreError::UnknownMethod { ref name } if name == "nope"));
    }

    #[test]
    fn test_call_installed_method() {
        let core = core();
        core.install("size", |c: &Collection, _: &[Value]| {
            Ok(MethodOutput::Value(Value::from(c.len())))
        })
        .unwrap();

        let collection = core.wrap("x;").unwrap();
        assert!(collection.has_method("size"));
        assert_eq!(collection.method_names(), vec!["size"]);
        let out = collection.call("size", &[]).unwrap();
        assert_eq!(out.into_value(), Some(Value::from(1)));
    }

    #[test]
    fn test_method_errors_are_wrapped() {
        let core = core();
        core.methods()
            .install(
                "fail",
                Arc::new(|_: &Collection, _: &[Value]| -> anyhow::Result<MethodOutput> {
                    anyhow::bail!("always fails")
                }),
            )
            .unwrap();

        let err = core.wrap("x;").unwrap().call("fail", &[]).unwrap_err();
        assert!(matches!(err, CoreError::Method { ref name, .. } if name == "fail"));
        assert!(err.to_string().contains("always fails"));
    }

    #[test]
    fn test_debug_is_compact() {
        let collection = core().wrap("x;").unwrap();
        let debug = format!("{collection:?}");
        assert!(debug.contains("len: 1"));
        assert!(debug.contains("program"));
    }
}
