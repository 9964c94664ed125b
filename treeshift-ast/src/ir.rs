//! Core IR (Intermediate Representation) Types
//!
//! This module defines the owned syntax tree used by treeshift. All types are
//! designed for:
//!
//! 1. **Identity**: a [`Node`] is a shared handle; clones point at the same
//!    node and two handles are the same element only if [`Node::ptr_eq`] holds
//! 2. **Round-tripping**: parsed nodes remember the [`SourceFile`] and [`Span`]
//!    they came from, so an untouched subtree can be re-emitted verbatim
//! 3. **Serialization**: [`NodeSnapshot`] is the serde form of a tree

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::{AstError, Result};

// ============================================================================
// Language Identification
// ============================================================================

/// Language identifier for source text
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LanguageId {
    Rust,
    Python,
    TypeScript,
    JavaScript,
    Tsx,
    C,
    Cpp,
    Java,
    Go,
    Ruby,
    CSharp,
    Html,
    Css,
    Json,
    Bash,
    Unknown,
}

impl LanguageId {
    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rust => "Rust",
            Self::Python => "Python",
            Self::TypeScript => "TypeScript",
            Self::Tsx => "TSX",
            Self::JavaScript => "JavaScript",
            Self::C => "C",
            Self::Cpp => "C++",
            Self::Java => "Java",
            Self::Go => "Go",
            Self::Ruby => "Ruby",
            Self::CSharp => "C#",
            Self::Html => "HTML",
            Self::Css => "CSS",
            Self::Json => "JSON",
            Self::Bash => "Bash",
            Self::Unknown => "Unknown",
        }
    }
}

impl Default for LanguageId {
    fn default() -> Self {
        Self::JavaScript
    }
}

// ============================================================================
// Span and Source
// ============================================================================

/// A contiguous region in source code
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,

    /// End byte offset (exclusive)
    pub end: usize,

    /// Start line (1-indexed)
    pub start_line: usize,

    /// End line (1-indexed)
    pub end_line: usize,

    /// Start column (0-indexed, in bytes)
    pub start_column: usize,

    /// End column (0-indexed, in bytes)
    pub end_column: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize, start_line: usize, end_line: usize) -> Self {
        Self {
            start,
            end,
            start_line,
            end_line,
            start_column: 0,
            end_column: 0,
        }
    }

    /// Check if this span contains a byte offset
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Get the length in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// The original text a tree was parsed from.
///
/// Shared by every node of one parse; its address is its identity, so two
/// parses of the same text are still different files.
#[derive(Debug)]
pub struct SourceFile {
    text: String,
    language: LanguageId,
}

impl SourceFile {
    pub fn new(text: impl Into<String>, language: LanguageId) -> Arc<Self> {
        Arc::new(Self {
            text: text.into(),
            language,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> LanguageId {
        self.language
    }

    /// Text covered by `span`, if the span lies on char boundaries
    pub fn slice(&self, span: Span) -> Option<&str> {
        self.text.get(span.start..span.end)
    }

    /// Identity comparison
    pub fn same_file(a: &SourceFile, b: &SourceFile) -> bool {
        std::ptr::eq(a, b)
    }
}

/// Where a parsed node came from
#[derive(Clone)]
pub struct Origin {
    pub file: Arc<SourceFile>,
    pub span: Span,
}

impl fmt::Debug for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Origin")
            .field("language", &self.file.language())
            .field("span", &self.span)
            .finish()
    }
}

// ============================================================================
// Slots
// ============================================================================

/// Position of a child inside its parent node.
///
/// The index is authoritative; grammars may repeat a field name among
/// siblings, so the field label is carried for display and lookup only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slot {
    pub index: usize,
    pub field: Option<Arc<str>>,
}

impl Slot {
    pub fn new(index: usize, field: Option<Arc<str>>) -> Self {
        Self { index, field }
    }

    pub fn index(index: usize) -> Self {
        Self { index, field: None }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}[{}]", field, self.index),
            None => write!(f, "{}", self.index),
        }
    }
}

/// A child edge: optional field label plus the child node
#[derive(Debug, Clone)]
pub struct Edge {
    pub field: Option<Arc<str>>,
    pub node: Node,
}

// ============================================================================
// Node
// ============================================================================

/// Stable identity of a live node (its allocation address)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

struct NodeData {
    kind: Arc<str>,
    named: bool,
    text: Option<String>,
    children: Vec<Edge>,
    origin: Option<Origin>,
    modified: bool,
}

/// A syntax tree node.
///
/// `Node` is a handle: cloning it does not copy the node. Mutations made
/// through any handle are visible through all of them and mark the node
/// modified, which is what the printer uses to decide which regions to
/// re-emit.
#[derive(Clone)]
pub struct Node(Arc<RwLock<NodeData>>);

impl Node {
    fn from_data(data: NodeData) -> Self {
        Node(Arc::new(RwLock::new(data)))
    }

    /// Create a named branch node with no children
    pub fn new(kind: impl Into<Arc<str>>) -> Self {
        Self::from_data(NodeData {
            kind: kind.into(),
            named: true,
            text: None,
            children: Vec::new(),
            origin: None,
            modified: false,
        })
    }

    /// Create a named leaf node carrying literal text (e.g. an identifier)
    pub fn leaf(kind: impl Into<Arc<str>>, text: impl Into<String>) -> Self {
        Self::from_data(NodeData {
            kind: kind.into(),
            named: true,
            text: Some(text.into()),
            children: Vec::new(),
            origin: None,
            modified: false,
        })
    }

    /// Create an anonymous token whose kind is its own text (e.g. `;`)
    pub fn token(text: &str) -> Self {
        Self::from_data(NodeData {
            kind: Arc::from(text),
            named: false,
            text: Some(text.to_string()),
            children: Vec::new(),
            origin: None,
            modified: false,
        })
    }

    /// Build a node exactly as read from a parse; not marked modified
    pub(crate) fn parsed(
        kind: &str,
        named: bool,
        text: Option<String>,
        children: Vec<Edge>,
        origin: Origin,
    ) -> Self {
        Self::from_data(NodeData {
            kind: Arc::from(kind),
            named,
            text,
            children,
            origin: Some(origin),
            modified: false,
        })
    }

    /// Builder: append an unlabelled child
    pub fn with_child(self, child: Node) -> Self {
        self.0.write().children.push(Edge {
            field: None,
            node: child,
        });
        self
    }

    /// Builder: append a child under a field label
    pub fn with_field(self, field: &str, child: Node) -> Self {
        self.0.write().children.push(Edge {
            field: Some(Arc::from(field)),
            node: child,
        });
        self
    }

    // ------------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------------

    pub fn ptr_eq(a: &Node, b: &Node) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn id(&self) -> NodeId {
        NodeId(Arc::as_ptr(&self.0) as *const () as usize)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn kind(&self) -> Arc<str> {
        self.0.read().kind.clone()
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        &*self.0.read().kind == kind
    }

    pub fn is_named(&self) -> bool {
        self.0.read().named
    }

    /// Literal text of a leaf; `None` for branch nodes
    pub fn text(&self) -> Option<String> {
        self.0.read().text.clone()
    }

    pub fn is_leaf(&self) -> bool {
        self.0.read().children.is_empty()
    }

    pub fn child_count(&self) -> usize {
        self.0.read().children.len()
    }

    pub fn child(&self, index: usize) -> Option<Node> {
        self.0.read().children.get(index).map(|e| e.node.clone())
    }

    /// Slot of the child at `index`, with its field label
    pub fn slot(&self, index: usize) -> Option<Slot> {
        self.0
            .read()
            .children
            .get(index)
            .map(|e| Slot::new(index, e.field.clone()))
    }

    pub fn children(&self) -> Vec<Node> {
        self.0.read().children.iter().map(|e| e.node.clone()).collect()
    }

    pub fn edges(&self) -> Vec<Edge> {
        self.0.read().children.clone()
    }

    /// First child stored under `field`
    pub fn child_by_field(&self, field: &str) -> Option<Node> {
        self.0
            .read()
            .children
            .iter()
            .find(|e| e.field.as_deref() == Some(field))
            .map(|e| e.node.clone())
    }

    /// Index of `child` among this node's children, by identity
    pub fn index_of(&self, child: &Node) -> Option<usize> {
        self.0
            .read()
            .children
            .iter()
            .position(|e| Node::ptr_eq(&e.node, child))
    }

    pub fn span(&self) -> Option<Span> {
        self.0.read().origin.as_ref().map(|o| o.span)
    }

    /// The file this node was parsed from, if any
    pub fn source_file(&self) -> Option<Arc<SourceFile>> {
        self.0.read().origin.as_ref().map(|o| o.file.clone())
    }

    /// Span of this node if it was parsed from exactly `file`
    pub fn span_in(&self, file: &SourceFile) -> Option<Span> {
        self.0
            .read()
            .origin
            .as_ref()
            .filter(|o| SourceFile::same_file(&o.file, file))
            .map(|o| o.span)
    }

    /// Text this node was parsed from, ignoring later edits
    pub fn original_text(&self) -> Option<String> {
        let data = self.0.read();
        let origin = data.origin.as_ref()?;
        origin.file.slice(origin.span).map(str::to_string)
    }

    /// Whether this node itself was edited since it was created
    pub fn is_modified(&self) -> bool {
        self.0.read().modified
    }

    /// Whether this node or any descendant was edited
    pub fn is_subtree_modified(&self) -> bool {
        if self.is_modified() {
            return true;
        }
        self.children().iter().any(Node::is_subtree_modified)
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    pub fn set_text(&self, text: impl Into<String>) {
        let mut data = self.0.write();
        data.text = Some(text.into());
        data.modified = true;
    }

    /// Replace the child at `index`, keeping its field label; returns the old child
    pub fn set_child(&self, index: usize, child: Node) -> Result<Node> {
        self.reject_cycle(&child)?;
        let mut data = self.0.write();
        let len = data.children.len();
        let kind = data.kind.to_string();
        let edge = data
            .children
            .get_mut(index)
            .ok_or(AstError::InvalidSlot { kind, index, len })?;
        let old = std::mem::replace(&mut edge.node, child);
        data.modified = true;
        Ok(old)
    }

    pub fn push_child(&self, field: Option<&str>, child: Node) -> Result<()> {
        self.reject_cycle(&child)?;
        let mut data = self.0.write();
        data.children.push(Edge {
            field: field.map(Arc::from),
            node: child,
        });
        data.modified = true;
        Ok(())
    }

    pub fn insert_child(&self, index: usize, field: Option<&str>, child: Node) -> Result<()> {
        self.reject_cycle(&child)?;
        let mut data = self.0.write();
        let len = data.children.len();
        if index > len {
            return Err(AstError::InvalidSlot {
                kind: data.kind.to_string(),
                index,
                len,
            });
        }
        data.children.insert(
            index,
            Edge {
                field: field.map(Arc::from),
                node: child,
            },
        );
        data.modified = true;
        Ok(())
    }

    pub fn remove_child(&self, index: usize) -> Result<Node> {
        let mut data = self.0.write();
        let len = data.children.len();
        if index >= len {
            return Err(AstError::InvalidSlot {
                kind: data.kind.to_string(),
                index,
                len,
            });
        }
        let edge = data.children.remove(index);
        data.modified = true;
        Ok(edge.node)
    }

    /// A node may not be attached anywhere inside its own subtree
    fn reject_cycle(&self, child: &Node) -> Result<()> {
        if child.descendants().iter().any(|d| Node::ptr_eq(d, self)) {
            return Err(AstError::CyclicTree {
                kind: self.kind().to_string(),
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------------

    /// Compare kind, text and children recursively, ignoring identity
    pub fn structurally_eq(&self, other: &Node) -> bool {
        if Node::ptr_eq(self, other) {
            return true;
        }
        if self.kind() != other.kind() || self.text() != other.text() {
            return false;
        }
        let (a, b) = (self.edges(), other.edges());
        a.len() == b.len()
            && a.iter()
                .zip(b.iter())
                .all(|(x, y)| x.field == y.field && x.node.structurally_eq(&y.node))
    }

    /// Copy the subtree into fresh nodes; origins are kept so the copy still
    /// prints from the original text where it is unmodified
    pub fn deep_clone(&self) -> Node {
        let data = self.0.read();
        let children = data
            .children
            .iter()
            .map(|e| Edge {
                field: e.field.clone(),
                node: e.node.deep_clone(),
            })
            .collect();
        Self::from_data(NodeData {
            kind: data.kind.clone(),
            named: data.named,
            text: data.text.clone(),
            children,
            origin: data.origin.clone(),
            modified: data.modified,
        })
    }

    /// Pre-order list of this node and all descendants
    pub fn descendants(&self) -> Vec<Node> {
        let mut out = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            let children = node.children();
            out.push(node);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        self.snapshot_with_field(None)
    }

    fn snapshot_with_field(&self, field: Option<String>) -> NodeSnapshot {
        let data = self.0.read();
        NodeSnapshot {
            kind: data.kind.to_string(),
            named: data.named,
            field,
            text: data.text.clone(),
            span: data.origin.as_ref().map(|o| o.span),
            children: data
                .children
                .iter()
                .map(|e| e.node.snapshot_with_field(e.field.as_deref().map(str::to_string)))
                .collect(),
        }
    }

    /// Rebuild a detached tree from its snapshot (no origins)
    pub fn from_snapshot(snapshot: &NodeSnapshot) -> Node {
        let children = snapshot
            .children
            .iter()
            .map(|c| Edge {
                field: c.field.as_deref().map(Arc::from),
                node: Node::from_snapshot(c),
            })
            .collect();
        Self::from_data(NodeData {
            kind: Arc::from(snapshot.kind.as_str()),
            named: snapshot.named,
            text: snapshot.text.clone(),
            children,
            origin: None,
            modified: false,
        })
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.read();
        f.debug_struct("Node")
            .field("kind", &data.kind)
            .field("text", &data.text)
            .field("children", &data.children.len())
            .field("span", &data.origin.as_ref().map(|o| o.span))
            .field("modified", &data.modified)
            .finish()
    }
}

// ============================================================================
// Snapshot
// ============================================================================

fn default_named() -> bool {
    true
}

/// Serializable form of a node and its subtree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeSnapshot {
    pub kind: String,

    #[serde(default = "default_named")]
    pub named: bool,

    /// Field label under which the parent holds this node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Original location, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}
