//! Path references: a node plus the linkage needed to edit it in place.
//!
//! A [`NodePath`] remembers its parent path and the [`Slot`] of the parent's
//! node that holds it. Replacing through a path writes the new node into the
//! parent, which marks the parent modified so the printer re-emits only that
//! region.
//!
//! Child paths are materialized on demand and cached weakly on the parent,
//! so asking for the same live child twice yields the same path.

use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::{AstError, Result};
use crate::ir::{Node, Slot};

struct PathInner {
    node: RwLock<Node>,
    parent: Option<NodePath>,
    name: Option<Slot>,
    children: Mutex<BTreeMap<usize, Weak<PathInner>>>,
}

/// A location inside a syntax tree
#[derive(Clone)]
pub struct NodePath(Arc<PathInner>);

impl NodePath {
    /// Root path for a bare node (no parent, no slot)
    pub fn root(node: Node) -> Self {
        Self::with_parent(node, None, None)
    }

    fn with_parent(node: Node, parent: Option<NodePath>, name: Option<Slot>) -> Self {
        NodePath(Arc::new(PathInner {
            node: RwLock::new(node),
            parent,
            name,
            children: Mutex::new(BTreeMap::new()),
        }))
    }

    pub fn node(&self) -> Node {
        self.0.node.read().clone()
    }

    pub fn parent(&self) -> Option<&NodePath> {
        self.0.parent.as_ref()
    }

    /// Slot of the parent's node that holds this path's node
    pub fn name(&self) -> Option<&Slot> {
        self.0.name.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }

    /// Two paths are the same element when they point at the same node
    pub fn same_element(&self, other: &NodePath) -> bool {
        Node::ptr_eq(&self.node(), &other.node())
    }

    /// Identity of the path object itself
    pub fn ptr_eq(a: &NodePath, b: &NodePath) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Path to the child at `index` of this path's node
    pub fn get(&self, index: usize) -> Result<NodePath> {
        let node = self.node();
        let child = node.child(index).ok_or_else(|| AstError::InvalidSlot {
            kind: node.kind().to_string(),
            index,
            len: node.child_count(),
        })?;

        let mut cache = self.0.children.lock();
        if let Some(existing) = cache.get(&index).and_then(Weak::upgrade) {
            let existing = NodePath(existing);
            // The node may have been edited directly since the path was cached
            if Node::ptr_eq(&existing.node(), &child) {
                return Ok(existing);
            }
        }

        let slot = node.slot(index).unwrap_or_else(|| Slot::index(index));
        let path = NodePath::with_parent(child, Some(self.clone()), Some(slot));
        cache.insert(index, Arc::downgrade(&path.0));
        Ok(path)
    }

    /// Path to the first child stored under `field`
    pub fn get_field(&self, field: &str) -> Option<NodePath> {
        let node = self.node();
        let index = (0..node.child_count())
            .find(|&i| node.slot(i).and_then(|s| s.field).as_deref() == Some(field))?;
        self.get(index).ok()
    }

    /// Paths to every child, in order
    pub fn children(&self) -> Vec<NodePath> {
        (0..self.node().child_count())
            .filter_map(|i| self.get(i).ok())
            .collect()
    }

    /// This path and every descendant path, in pre-order
    pub fn descendants(&self) -> Vec<NodePath> {
        let mut out = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(path) = stack.pop() {
            let children = path.children();
            out.push(path);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Parent, grandparent, ... up to the root
    pub fn ancestors(&self) -> impl Iterator<Item = &NodePath> {
        std::iter::successors(self.parent(), |p| p.parent())
    }

    pub fn root_path(&self) -> &NodePath {
        self.ancestors().last().unwrap_or(self)
    }

    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Check that the parent's node still holds this path's node at its slot
    pub fn check_linkage(&self) -> bool {
        match (self.parent(), self.name()) {
            (None, None) => true,
            (Some(parent), Some(slot)) => parent
                .node()
                .child(slot.index)
                .map(|held| Node::ptr_eq(&held, &self.node()))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Replace this path's node, writing it into the parent's slot.
    ///
    /// Returns the node that was replaced. Fails if the parent no longer
    /// holds this path's node at its slot.
    pub fn replace(&self, node: Node) -> Result<Node> {
        if let (Some(parent), Some(slot)) = (self.parent(), self.name()) {
            if !self.check_linkage() {
                return Err(AstError::StalePath {
                    parent_kind: parent.node().kind().to_string(),
                    index: slot.index,
                });
            }
            parent.node().set_child(slot.index, node.clone())?;
        }

        let old = std::mem::replace(&mut *self.0.node.write(), node);
        self.0.children.lock().clear();
        tracing::trace!(kind = %old.kind(), "replaced node through path");
        Ok(old)
    }
}

impl fmt::Debug for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodePath")
            .field("node", &self.node())
            .field("name", &self.name())
            .field("depth", &self.depth())
            .finish()
    }
}
