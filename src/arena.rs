//! Arena-backed tree storage.
//!
//! A [`Tree`] owns every node in a `generational_arena::Arena`; the outside
//! world holds [`NodeId`] handles and mutates through the tree. This gives
//! reference-node semantics (a mutation is visible through every handle to
//! the same node) without aliased mutable references, and the generational
//! indices detect stale handles after a subtree has been released.

use generational_arena::{Arena, Index};
use indexmap::IndexMap;
use itertools::Itertools;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::{TreeError, TreeResult};
use crate::value::Value;

/// Stable handle to a node inside a [`Tree`].
///
/// Copyable and cheap; remains valid until the node is released via
/// [`Tree::remove_subtree`] or [`Tree::prune`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) Index);

/// A single node: name, internal identity, linkage and attribute bag.
#[derive(Debug)]
pub struct Node {
    name: String,
    /// Internal unique identity, distinct from the (non-unique) name
    uid: Uuid,
    pub(crate) parent: Option<Index>,
    /// Child indices in insertion order
    pub(crate) children: Vec<Index>,
    /// Open attribute bag, insertion-ordered for deterministic column output
    attributes: IndexMap<String, Value>,
}

impl Node {
    fn new(name: impl Into<String>, parent: Option<Index>) -> Self {
        Self {
            name: name.into(),
            uid: Uuid::new_v4(),
            parent,
            children: Vec::new(),
            attributes: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uid(&self) -> Uuid {
        self.uid
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Arena-based tree structure.
///
/// One `Tree` holds exactly one primary root plus any subtrees that have been
/// detached from it (detached roots stay addressable and can be re-attached).
/// All operations are synchronous and whole-operation-blocking; the tree is
/// an exclusively owned mutable structure with no internal synchronization.
#[derive(Debug)]
pub struct Tree {
    arena: Arena<Node>,
    root: Index,
}

impl Tree {
    /// Creates a size-1 tree whose root carries the given name.
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(Node::new(root_name, None));
        Self { arena, root }
    }

    /// Handle of the primary root.
    pub fn root(&self) -> NodeId {
        NodeId(self.root)
    }

    /// Read access to a node's data; `None` for a stale handle.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id.0)
    }

    pub(crate) fn node(&self, id: NodeId) -> TreeResult<&Node> {
        self.arena
            .get(id.0)
            .ok_or_else(|| TreeError::InvalidHandle(format!("{:?}", id.0)))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> TreeResult<&mut Node> {
        self.arena
            .get_mut(id.0)
            .ok_or_else(|| TreeError::InvalidHandle(format!("{:?}", id.0)))
    }

    /// Node name. Names need not be unique across the tree or even among
    /// siblings; identity lives in the handle and [`Node::uid`].
    pub fn name(&self, id: NodeId) -> TreeResult<&str> {
        Ok(self.node(id)?.name())
    }

    // ------------------------------------------------------------------
    // Structural mutators
    // ------------------------------------------------------------------

    /// Creates a new child under `parent` and returns its handle, enabling
    /// chained construction. Duplicate sibling names are accepted; they make
    /// name-based child access ambiguous (see [`Tree::child_named`]).
    #[instrument(level = "trace", skip(self))]
    pub fn add_child(&mut self, parent: NodeId, name: &str) -> TreeResult<NodeId> {
        self.node(parent)?;
        let child = self.arena.insert(Node::new(name, Some(parent.0)));
        self.arena[parent.0].children.push(child);
        Ok(NodeId(child))
    }

    /// Creates a new parentless node in this tree's storage (root of its own
    /// size-1 subtree), for later attachment via [`Tree::add_child_node`].
    #[instrument(level = "trace", skip(self))]
    pub fn new_detached(&mut self, name: &str) -> NodeId {
        NodeId(self.arena.insert(Node::new(name, None)))
    }

    /// Attaches a detached node (with its whole subtree) as the last child of
    /// `parent`. Fails with [`TreeError::Structure`] if `node` still has a
    /// parent and with [`TreeError::Cycle`] if `node` is `parent` itself or
    /// one of its ancestors. On failure both subtrees are unchanged.
    #[instrument(level = "trace", skip(self))]
    pub fn add_child_node(&mut self, parent: NodeId, node: NodeId) -> TreeResult<NodeId> {
        self.node(parent)?;
        let node_name = self.node(node)?.name().to_string();
        if self.node(node)?.parent.is_some() {
            return Err(TreeError::Structure {
                node: node_name,
                reason: "node already has a parent, detach it first".to_string(),
            });
        }
        // Walking up from `parent` finds `node` iff attaching would close a cycle.
        let mut cursor = Some(parent.0);
        while let Some(idx) = cursor {
            if idx == node.0 {
                return Err(TreeError::Cycle {
                    node: node_name,
                    target: self.node(parent)?.name().to_string(),
                });
            }
            cursor = self.arena[idx].parent;
        }
        self.arena[node.0].parent = Some(parent.0);
        self.arena[parent.0].children.push(node.0);
        Ok(node)
    }

    /// Detaches the child named `name` and returns it; the detached child is
    /// a valid root of its own subtree and can be re-attached. Fails with
    /// [`TreeError::NotFound`] on a miss and [`TreeError::DuplicateName`]
    /// when the name is ambiguous among the siblings.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_child(&mut self, parent: NodeId, name: &str) -> TreeResult<NodeId> {
        let parent_name = self.node(parent)?.name().to_string();
        let matches: Vec<Index> = self.arena[parent.0]
            .children
            .iter()
            .copied()
            .filter(|&c| self.arena[c].name == name)
            .collect();
        match matches.len() {
            0 => Err(TreeError::NotFound {
                parent: parent_name,
                name: name.to_string(),
            }),
            1 => self.detach(NodeId(matches[0])),
            _ => Err(TreeError::DuplicateName {
                parent: parent_name,
                name: name.to_string(),
            }),
        }
    }

    /// Detaches `node` from its parent; a no-op on a node that is already a
    /// root. Ownership of the subtree passes to the caller's handle.
    #[instrument(level = "trace", skip(self))]
    pub fn detach(&mut self, node: NodeId) -> TreeResult<NodeId> {
        let parent = self.node(node)?.parent;
        if let Some(parent_idx) = parent {
            self.arena[parent_idx].children.retain(|&c| c != node.0);
            self.arena[node.0].parent = None;
        }
        Ok(node)
    }

    /// Detaches `node` and releases its whole subtree from the arena,
    /// invalidating every handle into it. Returns the number of nodes
    /// released. The primary root cannot be removed.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_subtree(&mut self, node: NodeId) -> TreeResult<usize> {
        if node.0 == self.root {
            return Err(TreeError::Structure {
                node: self.node(node)?.name().to_string(),
                reason: "cannot remove the tree root".to_string(),
            });
        }
        self.detach(node)?;
        let ids = self.collect_subtree(node.0);
        for idx in &ids {
            self.arena.remove(*idx);
        }
        Ok(ids.len())
    }

    fn collect_subtree(&self, start: Index) -> Vec<Index> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            out.push(idx);
            stack.extend(self.arena[idx].children.iter().copied());
        }
        out
    }

    // ------------------------------------------------------------------
    // Structural queries (computed on demand, never stored)
    // ------------------------------------------------------------------

    pub fn is_root(&self, id: NodeId) -> TreeResult<bool> {
        Ok(self.node(id)?.is_root())
    }

    pub fn is_leaf(&self, id: NodeId) -> TreeResult<bool> {
        Ok(self.node(id)?.is_leaf())
    }

    pub fn parent(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self.node(id)?.parent.map(NodeId))
    }

    /// Children in insertion order.
    pub fn children(&self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        Ok(self.node(id)?.children.iter().copied().map(NodeId).collect())
    }

    /// Siblings in parent order, excluding `id` itself. Empty for roots.
    pub fn siblings(&self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        match self.node(id)?.parent {
            Some(parent) => Ok(self.arena[parent]
                .children
                .iter()
                .copied()
                .filter(|&c| c != id.0)
                .map(NodeId)
                .collect()),
            None => Ok(Vec::new()),
        }
    }

    /// Ancestors ordered self→root, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut cursor = self.node(id)?.parent;
        while let Some(idx) = cursor {
            out.push(NodeId(idx));
            cursor = self.arena[idx].parent;
        }
        Ok(out)
    }

    /// Names from the subtree root down to `id`, inclusive.
    pub fn path(&self, id: NodeId) -> TreeResult<Vec<String>> {
        let mut names = vec![self.node(id)?.name().to_string()];
        let mut cursor = self.node(id)?.parent;
        while let Some(idx) = cursor {
            names.push(self.arena[idx].name.clone());
            cursor = self.arena[idx].parent;
        }
        names.reverse();
        Ok(names)
    }

    /// Path rendered as `/root/child/leaf`.
    pub fn path_string(&self, id: NodeId) -> TreeResult<String> {
        Ok(format!("/{}", self.path(id)?.iter().join("/")))
    }

    /// Distance from the root of this node's subtree; the root is level 1.
    pub fn level(&self, id: NodeId) -> TreeResult<usize> {
        Ok(self.ancestors(id)?.len() + 1)
    }

    /// Top ancestor of `id` (the node itself when it is a root).
    pub fn root_of(&self, id: NodeId) -> TreeResult<NodeId> {
        let mut current = id;
        while let Some(parent) = self.parent(current)? {
            current = parent;
        }
        Ok(current)
    }

    /// Child lookup by name. Returns `None` on a miss and, because sibling
    /// names are not required to be unique, also on an ambiguous name.
    pub fn child_named(&self, parent: NodeId, name: &str) -> TreeResult<Option<NodeId>> {
        let matches: Vec<Index> = self
            .node(parent)?
            .children
            .iter()
            .copied()
            .filter(|&c| self.arena[c].name == name)
            .collect();
        match matches.len() {
            1 => Ok(Some(NodeId(matches[0]))),
            _ => Ok(None),
        }
    }

    /// Child lookup by position in insertion order.
    pub fn child_at(&self, parent: NodeId, index: usize) -> TreeResult<Option<NodeId>> {
        Ok(self.node(parent)?.children.get(index).copied().map(NodeId))
    }

    /// Descends from `start` following a sequence of child names.
    pub fn climb(&self, start: NodeId, names: &[&str]) -> TreeResult<Option<NodeId>> {
        let mut current = start;
        for name in names {
            match self.child_named(current, name)? {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    // ------------------------------------------------------------------
    // Subtree statistics
    // ------------------------------------------------------------------

    /// Height of the subtree rooted at `id`; a leaf has depth 1.
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self, id: NodeId) -> TreeResult<usize> {
        let node = self.node(id)?;
        let below = node
            .children
            .iter()
            .map(|&c| self.depth(NodeId(c)))
            .collect::<TreeResult<Vec<usize>>>()?;
        Ok(1 + below.into_iter().max().unwrap_or(0))
    }

    /// Number of nodes in the subtree rooted at `id`, itself included.
    pub fn node_count(&self, id: NodeId) -> TreeResult<usize> {
        self.node(id)?;
        Ok(self.collect_subtree(id.0).len())
    }

    /// Leaves of the subtree rooted at `id`, in pre-order.
    #[instrument(level = "trace", skip(self))]
    pub fn leaf_ids(&self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        let mut leaves = Vec::new();
        self.collect_leaves(id.0, &mut leaves)?;
        Ok(leaves)
    }

    fn collect_leaves(&self, idx: Index, leaves: &mut Vec<NodeId>) -> TreeResult<()> {
        let node = &self.arena[idx];
        if node.children.is_empty() {
            leaves.push(NodeId(idx));
        } else {
            for &child in &node.children {
                self.collect_leaves(child, leaves)?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Attribute access
    // ------------------------------------------------------------------

    /// Attribute lookup. A missing attribute yields [`Value::Null`], never an
    /// error; a never-set attribute and a cleared one read back identically.
    #[instrument(level = "trace", skip(self))]
    pub fn attribute(&self, id: NodeId, name: &str) -> TreeResult<Value> {
        Ok(self
            .node(id)?
            .attributes
            .get(name)
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Assigns an attribute; assigning [`Value::Null`] clears it. Returns the
    /// node handle for fluent chaining.
    #[instrument(level = "trace", skip(self, value))]
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: Value) -> TreeResult<NodeId> {
        let node = self.node_mut(id)?;
        if value.is_null() {
            node.attributes.shift_remove(name);
        } else {
            node.attributes.insert(name.to_string(), value);
        }
        Ok(id)
    }

    /// Read-only view of the attribute bag, in insertion order.
    pub fn attributes(&self, id: NodeId) -> TreeResult<&IndexMap<String, Value>> {
        Ok(&self.node(id)?.attributes)
    }
}
