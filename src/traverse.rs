//! Traversal engine: ordered node sequences over a subtree.
//!
//! Every higher-level operation (Get, Set, Sort, ToTable) is defined in
//! terms of one of these orders. Iterators are lazy and restartable; they
//! borrow the tree immutably and never mutate it.

use std::collections::VecDeque;

use generational_arena::Index;
use tracing::instrument;

use crate::arena::{NodeId, Tree};
use crate::errors::TreeResult;

/// Visit order for a traversal starting at a given node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Traversal {
    /// Node first, then each child subtree in child order
    #[default]
    PreOrder,
    /// Each child subtree in child order, then the node
    PostOrder,
    /// The start node itself, then each ancestor up to and including the
    /// tree root. Not a subtree traversal.
    Ancestor,
    /// Breadth-first, level by level, children in child order
    LevelOrder,
}

impl Tree {
    /// Lazy iterator over the subtree (or ancestor chain) of `start` in the
    /// given order. Pre- and post-order visit every node of the subtree
    /// exactly once.
    #[instrument(level = "trace", skip(self))]
    pub fn traverse(&self, start: NodeId, order: Traversal) -> TreeResult<TraverseIter<'_>> {
        self.node(start)?;
        Ok(TraverseIter::new(self, start, order))
    }

    /// Eagerly collected visit sequence. Used internally by operations that
    /// mutate the tree while walking it.
    pub fn traverse_ids(&self, start: NodeId, order: Traversal) -> TreeResult<Vec<NodeId>> {
        Ok(self.traverse(start, order)?.collect())
    }
}

/// Iterator over node handles in a fixed traversal order.
pub struct TraverseIter<'a> {
    tree: &'a Tree,
    state: IterState,
}

enum IterState {
    /// Stack of pending nodes, children pushed in reverse for left-to-right order
    Pre(Vec<Index>),
    /// Two-phase stack: a node is emitted the second time it is popped
    Post(Vec<(Index, bool)>),
    /// Next node on the walk up the parent chain
    Up(Option<Index>),
    Level(VecDeque<Index>),
}

impl<'a> TraverseIter<'a> {
    fn new(tree: &'a Tree, start: NodeId, order: Traversal) -> Self {
        let state = match order {
            Traversal::PreOrder => IterState::Pre(vec![start.0]),
            Traversal::PostOrder => IterState::Post(vec![(start.0, false)]),
            Traversal::Ancestor => IterState::Up(Some(start.0)),
            Traversal::LevelOrder => IterState::Level(VecDeque::from([start.0])),
        };
        Self { tree, state }
    }
}

impl Iterator for TraverseIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.state {
            IterState::Pre(stack) => {
                let current = stack.pop()?;
                let node = self.tree.node(NodeId(current)).ok()?;
                for &child in node.children.iter().rev() {
                    stack.push(child);
                }
                Some(NodeId(current))
            }
            IterState::Post(stack) => {
                while let Some((current, visited)) = stack.pop() {
                    if visited {
                        return Some(NodeId(current));
                    }
                    stack.push((current, true));
                    let node = self.tree.node(NodeId(current)).ok()?;
                    for &child in node.children.iter().rev() {
                        stack.push((child, false));
                    }
                }
                None
            }
            IterState::Up(next) => {
                let current = (*next)?;
                let node = self.tree.node(NodeId(current)).ok()?;
                *next = node.parent;
                Some(NodeId(current))
            }
            IterState::Level(queue) => {
                let current = queue.pop_front()?;
                let node = self.tree.node(NodeId(current)).ok()?;
                queue.extend(node.children.iter().copied());
                Some(NodeId(current))
            }
        }
    }
}
