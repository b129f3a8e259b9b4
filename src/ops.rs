//! Recursive convenience operations: Sort, Aggregate, Prune.

use tracing::instrument;

use crate::arena::{NodeId, Tree};
use crate::errors::{TreeError, TreeResult};
use crate::resolve::AttrSpec;
use crate::traverse::Traversal;
use crate::value::Value;

/// Prune predicate: a matching node is removed together with its subtree.
pub type Predicate = dyn Fn(&Tree, NodeId) -> bool;

impl Tree {
    /// Reorders children by their resolved attribute value, recursively for
    /// every node in the subtree under `start`. The sort is stable, so ties
    /// keep their relative order; descendant subtrees move intact with their
    /// root child.
    #[instrument(level = "debug", skip(self, spec))]
    pub fn sort(&mut self, start: NodeId, spec: &AttrSpec, decreasing: bool) -> TreeResult<()> {
        for id in self.traverse_ids(start, Traversal::PostOrder)? {
            let children = self.children(id)?;
            if children.len() < 2 {
                continue;
            }
            let mut keyed = children
                .into_iter()
                .map(|child| Ok((child, self.resolve(child, spec)?)))
                .collect::<TreeResult<Vec<(NodeId, Value)>>>()?;
            keyed.sort_by(|a, b| {
                let ord = a.1.total_cmp(&b.1);
                if decreasing {
                    ord.reverse()
                } else {
                    ord
                }
            });
            self.node_mut(id)?.children = keyed.into_iter().map(|(child, _)| child.0).collect();
        }
        Ok(())
    }

    /// Bottom-up fold of `attribute` over the subtree rooted at `id`.
    ///
    /// A leaf contributes its own stored value and fails with
    /// [`TreeError::MissingValue`] when it has none. An interior node is
    /// always recomputed from its children via `reducer`; its own stored
    /// value for the attribute, if any, is ignored.
    #[instrument(level = "debug", skip(self, reducer))]
    pub fn aggregate(
        &self,
        id: NodeId,
        attribute: &str,
        reducer: &(dyn Fn(&[Value]) -> Value + '_),
    ) -> TreeResult<Value> {
        let node = self.node(id)?;
        if node.is_leaf() {
            let value = self.attribute(id, attribute)?;
            if value.is_null() {
                return Err(TreeError::MissingValue {
                    node: node.name().to_string(),
                    attribute: attribute.to_string(),
                });
            }
            return Ok(value);
        }
        let child_values = self
            .children(id)?
            .into_iter()
            .map(|child| self.aggregate(child, attribute, reducer))
            .collect::<TreeResult<Vec<Value>>>()?;
        Ok(reducer(&child_values))
    }

    /// Removes every subtree below `start` whose root satisfies `predicate`,
    /// evaluated top-down: once a node matches, its whole subtree is
    /// released as a unit and its descendants are not evaluated. The start
    /// node itself is never removed. Returns the number of subtrees pruned.
    #[instrument(level = "debug", skip(self, predicate))]
    pub fn prune(
        &mut self,
        start: NodeId,
        predicate: &(dyn Fn(&Tree, NodeId) -> bool + '_),
    ) -> TreeResult<usize> {
        let mut pruned = 0;
        let mut stack = self.children(start)?;
        while let Some(id) = stack.pop() {
            if predicate(self, id) {
                self.remove_subtree(id)?;
                pruned += 1;
            } else {
                stack.extend(self.children(id)?);
            }
        }
        Ok(pruned)
    }
}
