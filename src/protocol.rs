//! Bulk attribute read (Get) and write (Set) across a traversal sequence.

use tracing::instrument;

use crate::arena::{NodeId, Tree};
use crate::errors::{TreeError, TreeResult};
use crate::resolve::{AttrSpec, FormatFn};
use crate::traverse::Traversal;
use crate::value::Value;

/// Options for [`Tree::get_with`].
///
/// `format` renders each resolved value to a string for presentation; the
/// returned sequence then holds `Value::String`s while the raw value is what
/// an `assign` target receives. Formatting is never persisted.
#[derive(Default)]
pub struct GetOptions<'a> {
    pub format: Option<&'a FormatFn>,
    pub assign: Option<&'a str>,
}

/// Value source for a Set call: a scalar broadcast to every visited node, or
/// a sequence consumed positionally along the traversal.
#[derive(Debug, Clone)]
pub enum SetSource {
    Scalar(Value),
    Sequence(Vec<Value>),
}

impl From<Value> for SetSource {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<Value>> for SetSource {
    fn from(values: Vec<Value>) -> Self {
        Self::Sequence(values)
    }
}

impl Tree {
    /// Resolves `spec` for every node visited from `start` in the given
    /// order, one value per node, in visit order.
    #[instrument(level = "debug", skip(self, spec))]
    pub fn get(&self, start: NodeId, spec: &AttrSpec, order: Traversal) -> TreeResult<Vec<Value>> {
        let ids = self.traverse_ids(start, order)?;
        ids.into_iter().map(|id| self.resolve(id, spec)).collect()
    }

    /// [`Tree::get`] with presentation-only formatting, one rendered
    /// `Value::String` per visited node. Needs no mutable borrow; use
    /// [`Tree::get_with`] when memoized assignment is wanted as well.
    #[instrument(level = "debug", skip(self, spec, format))]
    pub fn get_format(
        &self,
        start: NodeId,
        spec: &AttrSpec,
        order: Traversal,
        format: &(dyn Fn(&Value) -> String + '_),
    ) -> TreeResult<Vec<Value>> {
        let ids = self.traverse_ids(start, order)?;
        ids.into_iter()
            .map(|id| Ok(Value::String(format(&self.resolve(id, spec)?))))
            .collect()
    }

    /// [`Tree::get`] with formatting and memoized assignment.
    ///
    /// When `assign` is given, the raw resolved value is written onto each
    /// node before the next node is resolved, so a computed specifier can
    /// read values already assigned earlier in the same walk (post-order
    /// lets a parent read its children, ancestor order lets a node read its
    /// ancestors).
    #[instrument(level = "debug", skip(self, spec, opts))]
    pub fn get_with(
        &mut self,
        start: NodeId,
        spec: &AttrSpec,
        order: Traversal,
        opts: GetOptions,
    ) -> TreeResult<Vec<Value>> {
        let ids = self.traverse_ids(start, order)?;
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let raw = self.resolve(id, spec)?;
            if let Some(target) = opts.assign {
                self.set_attribute(id, target, raw.clone())?;
            }
            out.push(match opts.format {
                Some(format) => Value::String(format(&raw)),
                None => raw,
            });
        }
        Ok(out)
    }

    /// Assigns one attribute across the traversal. Returns the start handle
    /// for fluent chaining. See [`Tree::set_many`] for the semantics.
    #[instrument(level = "debug", skip(self, source))]
    pub fn set(
        &mut self,
        start: NodeId,
        attribute: &str,
        source: SetSource,
        order: Traversal,
    ) -> TreeResult<NodeId> {
        self.set_many(start, vec![(attribute.to_string(), source)], order)
    }

    /// Assigns several attributes across the same traversal.
    ///
    /// A `Sequence` source must have exactly one value per visited node and
    /// is consumed positionally; a `Scalar` source is broadcast. All lengths
    /// are validated before the first assignment, so a failing call leaves
    /// the tree untouched. Assigning [`Value::Null`] clears the attribute on
    /// that node.
    #[instrument(level = "debug", skip(self, assignments))]
    pub fn set_many(
        &mut self,
        start: NodeId,
        assignments: Vec<(String, SetSource)>,
        order: Traversal,
    ) -> TreeResult<NodeId> {
        let ids = self.traverse_ids(start, order)?;
        for (attribute, source) in &assignments {
            if let SetSource::Sequence(values) = source {
                if values.len() != ids.len() {
                    return Err(TreeError::LengthMismatch {
                        attribute: attribute.clone(),
                        given: values.len(),
                        expected: ids.len(),
                    });
                }
            }
        }
        for (attribute, source) in assignments {
            match source {
                SetSource::Scalar(value) => {
                    for &id in &ids {
                        self.set_attribute(id, &attribute, value.clone())?;
                    }
                }
                SetSource::Sequence(values) => {
                    for (&id, value) in ids.iter().zip(values) {
                        self.set_attribute(id, &attribute, value)?;
                    }
                }
            }
        }
        Ok(start)
    }
}
