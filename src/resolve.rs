//! Attribute resolution: turning an attribute specifier into a per-node value.
//!
//! A specifier is a closed tagged variant over the three ways a value can be
//! produced: a stored attribute name, a computed function over the node, or
//! an aggregation directive delegating to the bottom-up fold. Extra
//! arguments to a computed function are closure captures.

use std::fmt;

use tracing::instrument;

use crate::arena::{NodeId, Tree};
use crate::errors::{TreeError, TreeResult};
use crate::value::Value;

/// Computed attribute: invoked once per visited node.
pub type ComputeFn = dyn Fn(&Tree, NodeId) -> Value;

/// Reducer for [`Tree::aggregate`]: folds child values into one.
pub type Reducer<'a> = dyn Fn(&[Value]) -> Value + 'a;

/// Presentation-only formatter applied to resolved values on Get/ToTable.
pub type FormatFn = dyn Fn(&Value) -> String;

/// Polymorphic attribute specifier.
pub enum AttrSpec<'a> {
    /// Stored attribute lookup by name; absent yields [`Value::Null`]
    Name(String),
    /// Per-node computed value; must resolve to a scalar
    Computed(&'a ComputeFn),
    /// Bottom-up fold of `attribute` over the node's subtree
    Aggregate {
        attribute: String,
        reducer: &'a Reducer<'a>,
    },
}

impl<'a> AttrSpec<'a> {
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn computed(f: &'a ComputeFn) -> Self {
        Self::Computed(f)
    }

    pub fn aggregate(attribute: impl Into<String>, reducer: &'a Reducer<'a>) -> Self {
        Self::Aggregate {
            attribute: attribute.into(),
            reducer,
        }
    }

    /// Column label this specifier naturally carries.
    pub fn label(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Computed(_) => "computed",
            Self::Aggregate { attribute, .. } => attribute,
        }
    }
}

impl fmt::Debug for AttrSpec<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
            Self::Aggregate { attribute, .. } => {
                f.debug_struct("Aggregate").field("attribute", attribute).finish()
            }
        }
    }
}

impl Tree {
    /// Resolves a specifier for a single node.
    ///
    /// A computed specifier must return a scalar; a list result is a usage
    /// error surfaced as [`TreeError::TypeMismatch`], never truncated.
    #[instrument(level = "trace", skip(self, spec))]
    pub fn resolve(&self, id: NodeId, spec: &AttrSpec) -> TreeResult<Value> {
        match spec {
            AttrSpec::Name(name) => self.attribute(id, name),
            AttrSpec::Computed(f) => {
                let value = f(self, id);
                if !value.is_scalar() {
                    return Err(TreeError::TypeMismatch {
                        node: self.name(id)?.to_string(),
                    });
                }
                Ok(value)
            }
            AttrSpec::Aggregate { attribute, reducer } => {
                self.aggregate(id, attribute, reducer)
            }
        }
    }
}
