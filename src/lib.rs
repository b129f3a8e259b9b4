//! rstree: a generic in-memory hierarchical data structure.
//!
//! Gives any hierarchical dataset (org charts, decision trees, taxonomies) a
//! first-class, traversable, attribute-rich tree comparable in ergonomics to
//! a flat table for tabular data. Nodes live in an arena owned by [`Tree`]
//! and are addressed through cheap [`NodeId`] handles, so mutation through
//! one handle is visible through every other handle to the same node.
//!
//! Building blocks:
//! - [`Tree`] / [`NodeId`]: identity, parent/child linkage, structural
//!   mutators and queries, per-node attribute bags ([`Value`]).
//! - [`Traversal`]: pre-order, post-order, ancestor and level-order visit
//!   sequences driving every bulk operation.
//! - [`AttrSpec`]: polymorphic attribute resolution (stored name, computed
//!   function, aggregation directive).
//! - Get/Set ([`Tree::get`], [`Tree::set`]): bulk read/write along a
//!   traversal, with optional formatting and memoized assignment.
//! - [`Tree::sort`], [`Tree::aggregate`], [`Tree::prune`]: recursive
//!   conveniences over the same machinery.
//! - [`Tree::to_table`]: deterministic flattening into uniform rows.
//!
//! ```
//! use rstree::{AttrSpec, Traversal, Tree, Value};
//!
//! let mut tree = Tree::new("acme");
//! let it = tree.add_child(tree.root(), "it").unwrap();
//! let ops = tree.add_child(tree.root(), "ops").unwrap();
//! tree.set_attribute(it, "cost", Value::from(120)).unwrap();
//! tree.set_attribute(ops, "cost", Value::from(80)).unwrap();
//!
//! let sum = |values: &[Value]| {
//!     Value::from(values.iter().filter_map(Value::as_number).sum::<f64>())
//! };
//! let total = tree.aggregate(tree.root(), "cost", &sum).unwrap();
//! assert_eq!(total, Value::from(200));
//!
//! let costs = tree
//!     .get(tree.root(), &AttrSpec::name("cost"), Traversal::PostOrder)
//!     .unwrap();
//! assert_eq!(costs, vec![Value::from(120), Value::from(80), Value::Null]);
//! ```
//!
//! The tree is an exclusively owned, single-threaded structure; embedders
//! that share it across threads must serialize access externally.

pub mod arena;
pub mod errors;
pub mod ops;
pub mod protocol;
pub mod resolve;
pub mod table;
pub mod traverse;
pub mod util;
pub mod value;

pub use arena::{Node, NodeId, Tree};
pub use errors::{TreeError, TreeResult};
pub use ops::Predicate;
pub use protocol::{GetOptions, SetSource};
pub use resolve::{AttrSpec, ComputeFn, FormatFn, Reducer};
pub use table::{Column, Row, Table};
pub use traverse::{Traversal, TraverseIter};
pub use value::Value;
