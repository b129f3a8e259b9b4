//! Flattening a subtree into uniform tabular rows.
//!
//! One row per node in pre-order; the first cell is the structural path,
//! followed by one cell per requested column. Row i corresponds exactly to
//! pre-order position i, so the conversion is a multi-specifier Get
//! transposed into rows. Consumers render or export the result themselves;
//! the core makes no layout assumptions.

use tracing::instrument;

use crate::arena::{NodeId, Tree};
use crate::errors::TreeResult;
use crate::resolve::{AttrSpec, FormatFn};
use crate::traverse::Traversal;
use crate::value::Value;

/// A requested table column: label, specifier, optional cell formatter.
pub struct Column<'a> {
    name: String,
    spec: AttrSpec<'a>,
    format: Option<&'a FormatFn>,
}

impl<'a> Column<'a> {
    /// Column labeled after the specifier itself.
    pub fn new(spec: AttrSpec<'a>) -> Self {
        Self {
            name: spec.label().to_string(),
            spec,
            format: None,
        }
    }

    pub fn named(name: impl Into<String>, spec: AttrSpec<'a>) -> Self {
        Self {
            name: name.into(),
            spec,
            format: None,
        }
    }

    /// Per-column formatter; formatted cells are stored as `Value::String`.
    pub fn with_format(mut self, format: &'a FormatFn) -> Self {
        self.format = Some(format);
        self
    }
}

/// One node's row: structural path plus one cell per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub path: String,
    pub cells: Vec<Value>,
}

/// Flattened tree with a uniform column set.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column labels, `path` first, then the requested columns in call order
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Tree {
    /// Flattens the subtree rooted at `start` into a [`Table`], one row per
    /// node in pre-order. Each cell resolves its column's specifier for the
    /// row's node, independently formatted when the column carries a
    /// formatter.
    #[instrument(level = "debug", skip(self, columns))]
    pub fn to_table(&self, start: NodeId, columns: &[Column]) -> TreeResult<Table> {
        let mut labels = vec!["path".to_string()];
        labels.extend(columns.iter().map(|c| c.name.clone()));

        let mut rows = Vec::new();
        for id in self.traverse_ids(start, Traversal::PreOrder)? {
            let cells = columns
                .iter()
                .map(|column| {
                    let value = self.resolve(id, &column.spec)?;
                    Ok(match column.format {
                        Some(format) => Value::String(format(&value)),
                        None => value,
                    })
                })
                .collect::<TreeResult<Vec<Value>>>()?;
            rows.push(Row {
                path: self.path_string(id)?,
                cells,
            });
        }
        Ok(Table {
            columns: labels,
            rows,
        })
    }
}
