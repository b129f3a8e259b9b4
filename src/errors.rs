use thiserror::Error;

/// Errors surfaced by tree operations.
///
/// Every variant carries enough context (node name, attribute, counts) to
/// identify which node or operation triggered it. Attribute lookups never
/// produce an error for a missing value; absence is reported through
/// [`Value::Null`](crate::Value::Null) instead.
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("child not found: '{name}' under '{parent}'")]
    NotFound { parent: String, name: String },

    #[error("cycle detected: '{node}' is an ancestor of '{target}'")]
    Cycle { node: String, target: String },

    #[error("ambiguous name among siblings of '{parent}': '{name}'")]
    DuplicateName { parent: String, name: String },

    #[error("invalid structural operation on '{node}': {reason}")]
    Structure { node: String, reason: String },

    #[error("length mismatch for attribute '{attribute}': {given} values for {expected} nodes")]
    LengthMismatch {
        attribute: String,
        given: usize,
        expected: usize,
    },

    #[error("missing value for attribute '{attribute}' at leaf '{node}'")]
    MissingValue { node: String, attribute: String },

    #[error("computed attribute for '{node}' returned a list, scalar required")]
    TypeMismatch { node: String },

    #[error("stale node handle: {0}")]
    InvalidHandle(String),
}

pub type TreeResult<T> = Result<T, TreeError>;
