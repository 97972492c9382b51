//! Error types for checked tree operations.

use thiserror::Error;

use crate::arena::NodeRef;

/// Result type alias using TreeError.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors returned by the checked operations of [`OrderedTree`](crate::OrderedTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node reference {0:?} does not refer to a live entry")]
    StaleNodeRef(NodeRef),
}
