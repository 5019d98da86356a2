//! Error types for tree operations
//!
//! Simple, flat error hierarchy. Selector parsing never fails, so nothing
//! here describes malformed selectors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MarkupError>;

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("Invalid node type: expected {expected}, got {actual}")]
    InvalidNodeType { expected: String, actual: String },

    #[error("Child index {index} out of range for {len} children")]
    ChildIndexOutOfRange { index: usize, len: usize },

    #[error("No child element named {0:?}")]
    ChildNotFound(String),

    #[error("Appending node {child} under node {parent} would create a cycle")]
    HierarchyCycle { parent: u32, child: u32 },

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
