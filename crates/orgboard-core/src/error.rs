//! Error types for chart operations.

use crate::node::NodeId;
use thiserror::Error;

/// Chart engine errors.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("Drawing not found: {0}")]
    DrawingNotFound(String),
    #[error("Linking {parent} -> {child} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),
    #[error("Node and geometry keys differ at {0}")]
    KeysetMismatch(NodeId),
    #[error("Invalid import: {0}")]
    InvalidImport(String),
    #[error("Import failed and was rolled back: {0}")]
    ImportRolledBack(Box<ChartError>),
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for chart operations.
pub type ChartResult<T> = Result<T, ChartError>;
