//! Crate-level error type.
//!
//! Only host-requested tree mutations are fallible. Per-frame paths (camera,
//! layout ticks, hit-testing) guard degenerate input themselves and never
//! return errors.

use crate::graph::NodeId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("node already exists: {0}")]
    DuplicateNode(NodeId),

    #[error("parent not found: {0}")]
    ParentNotFound(NodeId),

    #[error("`root` is reserved for the canvas root and cannot be used as a node id")]
    ReservedId,

    #[error("moving {node} under {parent} would create a cycle")]
    WouldCreateCycle { node: NodeId, parent: NodeId },

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("invalid layout data: {0}")]
    InvalidLayout(String),
}

pub type Result<T> = std::result::Result<T, Error>;
