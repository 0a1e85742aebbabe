//! Node forest.
//!
//! Nodes are stored in insertion order and mirrored into petgraph's
//! StableGraph so ancestry queries (cycle checks, descendant walks) don't
//! invalidate indices when nodes come and go.

mod node;
mod tree;

pub use node::{Node, NodeId, NodeKind, NodeMove, ParentRef, ROOT_ID};
pub use tree::{NodeTree, RemovedNode};
