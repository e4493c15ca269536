//! Scene graph error types.

use editor_resources::ResourceError;
use thiserror::Error;

use crate::NodeId;

/// Errors produced by scene graph operations.
///
/// Structural no-ops, such as deleting a protected node or navigating past
/// the edge of the tree, are not errors; those operations report whether
/// anything changed instead.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Building a node's geometry failed.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// The node id does not refer to a live node.
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Parent and child links disagree.
    #[error("Scene tree corrupted: {0}")]
    CorruptTree(String),
}

pub type SceneResult<T> = std::result::Result<T, SceneError>;
