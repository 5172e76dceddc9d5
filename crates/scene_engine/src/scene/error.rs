//! Scene graph errors

use super::node::NodeId;

/// Errors returned by structural scene operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Handle does not refer to a live node
    #[error("Node {0:?} not found")]
    NodeNotFound(NodeId),

    /// The root cannot be deleted, detached or re-parented
    #[error("The root node cannot be modified this way")]
    RootImmutable,

    /// Attaching would make a node its own ancestor
    #[error("Attaching {child:?} under {parent:?} would create a cycle")]
    CycleDetected {
        /// Node being attached
        child: NodeId,
        /// Requested parent
        parent: NodeId,
    },

    /// The node is not a child of the given parent
    #[error("Node {child:?} is not a child of {parent:?}")]
    NotAChild {
        /// Node that was expected to be a child
        child: NodeId,
        /// Parent it was looked up under
        parent: NodeId,
    },

    /// The root still owns nodes
    #[error("Root still has {0} children")]
    RootNotEmpty(usize),
}
