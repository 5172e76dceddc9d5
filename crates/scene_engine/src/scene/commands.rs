//! Deferred structural edits
//!
//! Anything that would rewire the hierarchy while a frame is running is
//! queued as a [`SceneCommand`] and applied by
//! [`SceneGraph::apply_pending_commands`](super::graph::SceneGraph::apply_pending_commands)
//! once the frame's traversal is over.

use crate::scene::node::NodeId;
use crate::scene::primitives::PrimitiveShape;

/// A structural edit waiting for the end of the frame
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    /// Destroy a node and everything below it
    DeleteSubtree(NodeId),

    /// Move a node under a new parent, keeping its world pose
    Reparent {
        /// Node to move
        node: NodeId,
        /// New parent, `None` for the root
        new_parent: Option<NodeId>,
    },

    /// Create an empty node
    CreateGameObject {
        /// Explicit name, or the numbered default
        name: Option<String>,
        /// Parent, `None` for the root
        parent: Option<NodeId>,
    },

    /// Create a node carrying a primitive mesh
    CreatePrimitive {
        /// Shape to generate
        shape: PrimitiveShape,
        /// Parent, `None` for the root
        parent: Option<NodeId>,
    },

    /// Destroy every node below the root
    ClearAll,

    /// Change the selection
    Select(Option<NodeId>),
}

impl SceneCommand {
    /// Short label for logging
    pub fn label(&self) -> &'static str {
        match self {
            Self::DeleteSubtree(_) => "delete-subtree",
            Self::Reparent { .. } => "reparent",
            Self::CreateGameObject { .. } => "create-game-object",
            Self::CreatePrimitive { .. } => "create-primitive",
            Self::ClearAll => "clear-all",
            Self::Select(_) => "select",
        }
    }
}
