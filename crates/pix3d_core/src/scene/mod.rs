//! Scene graph: nodes, hierarchy, lighting, animation state and picking
//!
//! The [`Scene`] is plain data plus queries. A scene held by an
//! [`EditorSession`](crate::session::EditorSession) is edited through session
//! commands, which notify subscribers; only editor helpers are attached directly.

pub mod animation;
pub mod bounds;
pub mod lighting;
pub mod node;
pub mod scene_graph;

use thiserror::Error;

use crate::foundation::collections::NodeKey;

pub use animation::{AnimationClip, Animator, LoopMode};
pub use bounds::AABB;
pub use lighting::{Light, LightFactory, LightType};
pub use node::{Axis, GameObject, HelperKind, Node, NodeId, NodeKind, GAME_OBJECT_TYPE};
pub use scene_graph::{RayHit, Scene, TickReport};

/// Scene structure errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The key does not refer to a node of this scene
    #[error("Node {0:?} is not part of the scene")]
    UnknownNode(NodeKey),

    /// The root is owned by the scene
    #[error("The scene root cannot be removed")]
    RootRemoval,
}
