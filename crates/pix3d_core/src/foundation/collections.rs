//! Specialized collection types

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Arena key of a node inside a [`Scene`](crate::scene::Scene)
    ///
    /// Keys are only meaningful for the scene that issued them. Use
    /// [`NodeId`](crate::scene::NodeId) to find the same node across scenes.
    pub struct NodeKey;
}

/// Arena holding every node of a scene
pub type NodeArena<T> = SlotMap<NodeKey, T>;
