//! Scene nodes and their kinds

use std::fmt;

use uuid::Uuid;

use crate::behaviors::Behavior;
use crate::foundation::collections::NodeKey;
use crate::foundation::math::{Transform, Vec3};

use super::animation::Animator;
use super::bounds::AABB;
use super::lighting::Light;

/// Type tag written for game objects without an explicit `type`
pub const GAME_OBJECT_TYPE: &str = "GameObject";

/// Stable node identity, preserved across scene replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Gizmo handle axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// X axis
    X,
    /// Y axis
    Y,
    /// Z axis
    Z,
}

impl Axis {
    /// All three axes in order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Unit vector along the axis
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::x(),
            Axis::Y => Vec3::y(),
            Axis::Z => Vec3::z(),
        }
    }
}

/// Editor decoration attached while a node is selected
#[derive(Debug, Clone, PartialEq)]
pub enum HelperKind {
    /// Draggable transform handle along one axis
    GizmoHandle(Axis),
    /// World-space highlight box around the selection
    SelectionBox(AABB),
}

/// A placed model with its collider, animation state and source reference
#[derive(Debug, Clone, Default)]
pub struct GameObject {
    /// Registry key of the model
    pub model_name: String,
    /// Type tag written back to the level file
    pub object_type: String,
    /// Whether the default box collider was suppressed
    pub no_collider: bool,
    /// Animation playback over the model's clips
    pub animator: Animator,
    /// Child node holding the model instance
    pub model: Option<NodeKey>,
    /// Child node holding the collider
    pub collider: Option<NodeKey>,
}

impl GameObject {
    /// Game object for a model reference
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            object_type: GAME_OBJECT_TYPE.to_string(),
            ..Default::default()
        }
    }
}

/// What a node is
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The scene root
    Root,
    /// A placed model
    GameObject(GameObject),
    /// Renderable instance of a resolved model
    Model {
        /// Registry key of the model
        asset_key: String,
        /// Local bounds of the model geometry
        bounds: AABB,
    },
    /// Renderable placeholder geometry
    Mesh {
        /// Local bounds of the geometry
        bounds: AABB,
    },
    /// Box collider; the node transform sizes a unit cube
    Collider,
    /// Light source
    Light(Light),
    /// Editor decoration
    Helper(HelperKind),
}

impl NodeKind {
    /// Short label for logs and tree views
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Root => "Root",
            NodeKind::GameObject(_) => "GameObject",
            NodeKind::Model { .. } => "Model",
            NodeKind::Mesh { .. } => "Mesh",
            NodeKind::Collider => "Collider",
            NodeKind::Light(_) => "Light",
            NodeKind::Helper(_) => "Helper",
        }
    }
}

/// A node of the scene hierarchy
#[derive(Debug, Clone)]
pub struct Node {
    /// Stable identity
    pub id: NodeId,
    /// Display name, not unique
    pub name: String,
    /// Node kind and kind-specific data
    pub kind: NodeKind,
    /// Gates per-frame update and behaviors
    pub active: bool,
    /// Rendering and picking visibility
    pub visible: bool,
    /// Whether ray picks may hit this node
    pub pickable: bool,
    /// Editor decoration tag; picks that hit it are ignored
    pub gizmo: bool,
    /// Transform relative to the parent
    pub transform: Transform,
    /// Attached behaviors in tick order
    pub behaviors: Vec<Behavior>,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
}

impl Node {
    /// Create a detached node
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        let pickable = matches!(kind, NodeKind::Model { .. } | NodeKind::Mesh { .. });
        Self {
            id: NodeId::new(),
            name: name.into(),
            kind,
            active: true,
            visible: true,
            pickable,
            gizmo: false,
            transform: Transform::default(),
            behaviors: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Set the local transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Keep an existing identity
    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = id;
        self
    }

    /// Parent node, `None` for the root and detached nodes
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Children in insertion order
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Game object data, if this node is one
    pub fn game_object(&self) -> Option<&GameObject> {
        match &self.kind {
            NodeKind::GameObject(object) => Some(object),
            _ => None,
        }
    }

    /// Mutable game object data
    pub fn game_object_mut(&mut self) -> Option<&mut GameObject> {
        match &mut self.kind {
            NodeKind::GameObject(object) => Some(object),
            _ => None,
        }
    }

    /// Bounds a ray pick is tested against, in local space
    pub fn pick_bounds(&self) -> Option<AABB> {
        match &self.kind {
            NodeKind::Model { bounds, .. } | NodeKind::Mesh { bounds } => Some(*bounds),
            NodeKind::Helper(HelperKind::GizmoHandle(axis)) => Some(handle_bounds(*axis)),
            _ => None,
        }
    }

    /// Bounds of renderable geometry in local space
    pub fn render_bounds(&self) -> Option<AABB> {
        match &self.kind {
            NodeKind::Model { bounds, .. } | NodeKind::Mesh { bounds } => Some(*bounds),
            _ => None,
        }
    }
}

/// Local-space box of a gizmo handle
pub fn handle_bounds(axis: Axis) -> AABB {
    const LENGTH: f32 = 1.0;
    const THICKNESS: f32 = 0.1;
    let half = Vec3::repeat(THICKNESS * 0.5);
    let reach = axis.unit() * LENGTH;
    AABB::new(-half, reach + half)
}
