//! Click selection and gizmo-driven transform editing
//!
//! The controller keeps the three axis handles and the selection box in the
//! scene while a node is selected. Helpers live directly under the root at
//! the selection's world position and carry the gizmo tag, so picks that hit
//! them never change the selection and the serializer never writes them.

use crate::core::config::CameraConfig;
use crate::foundation::collections::NodeKey;
use crate::foundation::math::{Quat, Transform, Vec3};
use crate::scene::{Axis, HelperKind, Node, NodeKind, Scene, AABB};
use crate::session::{EditorSession, SessionError};

use super::camera::EditorCamera;
use super::pointer::{PointerRelease, PointerState};

/// Smallest scale a drag can shrink an axis to
const MIN_SCALE: f32 = 0.001;

/// What a drag applies along the chosen axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformMode {
    /// Move by `amount` units
    #[default]
    Translate,
    /// Rotate by `amount` radians
    Rotate,
    /// Grow the scale component by `amount`
    Scale,
}

/// Result of a viewport click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A node became the selection
    Selected(NodeKey),
    /// The click hit empty space and cleared the selection
    Cleared,
    /// The first hit was an editor decoration
    IgnoredGizmo,
    /// A drag is in progress
    IgnoredDrag,
    /// No scene is loaded
    NoScene,
}

#[derive(Debug, Clone, Default)]
struct Attachment {
    target: NodeKey,
    handles: Vec<NodeKey>,
    selection_box: Option<NodeKey>,
}

/// Viewport editing state bound to one session
pub struct EditModeController {
    camera: EditorCamera,
    pointer: PointerState,
    mode: TransformMode,
    orbit_enabled: bool,
    dragging: bool,
    attachment: Option<Attachment>,
    generation: u64,
}

impl EditModeController {
    /// Controller for a viewport of the given size
    pub fn new(camera: &CameraConfig, width: u32, height: u32) -> Self {
        Self {
            camera: EditorCamera::from_config(camera, width, height),
            pointer: PointerState::new(width, height),
            mode: TransformMode::default(),
            orbit_enabled: true,
            dragging: false,
            attachment: None,
            generation: 0,
        }
    }

    /// Viewport camera
    pub fn camera(&self) -> &EditorCamera {
        &self.camera
    }

    /// Mutable viewport camera
    pub fn camera_mut(&mut self) -> &mut EditorCamera {
        &mut self.camera
    }

    /// Pointer state
    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Mutable pointer state
    pub fn pointer_mut(&mut self) -> &mut PointerState {
        &mut self.pointer
    }

    /// Current drag mode
    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    /// Switch drag mode
    pub fn set_mode(&mut self, mode: TransformMode) {
        self.mode = mode;
    }

    /// Whether camera orbiting is allowed (false while dragging a handle)
    pub fn orbit_enabled(&self) -> bool {
        self.orbit_enabled
    }

    /// Whether a handle drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Node the helpers are attached for
    pub fn attached_to(&self) -> Option<NodeKey> {
        self.attachment.as_ref().map(|a| a.target)
    }

    /// Helper nodes currently in the scene
    pub fn helpers(&self) -> Vec<NodeKey> {
        self.attachment
            .iter()
            .flat_map(|a| a.handles.iter().copied().chain(a.selection_box))
            .collect()
    }

    /// Resize camera and pointer together
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
        self.pointer.update_viewport_size(width, height);
    }

    /// Orbit the camera if no handle drag is in progress
    pub fn orbit(&mut self, yaw: f32, pitch: f32) -> bool {
        if self.orbit_enabled {
            self.camera.orbit(yaw, pitch);
        }
        self.orbit_enabled
    }

    /// Button release over the viewport; short presses count as clicks
    pub fn pointer_released(&mut self, session: &mut EditorSession) -> Option<ClickOutcome> {
        match self.pointer.release() {
            PointerRelease::Click { ndc_x, ndc_y } => Some(self.click(session, ndc_x, ndc_y)),
            PointerRelease::DragEnd | PointerRelease::Idle => None,
        }
    }

    /// Pick at an NDC point and update the selection
    pub fn click(&mut self, session: &mut EditorSession, ndc_x: f32, ndc_y: f32) -> ClickOutcome {
        if self.dragging {
            return ClickOutcome::IgnoredDrag;
        }
        self.sync(session);
        let Some(scene) = session.scene() else {
            return ClickOutcome::NoScene;
        };
        let Some(ray) = self.camera.ray_from_ndc(ndc_x, ndc_y) else {
            return ClickOutcome::NoScene;
        };

        let outcome = match scene.raycast(ray.origin, ray.direction).first() {
            Some(hit) if scene.is_gizmo(hit.node) => return ClickOutcome::IgnoredGizmo,
            Some(hit) => scene.topmost_ancestor(hit.node).map_or(ClickOutcome::Cleared, ClickOutcome::Selected),
            None => ClickOutcome::Cleared,
        };
        match outcome {
            ClickOutcome::Selected(key) => session.set_selected(Some(key)),
            _ => session.set_selected(None),
        }
        self.sync(session);
        outcome
    }

    /// Bring the helpers in line with the session's scene and selection
    pub fn sync(&mut self, session: &mut EditorSession) {
        if session.scene_generation() != self.generation {
            // The previous scene took its helpers with it
            self.attachment = None;
            self.generation = session.scene_generation();
        }
        let selected = session.selected();
        if self.attached_to() == selected {
            return;
        }
        let Some(scene) = session.scene_mut() else {
            self.attachment = None;
            return;
        };
        if let Some(previous) = self.attachment.take() {
            detach(scene, &previous);
        }
        if let Some(target) = selected.filter(|key| scene.contains(*key)) {
            self.attachment = Some(attach(scene, target));
        }
    }

    /// Start a handle drag
    pub fn begin_drag(&mut self) {
        self.dragging = true;
        self.orbit_enabled = false;
    }

    /// Apply one drag step to the selection along `axis`
    pub fn drag(&mut self, session: &mut EditorSession, axis: Axis, amount: f32) -> Result<(), SessionError> {
        let Some(target) = session.selected() else {
            return Ok(());
        };
        let mode = self.mode;
        session.update_transform(target, |transform| apply_drag(transform, mode, axis, amount))?;
        self.sync(session);
        self.refresh(session);
        Ok(())
    }

    /// Finish a handle drag
    pub fn end_drag(&mut self, session: &mut EditorSession) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        self.orbit_enabled = true;
        session.emit_transform();
    }

    /// Move helpers to the selection's current world position and bounds
    pub fn refresh(&mut self, session: &mut EditorSession) {
        let (Some(attachment), Some(scene)) = (self.attachment.as_ref(), session.scene_mut()) else {
            return;
        };
        let position = scene.world_position(attachment.target);
        for handle in &attachment.handles {
            if let Some(node) = scene.node_mut(*handle) {
                node.transform.position = position;
            }
        }
        let bounds = selection_bounds(scene, attachment.target);
        if let Some(node) = attachment.selection_box.and_then(|key| scene.node_mut(key)) {
            node.kind = NodeKind::Helper(HelperKind::SelectionBox(bounds));
        }
    }
}

fn apply_drag(transform: &mut Transform, mode: TransformMode, axis: Axis, amount: f32) {
    match mode {
        TransformMode::Translate => transform.position += axis.unit() * amount,
        TransformMode::Rotate => {
            let unit = match axis {
                Axis::X => Vec3::x_axis(),
                Axis::Y => Vec3::y_axis(),
                Axis::Z => Vec3::z_axis(),
            };
            transform.rotation = Quat::from_axis_angle(&unit, amount) * transform.rotation;
        }
        TransformMode::Scale => {
            let index = match axis {
                Axis::X => 0,
                Axis::Y => 1,
                Axis::Z => 2,
            };
            transform.scale[index] = (transform.scale[index] + amount).max(MIN_SCALE);
        }
    }
}

fn selection_bounds(scene: &Scene, target: NodeKey) -> AABB {
    scene
        .subtree_bounds(target)
        .unwrap_or_else(|| AABB::from_center_size(scene.world_position(target), Vec3::repeat(1.0)))
}

fn attach(scene: &mut Scene, target: NodeKey) -> Attachment {
    let position = scene.world_position(target);
    let handles = Axis::ALL
        .iter()
        .map(|axis| {
            let mut handle = Node::new(format!("gizmo_{:?}", axis).to_lowercase(), NodeKind::Helper(HelperKind::GizmoHandle(*axis)))
                .with_transform(Transform::from_position(position));
            handle.gizmo = true;
            handle.pickable = true;
            scene.add_to_root(handle)
        })
        .collect();

    let mut selection_box = Node::new(
        "selection_box",
        NodeKind::Helper(HelperKind::SelectionBox(selection_bounds(scene, target))),
    );
    selection_box.gizmo = true;
    selection_box.pickable = false;
    let selection_box = Some(scene.add_to_root(selection_box));

    log::debug!("Attached gizmo to {:?}", target);
    Attachment {
        target,
        handles,
        selection_box,
    }
}

fn detach(scene: &mut Scene, attachment: &Attachment) {
    for key in attachment.handles.iter().copied().chain(attachment.selection_box) {
        if scene.contains(key) {
            if let Err(e) = scene.remove_node(key) {
                log::warn!("Failed to remove helper {:?}: {}", key, e);
            }
        }
    }
}
