//! Node edit commands
//!
//! Every command mutates the current scene and then notifies: transform edits
//! on the transform stream, everything else on the scene stream.

use crate::foundation::collections::NodeKey;
use crate::foundation::math::Transform;
use crate::scene::{Animator, LoopMode, Node};

use super::{EditorSession, SessionError};

impl EditorSession {
    fn node_for_edit(&mut self, key: NodeKey) -> Result<&mut Node, SessionError> {
        self.scene
            .as_mut()
            .ok_or(SessionError::NoScene)?
            .node_mut(key)
            .ok_or(SessionError::UnknownNode(key))
    }

    fn animator_for_edit(&mut self, key: NodeKey) -> Result<&mut Animator, SessionError> {
        self.node_for_edit(key)?
            .game_object_mut()
            .map(|object| &mut object.animator)
            .ok_or(SessionError::NotAGameObject(key))
    }

    /// Replace a node's local transform
    pub fn set_node_transform(&mut self, key: NodeKey, transform: Transform) -> Result<(), SessionError> {
        self.node_for_edit(key)?.transform = transform;
        self.notify_transform_changed(Some(key));
        Ok(())
    }

    /// Edit a node's local transform in place
    pub fn update_transform(
        &mut self,
        key: NodeKey,
        edit: impl FnOnce(&mut Transform),
    ) -> Result<(), SessionError> {
        edit(&mut self.node_for_edit(key)?.transform);
        self.notify_transform_changed(Some(key));
        Ok(())
    }

    /// Change a node's display name
    pub fn rename_node(&mut self, key: NodeKey, name: impl Into<String>) -> Result<(), SessionError> {
        self.node_for_edit(key)?.name = name.into();
        self.notify_scene_changed();
        Ok(())
    }

    /// Enable or disable per-frame update and behaviors
    pub fn set_node_active(&mut self, key: NodeKey, active: bool) -> Result<(), SessionError> {
        self.node_for_edit(key)?.active = active;
        self.notify_scene_changed();
        Ok(())
    }

    /// Show or hide a node and its subtree
    pub fn set_node_visible(&mut self, key: NodeKey, visible: bool) -> Result<(), SessionError> {
        self.node_for_edit(key)?.visible = visible;
        self.notify_scene_changed();
        Ok(())
    }

    /// Start a clip; `Ok(false)` if the model has no clip by that name
    pub fn play_animation(&mut self, key: NodeKey, clip: &str, mode: LoopMode) -> Result<bool, SessionError> {
        let started = self.animator_for_edit(key)?.play(clip, mode);
        self.notify_scene_changed();
        Ok(started)
    }

    /// Freeze the playhead
    pub fn pause_animation(&mut self, key: NodeKey) -> Result<(), SessionError> {
        self.animator_for_edit(key)?.pause();
        self.notify_scene_changed();
        Ok(())
    }

    /// Continue from the current playhead
    pub fn resume_animation(&mut self, key: NodeKey) -> Result<(), SessionError> {
        self.animator_for_edit(key)?.resume();
        self.notify_scene_changed();
        Ok(())
    }

    /// Move the playhead of the current clip
    pub fn set_animation_time(&mut self, key: NodeKey, time: f32) -> Result<(), SessionError> {
        self.animator_for_edit(key)?.set_time(time);
        self.notify_scene_changed();
        Ok(())
    }
}
