//! # pix3d core
//!
//! Scene graph, asset pipeline and editing session behind the pix3d scene editor.
//!
//! ## Features
//!
//! - **Scene graph**: arena-backed node tree with game objects, lights and editor helpers
//! - **Assets**: registry of locators, concurrent resolution of `blob:`, path and `data:` locators
//! - **Levels**: tolerant JSON level loading and lossless saving
//! - **Behaviors**: checkpoint movement, health and melee attacks ticked per frame
//! - **Editing**: session commands with scene, selection and transform notifications
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use futures::executor::block_on;
//! use pix3d_core::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = EditorSession::new(EditorConfig::default());
//!     block_on(session.open_project("./my_game"))?;
//!     block_on(session.load_scene_by_key("levels/intro.json"))?;
//!     session.tick(1.0 / 60.0);
//!     session.save_scene("intro_saved.json")?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;

pub mod assets;
pub mod behaviors;
pub mod config;
pub mod editor;
pub mod events;
pub mod foundation;
pub mod level;
pub mod project;
pub mod scene;
pub mod session;

#[cfg(test)]
mod tests;

/// Common imports for editor front ends
pub mod prelude {
    pub use crate::{
        assets::{AssetCategory, AssetError, AssetLoader, AssetRegistry, BlobStore, LoadSummary},
        behaviors::{Behavior, BehaviorConfig},
        config::Config,
        core::config::EditorConfig,
        editor::{ClickOutcome, EditModeController, TransformMode},
        events::Subscription,
        foundation::{
            collections::NodeKey,
            math::{Quat, Transform, Vec3},
        },
        level::{LevelItem, LoadReport},
        project::RecentProjects,
        scene::{Axis, LoopMode, Node, NodeKind, Scene},
        session::{EditorSession, SessionError},
    };
}
