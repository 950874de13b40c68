//! # Core Module
//!
//! Shared configuration used by every editor subsystem.
//!
//! ## Organization
//!
//! - **Config**: Editor configuration (scene defaults, asset categories, camera, projects)

pub mod config;

pub use config::{
    AssetConfig,
    CameraConfig,
    Config,
    ConfigError,
    EditorConfig,
    LightSettings,
    ProjectConfig,
    SceneConfig,
};
