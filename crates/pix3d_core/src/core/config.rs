//! # Editor Configuration
//!
//! Every knob the editor core reads at runtime lives here: scene defaults
//! (background, lighting, collider, default animation), the extension table used
//! to categorize project files, the editor camera, and the recent-project list.
//!
//! All sections carry `#[serde(default)]`, so a configuration file only needs to
//! spell out the values it changes.
//!
//! ## Example
//!
//! ```toml
//! log_level = "debug"
//!
//! [scene]
//! background = 0x202020
//! default_animation = "Walk"
//!
//! [project]
//! recent_limit = 10
//! ```

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};

/// Color and intensity of a light source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightSettings {
    /// Linear RGB color packed as `0xRRGGBB`
    pub color: u32,
    /// Light intensity
    pub intensity: f32,
}

impl LightSettings {
    /// Create light settings
    pub fn new(color: u32, intensity: f32) -> Self {
        Self { color, intensity }
    }
}

/// Directional key light
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLightSettings {
    /// Color and intensity
    pub light: LightSettings,
    /// Position the light shines from, towards the origin
    pub position: [f32; 3],
}

impl Default for DirectionalLightSettings {
    fn default() -> Self {
        Self {
            light: LightSettings::new(0xFFFFFF, std::f32::consts::TAU),
            position: [0.5, 4.3, 0.866],
        }
    }
}

/// Sky/ground hemisphere fill light
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HemisphereLightSettings {
    /// Sky color packed as `0xRRGGBB`
    pub sky_color: u32,
    /// Ground color packed as `0xRRGGBB`
    pub ground_color: u32,
    /// Light intensity
    pub intensity: f32,
}

impl Default for HemisphereLightSettings {
    fn default() -> Self {
        Self {
            sky_color: 0xFFFFBB,
            ground_color: 0x080820,
            intensity: 1.0,
        }
    }
}

/// # Scene Configuration
///
/// Defaults applied when scenes are created, loaded and saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Background color packed as `0xRRGGBB`
    pub background: u32,
    /// Ambient light
    pub ambient: LightSettings,
    /// Directional light
    pub directional: DirectionalLightSettings,
    /// Hemisphere light
    pub hemisphere: HemisphereLightSettings,
    /// Animation name written for game objects that are not playing anything
    pub default_animation: String,
    /// Offset of the default box collider from its game object
    pub collider_offset: [f32; 3],
    /// Size of the default box collider
    pub collider_size: [f32; 3],
    /// Model reference suffixes the scene loader will try to resolve
    pub model_extensions: Vec<String>,
    /// Edge length of the placeholder cube in a new default scene
    pub placeholder_size: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: 0x444444,
            ambient: LightSettings::new(0xFFFFFF, 1.6),
            directional: DirectionalLightSettings::default(),
            hemisphere: HemisphereLightSettings::default(),
            default_animation: "Idle".to_string(),
            collider_offset: [0.0, 1.0, 0.0],
            collider_size: [0.8, 1.1, 0.8],
            model_extensions: vec![".glb".to_string()],
            placeholder_size: 1.0,
        }
    }
}

impl SceneConfig {
    /// Whether a model reference ends in one of the loadable extensions
    pub fn is_loadable_model(&self, model_name: &str) -> bool {
        let lowered = model_name.to_ascii_lowercase();
        self.model_extensions
            .iter()
            .any(|ext| lowered.ends_with(&ext.to_ascii_lowercase()))
    }
}

/// # Asset Configuration
///
/// Maps lowercase file extensions (without the dot) to registry categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Extension → category name
    pub categories: BTreeMap<String, String>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        let table = [
            ("png", "textures"),
            ("jpg", "textures"),
            ("jpeg", "textures"),
            ("glb", "models"),
            ("gltf", "models"),
            ("mp3", "sounds"),
            ("wav", "sounds"),
            ("ogg", "sounds"),
            ("json", "scenes"),
        ];
        Self {
            categories: table
                .into_iter()
                .map(|(ext, category)| (ext.to_string(), category.to_string()))
                .collect(),
        }
    }
}

impl AssetConfig {
    /// Category for a file extension, if it is tracked
    pub fn category_for_extension(&self, extension: &str) -> Option<&str> {
        self.categories
            .get(&extension.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// # Camera Configuration
///
/// Initial state of the editor's perspective camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
    /// Eye position
    pub position: [f32; 3],
    /// Orbit target
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            position: [10.0, 10.0, 10.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

/// # Project Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Number of recently opened projects to remember
    pub recent_limit: usize,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self { recent_limit: 5 }
    }
}

/// # Complete Editor Configuration
///
/// Top-level configuration handed to [`EditorSession`](crate::session::EditorSession).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Scene defaults
    pub scene: SceneConfig,
    /// Asset categorization
    pub assets: AssetConfig,
    /// Editor camera
    pub camera: CameraConfig,
    /// Recent projects
    pub project: ProjectConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            scene: SceneConfig::default(),
            assets: AssetConfig::default(),
            camera: CameraConfig::default(),
            project: ProjectConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the default animation name
    pub fn with_default_animation(mut self, name: impl Into<String>) -> Self {
        self.scene.default_animation = name.into();
        self
    }

    /// Set the recent-project limit
    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.project.recent_limit = limit;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let camera = &self.camera;
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid {
                field: "camera.fov_degrees",
                reason: format!("{} is outside (0, 180)", camera.fov_degrees),
            });
        }
        if camera.near <= 0.0 || camera.far <= camera.near {
            return Err(ConfigError::Invalid {
                field: "camera.near",
                reason: format!("clip range {}..{} is empty", camera.near, camera.far),
            });
        }
        if self.scene.collider_size.iter().any(|s| *s <= 0.0) {
            return Err(ConfigError::Invalid {
                field: "scene.collider_size",
                reason: "every component must be positive".to_string(),
            });
        }
        if self.scene.model_extensions.is_empty() {
            return Err(ConfigError::Invalid {
                field: "scene.model_extensions",
                reason: "at least one extension is required".to_string(),
            });
        }
        if self.scene.placeholder_size <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "scene.placeholder_size",
                reason: format!("{} must be positive", self.scene.placeholder_size),
            });
        }
        if self.project.recent_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "project.recent_limit",
                reason: "must remember at least one project".to_string(),
            });
        }
        Ok(())
    }
}

impl Config for EditorConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(EditorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let text = r#"
            log_level = "debug"

            [scene]
            default_animation = "Walk"
        "#;
        let config = EditorConfig::from_str_as(text, crate::config::ConfigFormat::Toml).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.scene.default_animation, "Walk");
        assert_eq!(config.scene.background, 0x444444);
        assert_eq!(config.project.recent_limit, 5);
    }

    #[test]
    fn test_save_and_load_ron() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.ron");
        let config = EditorConfig::default().with_recent_limit(9);
        config.save_to_file(&path).unwrap();

        let loaded = EditorConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let result = EditorConfig::default().save_to_file("editor.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_invalid_camera_rejected() {
        let mut config = EditorConfig::default();
        config.camera.near = 10.0;
        config.camera.far = 1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field: "camera.near", .. })));
    }

    #[test]
    fn test_model_extension_match_is_case_insensitive() {
        let scene = SceneConfig::default();
        assert!(scene.is_loadable_model("models/Robot.GLB"));
        assert!(!scene.is_loadable_model("models/robot.fbx"));
    }

    #[test]
    fn test_extension_categories() {
        let assets = AssetConfig::default();
        assert_eq!(assets.category_for_extension("JPG"), Some("textures"));
        assert_eq!(assets.category_for_extension("json"), Some("scenes"));
        assert_eq!(assets.category_for_extension("txt"), None);
    }
}
