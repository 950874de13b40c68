//! JSON level files: parsing, scene instantiation and serialization

pub mod format;
pub mod loader;
pub mod serializer;

use thiserror::Error;

pub use format::{parse_level, parse_level_value, LevelItem, MalformedItem, QuatRecord, Vec3Record};
pub use loader::{BehaviorWarning, LoadReport, SceneLoader, SkipReason, SkippedItem};
pub use serializer::{SceneSerializer, SerializeError};

/// Level loading errors
#[derive(Error, Debug)]
pub enum LevelError {
    /// The document is not valid JSON
    #[error("Level JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is not a JSON array
    #[error("Level document must be a JSON array of items")]
    NotAnArray,

    /// The item's model is not in the asset cache
    #[error("Model '{0}' is not loaded")]
    ModelNotLoaded(String),
}
