//! Asset management system
//!
//! - [`AssetRegistry`]: category × key → locator table
//! - [`AssetLoader`]: resolves locators into decoded assets and caches them
//! - [`AssetSource`] / [`AssetDecoder`]: byte fetching and decoding seams

pub mod archive;
pub mod decoder;
pub mod loader;
pub mod locator;
pub mod registry;
pub mod source;

use std::fmt;

use thiserror::Error;

pub use decoder::{AssetDecoder, ColorSpace, ModelAsset, SoundAsset, SoundFormat, StandardDecoder, TextureAsset};
pub use loader::{AssetLoader, LoadFailure, LoadSummary};
pub use locator::Locator;
pub use registry::AssetRegistry;
pub use source::{AssetSource, BlobStore, LocalAssetSource};

/// Registry category
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetCategory {
    /// Images
    Textures,
    /// glTF / GLB models
    Models,
    /// Audio clips
    Sounds,
    /// Scene JSON documents
    Scenes,
    /// Any additional named category
    Other(String),
}

impl AssetCategory {
    /// The four categories every registry starts with
    pub const STANDARD: [AssetCategory; 4] = [
        AssetCategory::Textures,
        AssetCategory::Models,
        AssetCategory::Sounds,
        AssetCategory::Scenes,
    ];

    /// Category name as used in configuration files
    pub fn as_str(&self) -> &str {
        match self {
            AssetCategory::Textures => "textures",
            AssetCategory::Models => "models",
            AssetCategory::Sounds => "sounds",
            AssetCategory::Scenes => "scenes",
            AssetCategory::Other(name) => name,
        }
    }
}

impl From<&str> for AssetCategory {
    fn from(name: &str) -> Self {
        match name {
            "textures" => AssetCategory::Textures,
            "models" => AssetCategory::Models,
            "sounds" => AssetCategory::Sounds,
            "scenes" => AssetCategory::Scenes,
            other => AssetCategory::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asset resolution errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// No registry entry for the key
    #[error("No {category} asset registered under '{key}'")]
    NotRegistered {
        /// Category searched
        category: AssetCategory,
        /// Missing key
        key: String,
    },

    /// The locator matches no supported encoding
    #[error("Unsupported locator for '{key}': {locator}")]
    UnsupportedLocator {
        /// Asset key
        key: String,
        /// Offending locator, truncated
        locator: String,
    },

    /// Base64 payload below the minimum length
    #[error("Base64 payload for '{key}' is too short: {length} characters")]
    PayloadTooShort {
        /// Asset key
        key: String,
        /// Payload length in characters
        length: usize,
    },

    /// Decoded payload below the minimum size
    #[error("Decoded data for '{key}' is too small: {length} bytes")]
    PayloadTooSmall {
        /// Asset key
        key: String,
        /// Decoded size in bytes
        length: usize,
    },

    /// Base64 decoding failed
    #[error("Base64 decode failed for '{key}': {source}")]
    Base64 {
        /// Asset key
        key: String,
        /// Decoder error
        #[source]
        source: base64::DecodeError,
    },

    /// The archive could not be read
    #[error("Archive for '{key}' is unreadable: {source}")]
    Archive {
        /// Asset key
        key: String,
        /// Archive error
        #[source]
        source: zip::result::ZipError,
    },

    /// The archive holds no `.glb` entry
    #[error("No .glb entry in archive for '{key}'")]
    MissingArchiveEntry {
        /// Asset key
        key: String,
    },

    /// Bytes were fetched but could not be decoded
    #[error("Failed to decode '{key}': {reason}")]
    Decode {
        /// Asset key
        key: String,
        /// Decoder message
        reason: String,
    },

    /// No blob stored under this URL
    #[error("Blob not found: {0}")]
    BlobNotFound(String),

    /// File access failed
    #[error("IO error reading {path}: {source}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Locator truncated for error messages
pub(crate) fn preview(locator: &str) -> String {
    const LIMIT: usize = 50;
    match locator.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &locator[..cut]),
        None => locator.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names_roundtrip() {
        for category in AssetCategory::STANDARD {
            assert_eq!(AssetCategory::from(category.as_str()), category);
        }
        assert_eq!(AssetCategory::from("fonts"), AssetCategory::Other("fonts".to_string()));
    }

    #[test]
    fn test_preview_truncates_long_locators() {
        let long = format!("data:model/gltf-binary;base64,{}", "A".repeat(200));
        let short = preview(&long);
        assert!(short.len() < 60);
        assert!(short.ends_with("..."));
        assert_eq!(preview("blob:abc"), "blob:abc");
    }
}
