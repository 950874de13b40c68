//! Locator resolution and the decoded-asset cache
//!
//! Batches are resolved concurrently within a category; categories run one
//! after another (textures, models, scene documents, sounds). A failed entry
//! is reported in the [`LoadSummary`] and left out of the cache, it never fails
//! its siblings.

use std::collections::HashMap;

use base64::Engine;
use futures::future::join_all;
use serde_json::Value;

use super::archive::extract_first_glb;
use super::decoder::{AssetDecoder, ModelAsset, SoundAsset, TextureAsset};
use super::locator::{Locator, GLB_MEDIA_TYPE, ZIP_MEDIA_TYPE};
use super::registry::AssetRegistry;
use super::source::AssetSource;
use super::{preview, AssetCategory, AssetError};

/// Shortest base64 model payload accepted, in characters
pub const MIN_BASE64_LEN: usize = 10;
/// Smallest decoded model payload accepted, in bytes
pub const MIN_MODEL_BYTES: usize = 20;

#[derive(Debug)]
struct Cached<T> {
    locator: String,
    asset: T,
}

/// One entry that did not resolve
#[derive(Debug)]
pub struct LoadFailure {
    /// Category of the entry
    pub category: AssetCategory,
    /// Registry key
    pub key: String,
    /// What went wrong
    pub error: AssetError,
}

/// Outcome of a batch load
#[derive(Debug, Default)]
pub struct LoadSummary {
    /// Entries resolved during this load
    pub loaded: Vec<(AssetCategory, String)>,
    /// Entries that were already cached for the same locator
    pub cached: usize,
    /// Entries that failed, in category order
    pub failures: Vec<LoadFailure>,
}

impl LoadSummary {
    /// Whether every entry resolved
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failure for a specific entry
    pub fn failure(&self, category: &AssetCategory, key: &str) -> Option<&LoadFailure> {
        self.failures
            .iter()
            .find(|failure| &failure.category == category && failure.key == key)
    }

    fn record<T>(&mut self, category: &AssetCategory, key: String, result: Result<T, AssetError>) -> Option<T> {
        match result {
            Ok(asset) => {
                self.loaded.push((category.clone(), key));
                Some(asset)
            }
            Err(error) => {
                log::warn!("Failed to load {} asset '{}': {}", category, key, error);
                self.failures.push(LoadFailure {
                    category: category.clone(),
                    key,
                    error,
                });
                None
            }
        }
    }
}

/// Resolves registry locators into decoded assets
pub struct AssetLoader {
    source: Box<dyn AssetSource>,
    decoder: Box<dyn AssetDecoder>,
    textures: HashMap<String, Cached<TextureAsset>>,
    models: HashMap<String, Cached<ModelAsset>>,
    scenes: HashMap<String, Cached<Value>>,
    sounds: HashMap<String, Cached<SoundAsset>>,
}

impl AssetLoader {
    /// Loader over a byte source and a decoder
    pub fn new(source: Box<dyn AssetSource>, decoder: Box<dyn AssetDecoder>) -> Self {
        Self {
            source,
            decoder,
            textures: HashMap::new(),
            models: HashMap::new(),
            scenes: HashMap::new(),
            sounds: HashMap::new(),
        }
    }

    /// Swap the byte source and drop every cached asset
    pub fn set_source(&mut self, source: Box<dyn AssetSource>) {
        self.source = source;
        self.clear();
    }

    /// Drop every cached asset
    pub fn clear(&mut self) {
        self.textures.clear();
        self.models.clear();
        self.scenes.clear();
        self.sounds.clear();
    }

    /// Resolve every registered texture, model, scene document and sound
    pub async fn load_assets(&mut self, registry: &AssetRegistry) -> LoadSummary {
        let mut summary = LoadSummary::default();

        let category = AssetCategory::Textures;
        let pending = Self::pending(registry, &category, &self.textures, &mut summary);
        let results = join_all(pending.iter().map(|(key, locator)| self.resolve_texture(key, locator))).await;
        for ((key, locator), result) in pending.into_iter().zip(results) {
            if let Some(asset) = summary.record(&category, key.clone(), result) {
                self.textures.insert(key, Cached { locator, asset });
            }
        }

        let category = AssetCategory::Models;
        let pending = Self::pending(registry, &category, &self.models, &mut summary);
        let results = join_all(pending.iter().map(|(key, locator)| self.resolve_model(key, locator))).await;
        for ((key, locator), result) in pending.into_iter().zip(results) {
            if let Some(asset) = summary.record(&category, key.clone(), result) {
                self.models.insert(key, Cached { locator, asset });
            }
        }

        let category = AssetCategory::Scenes;
        let pending = Self::pending(registry, &category, &self.scenes, &mut summary);
        let results = join_all(pending.iter().map(|(key, locator)| self.resolve_scene_document(key, locator))).await;
        for ((key, locator), result) in pending.into_iter().zip(results) {
            if let Some(asset) = summary.record(&category, key.clone(), result) {
                self.scenes.insert(key, Cached { locator, asset });
            }
        }

        let category = AssetCategory::Sounds;
        let pending = Self::pending(registry, &category, &self.sounds, &mut summary);
        let results = join_all(pending.iter().map(|(key, locator)| self.resolve_sound(key, locator))).await;
        for ((key, locator), result) in pending.into_iter().zip(results) {
            if let Some(asset) = summary.record(&category, key.clone(), result) {
                self.sounds.insert(key, Cached { locator, asset });
            }
        }

        log::info!(
            "Asset load finished: {} loaded, {} cached, {} failed",
            summary.loaded.len(),
            summary.cached,
            summary.failures.len()
        );
        summary
    }

    /// Resolve one registered model; a no-op if it is cached for the same locator
    pub async fn load_model(&mut self, registry: &AssetRegistry, key: &str) -> Result<(), AssetError> {
        let locator = registry
            .get(&AssetCategory::Models, key)
            .ok_or_else(|| AssetError::NotRegistered {
                category: AssetCategory::Models,
                key: key.to_string(),
            })?;
        if self.models.get(key).is_some_and(|cached| cached.locator == locator) {
            return Ok(());
        }
        let asset = self.resolve_model(key, locator).await?;
        self.models.insert(
            key.to_string(),
            Cached {
                locator: locator.to_string(),
                asset,
            },
        );
        Ok(())
    }

    /// Resolve several registered models concurrently, returning the failures
    pub async fn load_models(&mut self, registry: &AssetRegistry, keys: &[String]) -> Vec<(String, AssetError)> {
        let mut failures = Vec::new();
        let mut pending = Vec::new();
        for key in keys {
            match registry.get(&AssetCategory::Models, key) {
                Some(locator) => {
                    let fresh = self.models.get(key).is_some_and(|cached| cached.locator == locator);
                    if !fresh && !pending.iter().any(|(k, _): &(String, String)| k == key) {
                        pending.push((key.clone(), locator.to_string()));
                    }
                }
                None => failures.push((
                    key.clone(),
                    AssetError::NotRegistered {
                        category: AssetCategory::Models,
                        key: key.clone(),
                    },
                )),
            }
        }

        let results = join_all(pending.iter().map(|(key, locator)| self.resolve_model(key, locator))).await;
        for ((key, locator), result) in pending.into_iter().zip(results) {
            match result {
                Ok(asset) => {
                    self.models.insert(key, Cached { locator, asset });
                }
                Err(error) => {
                    log::warn!("Failed to load model '{}': {}", key, error);
                    failures.push((key, error));
                }
            }
        }
        failures
    }

    /// Decoded model, logging the available keys when absent
    pub fn model(&self, key: &str) -> Option<&ModelAsset> {
        lookup(&self.models, "model", key)
    }

    /// Decoded texture, logging the available keys when absent
    pub fn texture(&self, key: &str) -> Option<&TextureAsset> {
        lookup(&self.textures, "texture", key)
    }

    /// Sound clip, logging the available keys when absent
    pub fn sound(&self, key: &str) -> Option<&SoundAsset> {
        lookup(&self.sounds, "sound", key)
    }

    /// Parsed scene document, logging the available keys when absent
    pub fn scene_document(&self, key: &str) -> Option<&Value> {
        lookup(&self.scenes, "scene document", key)
    }

    /// Whether a model is cached, without logging
    pub fn has_model(&self, key: &str) -> bool {
        self.models.contains_key(key)
    }

    /// Keys of every cached model
    pub fn model_keys(&self) -> Vec<&str> {
        sorted_keys(&self.models)
    }

    fn pending<T>(
        registry: &AssetRegistry,
        category: &AssetCategory,
        cache: &HashMap<String, Cached<T>>,
        summary: &mut LoadSummary,
    ) -> Vec<(String, String)> {
        registry
            .entries(category)
            .into_iter()
            .filter(|(key, locator)| {
                let fresh = cache.get(key).is_some_and(|cached| &cached.locator == locator);
                if fresh {
                    summary.cached += 1;
                }
                !fresh
            })
            .collect()
    }

    async fn resolve_model(&self, key: &str, locator: &str) -> Result<ModelAsset, AssetError> {
        let bytes = match Locator::parse(locator) {
            Some(Locator::Data { media_type, payload }) => {
                let bytes = decode_model_payload(key, payload)?;
                match media_type {
                    ZIP_MEDIA_TYPE => extract_first_glb(key, &bytes)?,
                    GLB_MEDIA_TYPE => bytes,
                    _ => return Err(unsupported(key, locator)),
                }
            }
            Some(parsed) => {
                let bytes = self.source.fetch(locator).await?;
                if parsed.is_zipped() {
                    extract_first_glb(key, &bytes)?
                } else {
                    bytes
                }
            }
            None => return Err(unsupported(key, locator)),
        };
        self.decoder.decode_model(key, &bytes)
    }

    async fn resolve_texture(&self, key: &str, locator: &str) -> Result<TextureAsset, AssetError> {
        let bytes = self.fetch_plain(key, locator).await?;
        self.decoder.decode_texture(key, &bytes)
    }

    async fn resolve_sound(&self, key: &str, locator: &str) -> Result<SoundAsset, AssetError> {
        let bytes = self.fetch_plain(key, locator).await?;
        self.decoder.decode_sound(key, bytes)
    }

    async fn resolve_scene_document(&self, key: &str, locator: &str) -> Result<Value, AssetError> {
        let bytes = self.fetch_plain(key, locator).await?;
        self.decoder.decode_scene_document(key, &bytes)
    }

    /// Bytes behind a non-model locator; `data:` URIs are decoded inline
    async fn fetch_plain(&self, key: &str, locator: &str) -> Result<Vec<u8>, AssetError> {
        match Locator::parse(locator) {
            Some(Locator::Data { payload, .. }) => decode_base64(key, payload),
            Some(_) => self.source.fetch(locator).await,
            None => Err(unsupported(key, locator)),
        }
    }
}

fn unsupported(key: &str, locator: &str) -> AssetError {
    AssetError::UnsupportedLocator {
        key: key.to_string(),
        locator: preview(locator),
    }
}

fn decode_base64(key: &str, payload: &str) -> Result<Vec<u8>, AssetError> {
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|source| AssetError::Base64 {
            key: key.to_string(),
            source,
        })
}

fn decode_model_payload(key: &str, payload: &str) -> Result<Vec<u8>, AssetError> {
    let payload = payload.trim();
    if payload.len() < MIN_BASE64_LEN {
        return Err(AssetError::PayloadTooShort {
            key: key.to_string(),
            length: payload.len(),
        });
    }
    log::debug!("Decoding base64 model '{}', {} characters", key, payload.len());
    let bytes = decode_base64(key, payload)?;
    if bytes.len() < MIN_MODEL_BYTES {
        return Err(AssetError::PayloadTooSmall {
            key: key.to_string(),
            length: bytes.len(),
        });
    }
    Ok(bytes)
}

fn sorted_keys<T>(cache: &HashMap<String, Cached<T>>) -> Vec<&str> {
    let mut keys: Vec<&str> = cache.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}

fn lookup<'a, T>(cache: &'a HashMap<String, Cached<T>>, kind: &str, key: &str) -> Option<&'a T> {
    let found = cache.get(key).map(|cached| &cached.asset);
    if found.is_none() {
        log::error!("{} not loaded: {}", kind, key);
        log::error!("Available {}s: {:?}", kind, sorted_keys(cache));
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{BlobStore, LocalAssetSource, StandardDecoder};
    use crate::tests::fixtures::{data_uri, minimal_glb, png_bytes, zip_with};
    use futures::executor::block_on;

    fn loader(blobs: &BlobStore) -> AssetLoader {
        AssetLoader::new(
            Box::new(LocalAssetSource::new(".", blobs.clone())),
            Box::new(StandardDecoder),
        )
    }

    #[test]
    fn test_zip_without_glb_fails_alone() {
        let blobs = BlobStore::new();
        let mut registry = AssetRegistry::new();
        let archive = zip_with(&[("notes.txt", &b"no model in here, only notes"[..])]);
        registry.add_asset(AssetCategory::Models, "broken", data_uri(ZIP_MEDIA_TYPE, &archive));
        registry.add_asset(AssetCategory::Textures, "grass", data_uri("image/png", &png_bytes(2, 2)));

        let mut loader = loader(&blobs);
        let summary = block_on(loader.load_assets(&registry));

        assert_eq!(summary.failures.len(), 1);
        assert!(matches!(
            summary.failure(&AssetCategory::Models, "broken").map(|f| &f.error),
            Some(AssetError::MissingArchiveEntry { .. })
        ));
        assert!(loader.texture("grass").is_some());
        assert!(loader.model("broken").is_none());
    }

    #[test]
    fn test_zip_wrapped_glb_resolves() {
        let blobs = BlobStore::new();
        let mut registry = AssetRegistry::new();
        let archive = zip_with(&[("robot/robot.glb", minimal_glb().as_slice())]);
        registry.add_asset(AssetCategory::Models, "robot", data_uri(ZIP_MEDIA_TYPE, &archive));

        let mut loader = loader(&blobs);
        assert!(block_on(loader.load_assets(&registry)).is_complete());
        assert!(loader.has_model("robot"));
    }

    #[test]
    fn test_undersized_payloads_name_key_and_length() {
        let blobs = BlobStore::new();
        let mut registry = AssetRegistry::new();
        registry.add_asset(AssetCategory::Models, "tiny", "data:model/gltf-binary;base64,AAAA");
        registry.add_asset(AssetCategory::Models, "small", data_uri(GLB_MEDIA_TYPE, &[7u8; 12]));

        let mut loader = loader(&blobs);
        let summary = block_on(loader.load_assets(&registry));

        let tiny = summary.failure(&AssetCategory::Models, "tiny").unwrap();
        assert_eq!(tiny.error.to_string(), "Base64 payload for 'tiny' is too short: 4 characters");
        let small = summary.failure(&AssetCategory::Models, "small").unwrap();
        assert!(matches!(small.error, AssetError::PayloadTooSmall { length: 12, .. }));
    }

    #[test]
    fn test_unsupported_locator_is_reported() {
        let blobs = BlobStore::new();
        let mut registry = AssetRegistry::new();
        registry.add_asset(AssetCategory::Models, "mystery", "robot");

        let mut loader = loader(&blobs);
        let summary = block_on(loader.load_assets(&registry));
        assert!(matches!(
            summary.failure(&AssetCategory::Models, "mystery").map(|f| &f.error),
            Some(AssetError::UnsupportedLocator { .. })
        ));
    }

    #[test]
    fn test_load_model_is_idempotent_per_locator() {
        let blobs = BlobStore::new();
        blobs.insert("blob:abc", minimal_glb());
        let mut registry = AssetRegistry::new();
        registry.add_asset(AssetCategory::Models, "robot", "blob:abc");

        let mut loader = loader(&blobs);
        block_on(loader.load_model(&registry, "robot")).unwrap();

        // Cached: works even after the blob is gone
        blobs.revoke("blob:abc");
        block_on(loader.load_model(&registry, "robot")).unwrap();

        // A new locator forces re-resolution
        registry.add_asset(AssetCategory::Models, "robot", "blob:def");
        assert!(matches!(
            block_on(loader.load_model(&registry, "robot")),
            Err(AssetError::BlobNotFound(_))
        ));
    }

    #[test]
    fn test_second_batch_load_uses_cache() {
        let blobs = BlobStore::new();
        blobs.insert("blob:abc", minimal_glb());
        let mut registry = AssetRegistry::new();
        registry.add_asset(AssetCategory::Models, "robot", "blob:abc");

        let mut loader = loader(&blobs);
        assert_eq!(block_on(loader.load_assets(&registry)).loaded.len(), 1);
        let again = block_on(loader.load_assets(&registry));
        assert!(again.loaded.is_empty());
        assert_eq!(again.cached, 1);
    }

    #[test]
    fn test_load_models_reports_unregistered_and_broken() {
        let blobs = BlobStore::new();
        blobs.insert("blob:good", minimal_glb());
        let mut registry = AssetRegistry::new();
        registry.add_asset(AssetCategory::Models, "good", "blob:good");
        registry.add_asset(AssetCategory::Models, "gone", "blob:gone");

        let mut loader = loader(&blobs);
        let keys = ["good", "gone", "never"].map(String::from);
        let failures = block_on(loader.load_models(&registry, &keys));

        let failed: Vec<&str> = failures.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(failed, vec!["never", "gone"]);
        assert_eq!(loader.model_keys(), vec!["good"]);
    }

    #[test]
    fn test_scene_documents_and_sounds_resolve() {
        let blobs = BlobStore::new();
        let mut registry = AssetRegistry::new();
        registry.add_asset(AssetCategory::Scenes, "level", data_uri("application/json", b"[]"));
        registry.add_asset(AssetCategory::Sounds, "hit", data_uri("audio/ogg", b"OggS\0\x02rest"));

        let mut loader = loader(&blobs);
        assert!(block_on(loader.load_assets(&registry)).is_complete());
        assert_eq!(loader.scene_document("level"), Some(&Value::Array(Vec::new())));
        assert_eq!(loader.sound("hit").map(|s| s.format), Some(crate::assets::SoundFormat::Ogg));
    }
}
