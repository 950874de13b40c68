//! Asset decoding
//!
//! The editor core only needs a thin view of each asset: animation clips and
//! bounds for models, dimensions and pixels for textures, and a container
//! format for sounds. Rendering-grade decoding is left to the renderer.

use serde_json::Value;

use crate::foundation::math::Vec3;
use crate::scene::{AnimationClip, AABB};

use super::AssetError;

/// Decoded model container
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAsset {
    /// Animation clips in container order
    pub clips: Vec<AnimationClip>,
    /// Union of mesh primitive bounds in model space
    pub bounds: AABB,
    /// Number of meshes
    pub mesh_count: usize,
    /// Size of the container in bytes
    pub byte_len: usize,
}

/// Texture color space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Gamma-encoded color data
    Srgb,
    /// Linear data such as normal maps
    Linear,
}

/// Decoded image ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct TextureAsset {
    /// Raw RGBA pixel data
    pub rgba: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Color space the renderer should sample in
    pub color_space: ColorSpace,
}

/// Audio container format, sniffed from magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundFormat {
    /// RIFF/WAVE
    Wav,
    /// Ogg container
    Ogg,
    /// MPEG layer 3
    Mp3,
    /// Anything else; handed to the audio backend as-is
    Unknown,
}

/// Undecoded audio clip
#[derive(Debug, Clone, PartialEq)]
pub struct SoundAsset {
    /// Container format
    pub format: SoundFormat,
    /// Encoded bytes
    pub bytes: Vec<u8>,
}

/// Turns fetched bytes into assets
pub trait AssetDecoder {
    /// Decode a GLB or glTF container
    fn decode_model(&self, key: &str, bytes: &[u8]) -> Result<ModelAsset, AssetError>;

    /// Decode an image
    fn decode_texture(&self, key: &str, bytes: &[u8]) -> Result<TextureAsset, AssetError>;

    /// Wrap audio bytes
    fn decode_sound(&self, key: &str, bytes: Vec<u8>) -> Result<SoundAsset, AssetError> {
        let _ = key;
        Ok(SoundAsset {
            format: sniff_sound_format(&bytes),
            bytes,
        })
    }

    /// Parse a scene JSON document
    fn decode_scene_document(&self, key: &str, bytes: &[u8]) -> Result<Value, AssetError> {
        serde_json::from_slice(bytes).map_err(|e| AssetError::Decode {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Decoder backed by the `gltf` and `image` crates
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDecoder;

impl AssetDecoder for StandardDecoder {
    fn decode_model(&self, key: &str, bytes: &[u8]) -> Result<ModelAsset, AssetError> {
        let gltf = gltf::Gltf::from_slice(bytes).map_err(|e| AssetError::Decode {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        let clips: Vec<AnimationClip> = gltf
            .animations()
            .map(|animation| {
                let duration = animation
                    .samplers()
                    .filter_map(|sampler| accessor_scalar_max(sampler.input().max()))
                    .fold(0.0_f32, f32::max);
                let name = animation
                    .name()
                    .map_or_else(|| format!("Animation{}", animation.index()), str::to_string);
                AnimationClip::new(name, duration)
            })
            .collect();

        let bounds = gltf
            .meshes()
            .flat_map(|mesh| mesh.primitives())
            .filter_map(|primitive| {
                let positions = primitive.get(&gltf::Semantic::Positions)?;
                let min = accessor_vec3(positions.min())?;
                let max = accessor_vec3(positions.max())?;
                Some(AABB::new(min, max))
            })
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(AABB::unit);

        log::debug!("Decoded model '{}': {} clip(s), {} bytes", key, clips.len(), bytes.len());
        Ok(ModelAsset {
            clips,
            bounds,
            mesh_count: gltf.meshes().len(),
            byte_len: bytes.len(),
        })
    }

    fn decode_texture(&self, key: &str, bytes: &[u8]) -> Result<TextureAsset, AssetError> {
        let img = image::load_from_memory(bytes).map_err(|e| AssetError::Decode {
            key: key.to_string(),
            reason: format!("Failed to load image: {}", e),
        })?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();
        log::debug!("Loaded texture '{}' {}x{}", key, width, height);

        Ok(TextureAsset {
            rgba: rgba_img.into_raw(),
            width,
            height,
            color_space: ColorSpace::Srgb,
        })
    }
}

fn accessor_scalar_max(value: Option<Value>) -> Option<f32> {
    let value = value?;
    let first = match &value {
        Value::Array(items) => items.first()?.as_f64()?,
        other => other.as_f64()?,
    };
    Some(first as f32)
}

fn accessor_vec3(value: Option<Value>) -> Option<Vec3> {
    let [x, y, z]: [f32; 3] = serde_json::from_value(value?).ok()?;
    Some(Vec3::new(x, y, z))
}

/// Identify an audio container from its first bytes
pub fn sniff_sound_format(bytes: &[u8]) -> SoundFormat {
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
        SoundFormat::Wav
    } else if bytes.starts_with(b"OggS") {
        SoundFormat::Ogg
    } else if bytes.starts_with(b"ID3") || (bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0) {
        SoundFormat::Mp3
    } else {
        SoundFormat::Unknown
    }
}
