//! JSON level file records
//!
//! A level file is a JSON array of [`LevelItem`]s. Parsing is tolerant: an item
//! that fails to decode is reported and skipped, the rest still load.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::foundation::math::{Quat, Quaternion, Vec3};

use super::LevelError;

/// `{x, y, z}` record; missing components read as zero
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3Record {
    /// X component
    #[serde(default)]
    pub x: f32,
    /// Y component
    #[serde(default)]
    pub y: f32,
    /// Z component
    #[serde(default)]
    pub z: f32,
}

impl Vec3Record {
    /// Create a record
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// `{1, 1, 1}`
    pub fn one() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

impl From<Vec3> for Vec3Record {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vec3Record> for Vec3 {
    fn from(r: Vec3Record) -> Self {
        Vec3::new(r.x, r.y, r.z)
    }
}

/// `{x, y, z, w}` quaternion record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuatRecord {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
    /// W component
    pub w: f32,
}

impl From<QuatRecord> for Quat {
    fn from(r: QuatRecord) -> Self {
        Quat::new_normalize(Quaternion::new(r.w, r.x, r.y, r.z))
    }
}

fn unit_scale() -> Vec3Record {
    Vec3Record::one()
}

/// One placed object in a level file
///
/// Field order matches the order objects are written back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelItem {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Registry key of the model
    pub model_name: String,
    /// Object type tag
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    /// Suppress the default box collider
    #[serde(default)]
    pub no_collider: bool,
    /// Clip to start playing after load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
    /// Position relative to the scene root
    #[serde(default)]
    pub position: Vec3Record,
    /// Euler XYZ rotation in radians
    #[serde(default)]
    pub rotation: Vec3Record,
    /// Scale
    #[serde(default = "unit_scale")]
    pub scale: Vec3Record,
    /// Accepted for compatibility; `rotation` is authoritative on load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quaternion: Option<QuatRecord>,
    /// Behavior configurations, each tagged by `type`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub behaviors: Vec<Value>,
}

impl LevelItem {
    /// Item with identity transform and no behaviors
    pub fn new(name: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_name: model_name.into(),
            object_type: None,
            no_collider: false,
            animation: None,
            position: Vec3Record::default(),
            rotation: Vec3Record::default(),
            scale: Vec3Record::one(),
            quaternion: None,
            behaviors: Vec::new(),
        }
    }
}

/// An array element that could not be decoded
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedItem {
    /// Index in the level array
    pub index: usize,
    /// Decode error
    pub reason: String,
}

/// Parse a level document, collecting malformed elements instead of failing
pub fn parse_level(json: &str) -> Result<(Vec<LevelItem>, Vec<MalformedItem>), LevelError> {
    let document: Value = serde_json::from_str(json)?;
    parse_level_value(document)
}

/// Same as [`parse_level`] for an already-parsed document
pub fn parse_level_value(document: Value) -> Result<(Vec<LevelItem>, Vec<MalformedItem>), LevelError> {
    let Value::Array(elements) = document else {
        return Err(LevelError::NotAnArray);
    };

    let mut items = Vec::with_capacity(elements.len());
    let mut malformed = Vec::new();
    for (index, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<LevelItem>(element) {
            Ok(item) => items.push(item),
            Err(e) => {
                log::warn!("Skipping malformed level item #{}: {}", index, e);
                malformed.push(MalformedItem {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok((items, malformed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_transform_fields_use_defaults() {
        let (items, malformed) = parse_level(r#"[{"name": "a", "modelName": "a.glb"}]"#).unwrap();
        assert!(malformed.is_empty());
        let item = &items[0];
        assert_eq!(item.position, Vec3Record::default());
        assert_eq!(item.rotation, Vec3Record::default());
        assert_eq!(item.scale, Vec3Record::one());
        assert!(!item.no_collider);
    }

    #[test]
    fn test_malformed_item_is_skipped() {
        let json = r#"[
            {"name": "ok", "modelName": "ok.glb"},
            {"name": "no model"},
            {"name": "ok2", "modelName": "ok2.glb", "position": {"x": 1}}
        ]"#;
        let (items, malformed) = parse_level(json).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(malformed.len(), 1);
        assert_eq!(malformed[0].index, 1);
        assert_eq!(items[1].position, Vec3Record::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_non_array_document_is_rejected() {
        assert!(matches!(parse_level(r#"{"name": "x"}"#), Err(LevelError::NotAnArray)));
        assert!(matches!(parse_level("not json"), Err(LevelError::Json(_))));
    }

    #[test]
    fn test_quaternion_is_accepted() {
        let json = r#"[{"modelName": "a.glb", "quaternion": {"x": 0, "y": 0, "z": 0, "w": 1}}]"#;
        let (items, _) = parse_level(json).unwrap();
        let rotation: Quat = items[0].quaternion.unwrap().into();
        assert_eq!(rotation, Quat::identity());
    }

    #[test]
    fn test_serialized_field_names_are_camel_case() {
        let mut item = LevelItem::new("robot", "robot.glb");
        item.object_type = Some("GameObject".to_string());
        let value = serde_json::to_value(&item).unwrap();
        assert!(value.get("modelName").is_some());
        assert!(value.get("noCollider").is_some());
        assert_eq!(value["type"], "GameObject");
        assert!(value.get("behaviors").is_none());
    }
}
