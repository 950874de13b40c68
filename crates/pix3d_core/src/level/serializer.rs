//! Scene graph → level document

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::config::SceneConfig;
use crate::scene::{NodeKind, Scene};

use super::format::{LevelItem, Vec3Record};

/// Scene saving errors
#[derive(Error, Debug)]
pub enum SerializeError {
    /// The level document could not be encoded
    #[error("Failed to encode level JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The level file could not be written
    #[error("Failed to write level file {path}: {source}")]
    Io {
        /// Target path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Writes game objects back out in the level format
pub struct SceneSerializer<'a> {
    config: &'a SceneConfig,
}

impl<'a> SceneSerializer<'a> {
    /// Serializer applying the given scene defaults
    pub fn new(config: &'a SceneConfig) -> Self {
        Self { config }
    }

    /// One item per game object anywhere below the root, in pre-order
    pub fn serialize(&self, scene: &Scene) -> Vec<LevelItem> {
        scene
            .descendants(scene.root())
            .into_iter()
            .filter_map(|key| scene.node(key))
            .filter_map(|node| {
                let NodeKind::GameObject(object) = &node.kind else {
                    return None;
                };
                let animation = object
                    .animator
                    .current_clip()
                    .map_or_else(|| self.config.default_animation.clone(), |clip| clip.name.clone());
                let name = if node.name.is_empty() {
                    object.object_type.clone()
                } else {
                    node.name.clone()
                };
                Some(LevelItem {
                    name,
                    model_name: object.model_name.clone(),
                    object_type: Some(object.object_type.clone()),
                    no_collider: object.no_collider,
                    animation: Some(animation),
                    position: node.transform.position.into(),
                    rotation: Vec3Record::from(node.transform.euler()),
                    scale: node.transform.scale.into(),
                    quaternion: None,
                    behaviors: node.behaviors.iter().map(|b| b.to_config_value()).collect(),
                })
            })
            .collect()
    }

    /// Pretty-printed level JSON
    pub fn to_json(&self, scene: &Scene) -> Result<String, SerializeError> {
        Ok(serde_json::to_string_pretty(&self.serialize(scene))?)
    }

    /// Encode the whole document, then write it in one call
    pub fn save_to_file(&self, scene: &Scene, path: impl AsRef<Path>) -> Result<(), SerializeError> {
        let path = path.as_ref();
        let json = self.to_json(scene)?;
        fs::write(path, json).map_err(|source| SerializeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Saved scene to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetCategory, AssetLoader, AssetRegistry, BlobStore, LocalAssetSource, StandardDecoder};
    use crate::behaviors::{Behavior, BehaviorConfig};
    use crate::foundation::math::{Transform, Vec3};
    use crate::level::SceneLoader;
    use crate::scene::{GameObject, Node};
    use crate::tests::fixtures::minimal_glb;
    use approx::assert_relative_eq;
    use futures::executor::block_on;
    use serde_json::json;

    fn placed(scene: &mut Scene, name: &str, position: Vec3) -> crate::foundation::collections::NodeKey {
        let node = Node::new(name, NodeKind::GameObject(GameObject::new("robot.glb")))
            .with_transform(Transform::from_euler(position, Vec3::new(0.1, 0.2, 0.3), Vec3::new(1.0, 2.0, 1.0)));
        scene.add_game_object(node)
    }

    #[test]
    fn test_only_game_objects_are_written() {
        let config = SceneConfig::default();
        let mut scene = Scene::new();
        scene.initialize_lights(&config);
        let parent = placed(&mut scene, "parent", Vec3::zeros());
        let nested = Node::new("nested", NodeKind::GameObject(GameObject::new("robot.glb")));
        scene.add_child(parent, nested).unwrap();

        let items = SceneSerializer::new(&config).serialize(&scene);
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["parent", "nested"]);
        assert_eq!(items[0].animation.as_deref(), Some("Idle"));
        assert_eq!(items[0].object_type.as_deref(), Some("GameObject"));
    }

    #[test]
    fn test_json_field_names() {
        let config = SceneConfig::default();
        let mut scene = Scene::new();
        let key = placed(&mut scene, "", Vec3::new(1.0, 2.0, 3.0));
        let behavior = Behavior::from_config(
            key,
            &json!({"type": "MoveByCheckpoints", "checkpoints": [{"position": {"x": 1, "y": 0, "z": 0}}]}),
        )
        .unwrap();
        scene.node_mut(key).unwrap().behaviors.push(behavior);

        let json: serde_json::Value = serde_json::from_str(&SceneSerializer::new(&config).to_json(&scene).unwrap()).unwrap();
        let item = &json[0];
        assert_eq!(item["name"], "GameObject");
        assert_eq!(item["modelName"], "robot.glb");
        assert_eq!(item["noCollider"], false);
        assert_eq!(item["position"]["z"], 3.0);
        assert_eq!(item["behaviors"][0]["type"], "MoveByCheckpoints");
        assert_eq!(item["behaviors"][0]["checkpoints"][0]["position"]["x"], 1.0);
        assert!(item.get("quaternion").is_none());
    }

    #[test]
    fn test_round_trip_preserves_objects() {
        let config = SceneConfig::default();
        let mut scene = Scene::new();
        let a = placed(&mut scene, "a", Vec3::new(1.0, 0.0, -2.0));
        placed(&mut scene, "b", Vec3::new(0.0, 3.0, 0.0));
        let destructable = json!({"type": "Destructable", "health": 40, "destroyDelay": 0.5});
        scene
            .node_mut(a)
            .unwrap()
            .behaviors
            .push(Behavior::from_config(a, &destructable).unwrap());

        let json = SceneSerializer::new(&config).to_json(&scene).unwrap();

        let blobs = BlobStore::new();
        blobs.insert("blob:robot", minimal_glb());
        let mut registry = AssetRegistry::new();
        registry.add_asset(AssetCategory::Models, "robot.glb", "blob:robot");
        let mut assets = AssetLoader::new(Box::new(LocalAssetSource::new(".", blobs)), Box::new(StandardDecoder));
        let (reloaded, report) =
            block_on(SceneLoader::new(&config).load_from_json(&json, &registry, &mut assets)).unwrap();

        assert_eq!(report.loaded.len(), 2);
        assert!(report.skipped.is_empty());
        for (before, copy) in scene.objects().iter().zip(reloaded.objects()) {
            let before = scene.node(*before).unwrap();
            let copy = reloaded.node(*copy).unwrap();
            assert_eq!(before.name, copy.name);
            assert_relative_eq!(before.transform.position, copy.transform.position, epsilon = 1e-5);
            assert_relative_eq!(before.transform.scale, copy.transform.scale, epsilon = 1e-5);
            assert!(before.transform.rotation.angle_to(&copy.transform.rotation) < 1e-4);
            let configs: Vec<BehaviorConfig> = before.behaviors.iter().map(Behavior::config).collect();
            let copied: Vec<BehaviorConfig> = copy.behaviors.iter().map(Behavior::config).collect();
            assert_eq!(configs, copied);
        }
    }

    #[test]
    fn test_save_to_missing_directory_fails_without_partial_file() {
        let config = SceneConfig::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("scene.json");
        let result = SceneSerializer::new(&config).save_to_file(&Scene::new(), &path);
        assert!(matches!(result, Err(SerializeError::Io { .. })));
        assert!(!path.exists());

        let path = dir.path().join("scene.json");
        SceneSerializer::new(&config).save_to_file(&Scene::new(), &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }
}
