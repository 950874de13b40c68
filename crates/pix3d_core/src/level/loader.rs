//! Level document → scene graph
//!
//! Loading runs in three phases: parse the document tolerantly, resolve every
//! distinct model the items reference (concurrently, before any node exists),
//! then instantiate one game object per item whose model resolved.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::assets::{AssetCategory, AssetLoader, AssetRegistry, ModelAsset};
use crate::behaviors::{Behavior, BehaviorError};
use crate::core::config::SceneConfig;
use crate::foundation::collections::NodeKey;
use crate::foundation::math::{Transform, Vec3};
use crate::scene::{Animator, GameObject, LoopMode, Node, NodeKind, Scene, GAME_OBJECT_TYPE};

use super::format::{parse_level_value, LevelItem};
use super::LevelError;

/// Why a level item produced no node
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The element could not be decoded
    Malformed(String),
    /// `modelName` does not end in a loadable model extension
    UnsupportedModel,
    /// `modelName` is not in the asset registry
    Unregistered,
    /// The model is registered but did not resolve
    ModelFailed(String),
}

/// A level item left out of the scene
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedItem {
    /// Index in the level array
    pub index: usize,
    /// Item name, empty for malformed elements
    pub name: String,
    /// Model reference, empty for malformed elements
    pub model_name: String,
    /// Why it was skipped
    pub reason: SkipReason,
}

/// A behavior configuration that was not attached
#[derive(Debug)]
pub struct BehaviorWarning {
    /// Node the behavior was declared on
    pub node: NodeKey,
    /// Why it was rejected
    pub error: BehaviorError,
}

/// What a level load produced
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Game objects created, in document order
    pub loaded: Vec<NodeKey>,
    /// Items left out, in document order
    pub skipped: Vec<SkippedItem>,
    /// Rejected behavior configurations
    pub behavior_warnings: Vec<BehaviorWarning>,
}

/// Builds scenes from level documents
pub struct SceneLoader<'a> {
    config: &'a SceneConfig,
}

impl<'a> SceneLoader<'a> {
    /// Loader applying the given scene defaults
    pub fn new(config: &'a SceneConfig) -> Self {
        Self { config }
    }

    /// Parse and load a level document
    pub async fn load_from_json(
        &self,
        json: &str,
        registry: &AssetRegistry,
        assets: &mut AssetLoader,
    ) -> Result<(Scene, LoadReport), LevelError> {
        let document: Value = serde_json::from_str(json)?;
        self.load_from_value(document, registry, assets).await
    }

    /// Load an already-parsed level document
    pub async fn load_from_value(
        &self,
        document: Value,
        registry: &AssetRegistry,
        assets: &mut AssetLoader,
    ) -> Result<(Scene, LoadReport), LevelError> {
        let (items, malformed) = parse_level_value(document)?;
        let mut report = LoadReport::default();
        report.skipped.extend(malformed.into_iter().map(|m| SkippedItem {
            index: m.index,
            name: String::new(),
            model_name: String::new(),
            reason: SkipReason::Malformed(m.reason),
        }));

        // Array positions of the decoded items
        let malformed: BTreeSet<usize> = report.skipped.iter().map(|s| s.index).collect();
        let indices: Vec<usize> = (0..items.len() + malformed.len())
            .filter(|i| !malformed.contains(i))
            .collect();

        let mut needed = BTreeSet::new();
        for item in &items {
            if !self.config.is_loadable_model(&item.model_name) {
                continue;
            }
            if registry.contains(&AssetCategory::Models, &item.model_name) {
                needed.insert(item.model_name.clone());
            } else {
                log::warn!("Model '{}' is not registered; skipping items that use it", item.model_name);
            }
        }
        let needed: Vec<String> = needed.into_iter().collect();
        let failures = assets.load_models(registry, &needed).await;

        let mut scene = Scene::new();
        for (index, item) in indices.into_iter().zip(items) {
            let reason = if !self.config.is_loadable_model(&item.model_name) {
                Some(SkipReason::UnsupportedModel)
            } else if !registry.contains(&AssetCategory::Models, &item.model_name) {
                Some(SkipReason::Unregistered)
            } else {
                failures
                    .iter()
                    .find(|(key, _)| *key == item.model_name)
                    .map(|(_, error)| SkipReason::ModelFailed(error.to_string()))
            };

            if let Some(reason) = reason {
                log::warn!("Skipping level item '{}' ({}): {:?}", item.name, item.model_name, reason);
                report.skipped.push(SkippedItem {
                    index,
                    name: item.name,
                    model_name: item.model_name,
                    reason,
                });
                continue;
            }

            match self.instantiate(&mut scene, &item, assets) {
                Ok((key, warnings)) => {
                    report.loaded.push(key);
                    report.behavior_warnings.extend(warnings);
                }
                Err(error) => report.skipped.push(SkippedItem {
                    index,
                    name: item.name,
                    model_name: item.model_name,
                    reason: SkipReason::ModelFailed(error.to_string()),
                }),
            }
        }
        report.skipped.sort_by_key(|s| s.index);

        log::info!(
            "Level loaded: {} object(s), {} skipped",
            report.loaded.len(),
            report.skipped.len()
        );
        Ok((scene, report))
    }

    /// Create one game object from an item whose model is already loaded
    pub fn instantiate(
        &self,
        scene: &mut Scene,
        item: &LevelItem,
        assets: &AssetLoader,
    ) -> Result<(NodeKey, Vec<BehaviorWarning>), LevelError> {
        let model = assets
            .model(&item.model_name)
            .ok_or_else(|| LevelError::ModelNotLoaded(item.model_name.clone()))?;
        Ok(self.spawn(scene, item, model))
    }

    fn spawn(&self, scene: &mut Scene, item: &LevelItem, model: &ModelAsset) -> (NodeKey, Vec<BehaviorWarning>) {
        let mut object = GameObject::new(item.model_name.clone());
        object.object_type = item.object_type.clone().unwrap_or_else(|| GAME_OBJECT_TYPE.to_string());
        object.no_collider = item.no_collider;
        object.animator = Animator::new(model.clips.clone());

        let transform = Transform::from_euler(item.position.into(), item.rotation.into(), item.scale.into());
        let key = scene.add_game_object(Node::new(item.name.clone(), NodeKind::GameObject(object)).with_transform(transform));

        let model_node = Node::new(
            "model",
            NodeKind::Model {
                asset_key: item.model_name.clone(),
                bounds: model.bounds,
            },
        );
        let model_key = scene.add_child(key, model_node).ok();

        let collider_key = if item.no_collider {
            None
        } else {
            let [ox, oy, oz] = self.config.collider_offset;
            let [sx, sy, sz] = self.config.collider_size;
            let collider = Node::new("collider", NodeKind::Collider).with_transform(Transform {
                position: Vec3::new(ox, oy, oz),
                scale: Vec3::new(sx, sy, sz),
                ..Transform::default()
            });
            scene.add_child(key, collider).ok()
        };

        let mut warnings = Vec::new();
        let mut behaviors = Vec::with_capacity(item.behaviors.len());
        for config in &item.behaviors {
            match Behavior::from_config(key, config) {
                Ok(behavior) => behaviors.push(behavior),
                Err(error) => {
                    log::warn!("Ignoring behavior on '{}': {}", item.name, error);
                    warnings.push(BehaviorWarning { node: key, error });
                }
            }
        }

        if let Some(node) = scene.node_mut(key) {
            node.behaviors = behaviors;
            if let Some(object) = node.game_object_mut() {
                object.model = model_key;
                object.collider = collider_key;
                if let Some(clip) = &item.animation {
                    object.animator.play(clip, LoopMode::Repeat);
                }
            }
        }
        (key, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{BlobStore, LocalAssetSource, StandardDecoder};
    use crate::behaviors::BehaviorKind;
    use crate::tests::fixtures::minimal_glb;
    use approx::assert_relative_eq;
    use futures::executor::block_on;

    fn setup() -> (AssetRegistry, AssetLoader) {
        let blobs = BlobStore::new();
        blobs.insert("blob:robot", minimal_glb());
        let mut registry = AssetRegistry::new();
        registry.add_asset(AssetCategory::Models, "robot.glb", "blob:robot");
        registry.add_asset(AssetCategory::Models, "broken.glb", "blob:missing");
        let loader = AssetLoader::new(Box::new(LocalAssetSource::new(".", blobs)), Box::new(StandardDecoder));
        (registry, loader)
    }

    #[test]
    fn test_items_are_skipped_for_each_reason() {
        let (registry, mut assets) = setup();
        let config = SceneConfig::default();
        let json = r#"[
            {"name": "a", "modelName": "robot.glb", "position": {"x": 1, "y": 2, "z": 3}},
            {"name": "b", "modelName": "ghost.glb"},
            {"name": "c", "modelName": "robot.fbx"},
            {"name": "d"},
            {"name": "e", "modelName": "broken.glb"}
        ]"#;
        let (scene, report) = block_on(SceneLoader::new(&config).load_from_json(json, &registry, &mut assets)).unwrap();

        assert_eq!(report.loaded.len(), 1);
        assert_eq!(scene.objects(), report.loaded.as_slice());
        let reasons: Vec<_> = report.skipped.iter().map(|s| (s.index, s.reason.clone())).collect();
        assert_eq!(reasons[0], (1, SkipReason::Unregistered));
        assert_eq!(reasons[1], (2, SkipReason::UnsupportedModel));
        assert!(matches!(reasons[2], (3, SkipReason::Malformed(_))));
        assert!(matches!(reasons[3], (4, SkipReason::ModelFailed(_))));

        let node = scene.node(report.loaded[0]).unwrap();
        assert_relative_eq!(node.transform.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_collider_and_model_children() {
        let (registry, mut assets) = setup();
        let config = SceneConfig::default();
        let json = r#"[
            {"name": "with", "modelName": "robot.glb"},
            {"name": "without", "modelName": "robot.glb", "noCollider": true}
        ]"#;
        let (scene, report) = block_on(SceneLoader::new(&config).load_from_json(json, &registry, &mut assets)).unwrap();

        let with = scene.node(report.loaded[0]).unwrap().game_object().unwrap();
        let collider = scene.node(with.collider.unwrap()).unwrap();
        assert_relative_eq!(collider.transform.position, Vec3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(collider.transform.scale, Vec3::new(0.8, 1.1, 0.8));
        assert!(with.model.is_some());

        let without = scene.node(report.loaded[1]).unwrap().game_object().unwrap();
        assert!(without.collider.is_none());
        assert_eq!(scene.children(report.loaded[1]).len(), 1);
    }

    #[test]
    fn test_behaviors_attach_and_unknown_tags_warn() {
        let (registry, mut assets) = setup();
        let config = SceneConfig::default();
        let json = r#"[{
            "name": "guard",
            "modelName": "robot.glb",
            "behaviors": [
                {"type": "Destructable", "health": 20},
                {"type": "Flying"},
                {"type": "MoveByCheckpoints", "checkpoints": [{"position": {"x": 1}}], "speed": 2}
            ]
        }]"#;
        let (scene, report) = block_on(SceneLoader::new(&config).load_from_json(json, &registry, &mut assets)).unwrap();

        let key = report.loaded[0];
        let node = scene.node(key).unwrap();
        assert_eq!(node.behaviors.len(), 2);
        assert!(node.behaviors.iter().all(|b| b.owner() == key));
        assert!(matches!(node.behaviors[1].kind(), BehaviorKind::MoveByCheckpoints(_)));
        assert_eq!(report.behavior_warnings.len(), 1);
        assert!(matches!(&report.behavior_warnings[0].error, BehaviorError::UnknownType(t) if t == "Flying"));
    }

    #[test]
    fn test_document_must_be_an_array() {
        let (registry, mut assets) = setup();
        let config = SceneConfig::default();
        let result = block_on(SceneLoader::new(&config).load_from_json("{}", &registry, &mut assets));
        assert!(matches!(result, Err(LevelError::NotAnArray)));
    }

    #[test]
    fn test_instantiate_requires_loaded_model() {
        let (_, assets) = setup();
        let config = SceneConfig::default();
        let mut scene = Scene::new();
        let result = SceneLoader::new(&config).instantiate(&mut scene, &LevelItem::new("x", "robot.glb"), &assets);
        assert!(matches!(result, Err(LevelError::ModelNotLoaded(name)) if name == "robot.glb"));
    }
}
