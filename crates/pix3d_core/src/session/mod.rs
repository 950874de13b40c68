//! The editing session
//!
//! [`EditorSession`] owns the current scene, the selection, the asset
//! registry and loader, and the three notification streams. It is built and
//! passed around explicitly; there is no process-wide instance.

mod commands;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::assets::{
    AssetCategory, AssetDecoder, AssetError, AssetLoader, AssetRegistry, BlobStore, LoadSummary, LocalAssetSource,
    StandardDecoder,
};
use crate::core::config::EditorConfig;
use crate::events::{ListenerKind, Subscribers, Subscription};
use crate::foundation::collections::NodeKey;
use crate::foundation::math::Vec3;
use crate::level::{LevelError, LevelItem, LoadReport, SceneLoader, SceneSerializer, SerializeError};
use crate::project::{scan_project, ProjectError, ScanReport};
use crate::scene::{AABB, GameObject, Node, NodeKind, Scene, SceneError, TickReport};

/// Receives the current scene after it is installed, replaced or changed
pub type SceneListener = dyn FnMut(Option<&Scene>);

/// Receives the selected node after every selection notification
pub type SelectionListener = dyn FnMut(Option<NodeKey>);

/// Receives the node whose transform was edited
pub type TransformListener = dyn FnMut(Option<NodeKey>);

/// Session operation errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// The operation needs a current scene
    #[error("No scene is loaded")]
    NoScene,

    /// The key does not name a node of the current scene
    #[error("Node {0:?} is not in the current scene")]
    UnknownNode(NodeKey),

    /// The node is not a game object
    #[error("Node {0:?} is not a game object")]
    NotAGameObject(NodeKey),

    /// The scene document is not in the asset cache
    #[error("Scene document '{0}' is not loaded")]
    SceneNotLoaded(String),

    /// Asset resolution error
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Level loading error
    #[error(transparent)]
    Level(#[from] LevelError),

    /// Scene saving error
    #[error(transparent)]
    Serialize(#[from] SerializeError),

    /// Project access error
    #[error(transparent)]
    Project(#[from] ProjectError),

    /// Scene graph error
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Result of opening a project directory
#[derive(Debug)]
pub struct ProjectOpened {
    /// Files discovered and registered
    pub scan: ScanReport,
    /// Outcome of resolving them
    pub summary: LoadSummary,
}

/// Scene, selection and assets of one editor window
pub struct EditorSession {
    config: EditorConfig,
    registry: AssetRegistry,
    assets: AssetLoader,
    blobs: BlobStore,
    project_root: Option<PathBuf>,
    scene: Option<Scene>,
    selected: Option<NodeKey>,
    generation: u64,
    scene_listeners: Subscribers<SceneListener>,
    selection_listeners: Subscribers<SelectionListener>,
    transform_listeners: Subscribers<TransformListener>,
}

impl EditorSession {
    /// Session resolving relative locators against the working directory
    pub fn new(config: EditorConfig) -> Self {
        Self::with_decoder(config, Box::new(StandardDecoder))
    }

    /// Session decoding assets with a custom decoder
    pub fn with_decoder(config: EditorConfig, decoder: Box<dyn AssetDecoder>) -> Self {
        let blobs = BlobStore::new();
        let assets = AssetLoader::new(Box::new(LocalAssetSource::new(".", blobs.clone())), decoder);
        Self {
            config,
            registry: AssetRegistry::new(),
            assets,
            blobs,
            project_root: None,
            scene: None,
            selected: None,
            generation: 0,
            scene_listeners: Subscribers::new(ListenerKind::Scene),
            selection_listeners: Subscribers::new(ListenerKind::Selection),
            transform_listeners: Subscribers::new(ListenerKind::Transform),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Asset registry
    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    /// Mutable asset registry
    pub fn registry_mut(&mut self) -> &mut AssetRegistry {
        &mut self.registry
    }

    /// Asset cache
    pub fn assets(&self) -> &AssetLoader {
        &self.assets
    }

    /// In-memory `blob:` table shared with the asset source
    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Root of the open project
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Current scene
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub(crate) fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    /// Selected node
    pub fn selected(&self) -> Option<NodeKey> {
        self.selected
    }

    /// Counter bumped on every scene replacement
    pub fn scene_generation(&self) -> u64 {
        self.generation
    }

    // Scene lifecycle

    /// Install a new scene with the default lights and a placeholder cube
    pub fn create_default_scene(&mut self) {
        let mut scene = Scene::new();
        scene.initialize_lights(&self.config.scene);

        let size = self.config.scene.placeholder_size;
        let cube = scene.add_game_object(Node::new("Cube", NodeKind::GameObject(GameObject::new(""))));
        let mesh = Node::new(
            "cube_mesh",
            NodeKind::Mesh {
                bounds: AABB::from_center_size(Vec3::zeros(), Vec3::new(size, size, size)),
            },
        );
        let mesh = scene.add_child(cube, mesh).ok();
        if let Some(object) = scene.node_mut(cube).and_then(Node::game_object_mut) {
            object.model = mesh;
        }

        self.replace_scene(Some(scene));
        self.selected = None;
        log::info!("Created default scene");
        self.notify_scene_changed();
    }

    /// Replace the current scene, carrying the selection over by node id
    ///
    /// Editor helper nodes in the incoming scene are dropped; the edit-mode
    /// controller attaches fresh ones for the new scene.
    pub fn set_scene(&mut self, mut scene: Scene) {
        let stripped = scene.remove_helpers();
        if stripped > 0 {
            log::debug!("Dropped {} stale helper node(s) from the incoming scene", stripped);
        }
        let selected_id = self
            .scene
            .as_ref()
            .zip(self.selected)
            .and_then(|(old, key)| old.node(key))
            .map(|node| node.id);
        let remapped = selected_id.and_then(|id| scene.find_by_id(id));

        self.replace_scene(Some(scene));
        self.selected = remapped;
        log::info!("Scene replaced (generation {})", self.generation);
        self.notify_scene_changed();
        self.notify_selection_changed();
    }

    /// Drop the scene and the selection
    pub fn clear_scene(&mut self) {
        self.replace_scene(None);
        self.selected = None;
        self.notify_scene_changed();
        self.notify_selection_changed();
    }

    fn replace_scene(&mut self, scene: Option<Scene>) {
        self.scene = scene;
        self.generation += 1;
    }

    // Selection

    /// Change the selection; keys outside the current scene select nothing
    pub fn set_selected(&mut self, key: Option<NodeKey>) {
        self.selected = match (key, &self.scene) {
            (Some(key), Some(scene)) if scene.contains(key) => Some(key),
            (Some(key), _) => {
                log::warn!("Cannot select {:?}: not in the current scene", key);
                None
            }
            (None, _) => None,
        };
        self.notify_selection_changed();
    }

    /// Deliver a selection notification without changing the selection
    pub fn notify_selection_changed(&mut self) {
        let selected = self.selected;
        self.selection_listeners.notify(|listener| listener(selected));
    }

    fn notify_scene_changed(&mut self) {
        let scene = self.scene.as_ref();
        self.scene_listeners.notify(|listener| listener(scene));
    }

    fn notify_transform_changed(&mut self, key: Option<NodeKey>) {
        self.transform_listeners.notify(|listener| listener(key));
    }

    // Subscriptions

    /// Listen for scene installs and structural changes
    pub fn subscribe_scene(&mut self, listener: Box<SceneListener>) -> Subscription {
        self.scene_listeners.subscribe(listener)
    }

    /// Listen for selection notifications
    pub fn subscribe_selection(&mut self, listener: Box<SelectionListener>) -> Subscription {
        self.selection_listeners.subscribe(listener)
    }

    /// Listen for transform edits
    pub fn subscribe_transform(&mut self, listener: Box<TransformListener>) -> Subscription {
        self.transform_listeners.subscribe(listener)
    }

    /// Remove a listener from whichever stream it was registered on
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        match subscription.kind {
            ListenerKind::Scene => self.scene_listeners.unsubscribe(subscription),
            ListenerKind::Selection => self.selection_listeners.unsubscribe(subscription),
            ListenerKind::Transform => self.transform_listeners.unsubscribe(subscription),
        }
    }

    /// Deliver a transform notification for the selected node
    pub fn emit_transform(&mut self) {
        let selected = self.selected;
        self.notify_transform_changed(selected);
    }

    // Objects

    /// Register a model if needed, load it and place one instance of it
    ///
    /// Returns `Ok(None)` without doing anything when no scene is loaded.
    /// The key becomes the node's model name. A key without a loadable model
    /// extension (such as a bare `"robot"`) still loads through its locator,
    /// but the saved level entry is skipped as unsupported on reload.
    pub async fn add_model_to_scene(
        &mut self,
        key: &str,
        url: &str,
        position: Option<Vec3>,
    ) -> Result<Option<NodeKey>, SessionError> {
        if self.scene.is_none() {
            log::warn!("Cannot add '{}': no scene is loaded", key);
            return Ok(None);
        }
        if !self.config.scene.is_loadable_model(key) {
            log::warn!(
                "Model key '{}' has no loadable model extension; the saved level will skip it on reload",
                key
            );
        }
        if !self.registry.contains(&AssetCategory::Models, key) {
            self.registry.add_asset(AssetCategory::Models, key, url);
        }
        self.assets.load_model(&self.registry, key).await?;

        let mut item = LevelItem::new(key, key);
        item.position = position.unwrap_or_else(Vec3::zeros).into();

        let scene = self.scene.as_mut().ok_or(SessionError::NoScene)?;
        let (node, _) = SceneLoader::new(&self.config.scene).instantiate(scene, &item, &self.assets)?;

        log::info!("Added '{}' to the scene", key);
        self.notify_scene_changed();
        self.set_selected(Some(node));
        Ok(Some(node))
    }

    /// Remove a node and its subtree; returns false if there was nothing to remove
    pub fn delete_object(&mut self, key: NodeKey) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };
        let removed = match scene.remove_node(key) {
            Ok(removed) => removed,
            Err(e) => {
                log::warn!("Cannot delete {:?}: {}", key, e);
                return false;
            }
        };

        let selection_cleared = self.selected.is_some_and(|selected| removed.contains(&selected));
        if selection_cleared {
            self.selected = None;
        }
        log::info!("Deleted {} node(s)", removed.len());
        self.notify_scene_changed();
        if selection_cleared {
            self.notify_selection_changed();
        }
        true
    }

    // Levels

    /// Replace the scene with one built from a level document
    pub async fn load_scene_from_json(&mut self, json: &str) -> Result<LoadReport, SessionError> {
        self.clear_scene();
        let (mut scene, report) = SceneLoader::new(&self.config.scene)
            .load_from_json(json, &self.registry, &mut self.assets)
            .await?;
        scene.initialize_lights(&self.config.scene);
        self.set_scene(scene);
        Ok(report)
    }

    /// Load a scene document from the `scenes` category
    pub async fn load_scene_by_key(&mut self, key: &str) -> Result<LoadReport, SessionError> {
        let document = self
            .assets
            .scene_document(key)
            .cloned()
            .ok_or_else(|| SessionError::SceneNotLoaded(key.to_string()))?;
        self.clear_scene();
        let (mut scene, report) = SceneLoader::new(&self.config.scene)
            .load_from_value(document, &self.registry, &mut self.assets)
            .await?;
        scene.initialize_lights(&self.config.scene);
        self.set_scene(scene);
        Ok(report)
    }

    /// Level JSON for the current scene
    pub fn serialize_scene(&self) -> Result<String, SessionError> {
        let scene = self.scene.as_ref().ok_or(SessionError::NoScene)?;
        Ok(SceneSerializer::new(&self.config.scene).to_json(scene)?)
    }

    /// Write the current scene as a level file
    pub fn save_scene(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let scene = self.scene.as_ref().ok_or(SessionError::NoScene)?;
        SceneSerializer::new(&self.config.scene).save_to_file(scene, path)?;
        Ok(())
    }

    // Projects

    /// Scan a project directory, register its files and resolve them
    pub async fn open_project(&mut self, dir: impl AsRef<Path>) -> Result<ProjectOpened, SessionError> {
        let scan = scan_project(dir, &self.config.assets)?;
        self.registry.clear();
        scan.register_into(&mut self.registry);
        self.assets.set_source(Box::new(LocalAssetSource::new(scan.root.clone(), self.blobs.clone())));
        self.project_root = Some(scan.root.clone());
        log::info!("Opened project {}", scan.root.display());

        let summary = self.load_all_assets().await;
        Ok(ProjectOpened { scan, summary })
    }

    /// Resolve every registered asset not yet cached
    pub async fn load_all_assets(&mut self) -> LoadSummary {
        self.assets.load_assets(&self.registry).await
    }

    // Frame loop

    /// Advance behaviors and animations, then delete nodes that asked to go
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let Some(scene) = self.scene.as_mut() else {
            return TickReport::default();
        };
        let report = scene.tick(dt);
        for key in &report.removals {
            self.delete_object(*key);
        }
        report
    }
}
