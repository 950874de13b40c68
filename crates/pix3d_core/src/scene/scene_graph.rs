//! The scene graph
//!
//! A [`Scene`] owns every node in a slot-map arena. The root is created with
//! the scene and never removed. Top-level game objects are additionally kept in
//! an ordered list that behaves as the authoritative object list for tree
//! views and serialization order.

use crate::behaviors::{BehaviorCommand, BehaviorKind, DamageOutcome, TargetInfo, TickContext};
use crate::core::config::SceneConfig;
use crate::foundation::collections::{NodeArena, NodeKey};
use crate::foundation::math::{Mat4, Vec3};

use super::animation::LoopMode;
use super::bounds::AABB;
use super::lighting::{color_from_hex, LightFactory};
use super::node::{Node, NodeId, NodeKind};
use super::SceneError;

/// One ray pick hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Node whose bounds were hit
    pub node: NodeKey,
    /// Distance along the ray to the entry point
    pub distance: f32,
}

/// What a tick produced that the owner of the scene has to act on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Nodes whose behaviors asked to be removed, in request order
    pub removals: Vec<NodeKey>,
    /// One-shot clips that finished this tick
    pub finished_animations: Vec<(NodeKey, String)>,
}

/// Root container of one editable level
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: NodeArena<Node>,
    root: NodeKey,
    objects: Vec<NodeKey>,
    /// Background color (RGB, 0.0 to 1.0 range)
    pub background: Vec3,
    lights_initialized: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Empty scene with only a root
    pub fn new() -> Self {
        let mut nodes = NodeArena::with_key();
        let root = nodes.insert(Node::new("Scene", NodeKind::Root));
        Self {
            nodes,
            root,
            objects: Vec::new(),
            background: color_from_hex(0x444444),
            lights_initialized: false,
        }
    }

    /// Root node key
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Look up a node
    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Look up a node for mutation
    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    /// Whether the key refers to a node of this scene
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of nodes including the root
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Top-level game objects in insertion order
    pub fn objects(&self) -> &[NodeKey] {
        &self.objects
    }

    /// Children of a node
    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.nodes.get(key).map_or(&[], |node| node.children.as_slice())
    }

    /// Parent of a node
    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|node| node.parent)
    }

    /// Attach a node under `parent`
    pub fn add_child(&mut self, parent: NodeKey, mut node: Node) -> Result<NodeKey, SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::UnknownNode(parent));
        }
        node.parent = Some(parent);
        node.children.clear();
        let key = self.nodes.insert(node);
        for behavior in &mut self.nodes[key].behaviors {
            behavior.rebind(key);
        }
        self.nodes[parent].children.push(key);
        Ok(key)
    }

    /// Attach a node under the root and append it to the object list
    pub fn add_game_object(&mut self, node: Node) -> NodeKey {
        let key = self.insert_under_root(node);
        self.objects.push(key);
        key
    }

    /// Attach a node under the root without listing it as a game object
    pub fn add_to_root(&mut self, node: Node) -> NodeKey {
        self.insert_under_root(node)
    }

    fn insert_under_root(&mut self, mut node: Node) -> NodeKey {
        let root = self.root;
        node.parent = Some(root);
        node.children.clear();
        let key = self.nodes.insert(node);
        for behavior in &mut self.nodes[key].behaviors {
            behavior.rebind(key);
        }
        self.nodes[root].children.push(key);
        key
    }

    /// Detach a node and drop its whole subtree. Returns the removed keys.
    pub fn remove_node(&mut self, key: NodeKey) -> Result<Vec<NodeKey>, SceneError> {
        if key == self.root {
            return Err(SceneError::RootRemoval);
        }
        if !self.nodes.contains_key(key) {
            return Err(SceneError::UnknownNode(key));
        }

        if let Some(parent) = self.nodes[key].parent {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.retain(|child| *child != key);
            }
        }
        self.objects.retain(|object| *object != key);

        let mut removed = vec![key];
        removed.extend(self.descendants(key));
        for doomed in &removed {
            self.nodes.remove(*doomed);
        }
        Ok(removed)
    }

    /// Add the default light rig once; later calls do nothing
    pub fn initialize_lights(&mut self, config: &SceneConfig) {
        if self.lights_initialized {
            return;
        }
        self.background = color_from_hex(config.background);
        for (name, light, position) in LightFactory::default_rig(config) {
            let mut node = Node::new(name, NodeKind::Light(light));
            node.transform.position = position;
            self.insert_under_root(node);
        }
        self.lights_initialized = true;
    }

    /// Whether the default lights were added
    pub fn lights_initialized(&self) -> bool {
        self.lights_initialized
    }

    /// Pre-order walk below `key`, excluding `key` itself
    pub fn descendants(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeKey> = self.children(key).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Whether `key` is `ancestor` or lies below it
    pub fn is_in_subtree(&self, key: NodeKey, ancestor: NodeKey) -> bool {
        let mut current = Some(key);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Find a node by stable id with a linear tree walk
    pub fn find_by_id(&self, id: NodeId) -> Option<NodeKey> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|key| self.nodes[*key].id == id)
    }

    /// First top-level game object with this display name
    pub fn find_object_by_name(&self, name: &str) -> Option<NodeKey> {
        self.objects
            .iter()
            .copied()
            .find(|key| self.nodes.get(*key).is_some_and(|node| node.name == name))
    }

    /// Local-to-world matrix of a node
    pub fn world_matrix(&self, key: NodeKey) -> Mat4 {
        let mut matrix = Mat4::identity();
        let mut current = Some(key);
        while let Some(node_key) = current {
            let Some(node) = self.nodes.get(node_key) else {
                break;
            };
            matrix = node.transform.to_matrix() * matrix;
            current = node.parent;
        }
        matrix
    }

    /// World position of a node's origin
    pub fn world_position(&self, key: NodeKey) -> Vec3 {
        let matrix = self.world_matrix(key);
        Vec3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)])
    }

    /// World-space bounds of the renderable geometry in a subtree
    pub fn subtree_bounds(&self, key: NodeKey) -> Option<AABB> {
        std::iter::once(key)
            .chain(self.descendants(key))
            .filter_map(|node_key| {
                let node = self.nodes.get(node_key)?;
                let local = node.render_bounds()?;
                Some(local.transformed(&self.world_matrix(node_key)))
            })
            .reduce(|a, b| a.union(&b))
    }

    /// Whether the node and all its ancestors are visible
    pub fn is_visible_in_tree(&self, key: NodeKey) -> bool {
        let mut current = Some(key);
        while let Some(node_key) = current {
            match self.nodes.get(node_key) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Whether the node or any ancestor carries the gizmo tag
    pub fn is_gizmo(&self, key: NodeKey) -> bool {
        let mut current = Some(key);
        while let Some(node_key) = current {
            match self.nodes.get(node_key) {
                Some(node) if node.gizmo => return true,
                Some(node) => current = node.parent,
                None => return false,
            }
        }
        false
    }

    /// Drop every editor helper node. Returns how many were removed.
    pub fn remove_helpers(&mut self) -> usize {
        let helpers: Vec<NodeKey> = self
            .descendants(self.root)
            .into_iter()
            .filter(|key| matches!(self.nodes[*key].kind, NodeKind::Helper(_)))
            .collect();
        let mut removed = 0;
        for key in helpers {
            if let Ok(keys) = self.remove_node(key) {
                removed += keys.len();
            }
        }
        removed
    }

    /// Ancestor of `key` that is a direct child of the root (possibly `key` itself)
    pub fn topmost_ancestor(&self, key: NodeKey) -> Option<NodeKey> {
        if key == self.root || !self.contains(key) {
            return None;
        }
        let mut current = key;
        while let Some(parent) = self.parent(current) {
            if parent == self.root {
                return Some(current);
            }
            current = parent;
        }
        None
    }

    /// Cast a world-space ray against visible pickable nodes, nearest first
    pub fn raycast(&self, origin: Vec3, direction: Vec3) -> Vec<RayHit> {
        let mut hits: Vec<RayHit> = self
            .descendants(self.root)
            .into_iter()
            .filter_map(|key| {
                let node = &self.nodes[key];
                if !node.pickable {
                    return None;
                }
                let local = node.pick_bounds()?;
                if !self.is_visible_in_tree(key) {
                    return None;
                }
                let world = local.transformed(&self.world_matrix(key));
                world
                    .intersect_ray(origin, direction)
                    .map(|distance| RayHit { node: key, distance })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Advance every active direct child of the root and its behaviors
    ///
    /// Damage and animation commands are applied here; removals are only
    /// reported so the caller can route them through its delete path.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let mut report = TickReport::default();
        let targets = self.destructable_targets();
        let ctx = TickContext { dt, targets: &targets };
        let mut commands = Vec::new();

        let children = self.nodes[self.root].children.clone();
        for key in children {
            let Some(node) = self.nodes.get_mut(key) else {
                continue;
            };
            if !node.active {
                continue;
            }
            if let NodeKind::GameObject(object) = &mut node.kind {
                if let Some(finished) = object.animator.update(dt) {
                    report.finished_animations.push((key, finished));
                }
            }
            let Node { behaviors, transform, .. } = node;
            for behavior in behaviors.iter_mut() {
                behavior.tick(transform, &ctx, &mut commands);
            }
        }

        for command in commands {
            match command {
                BehaviorCommand::Damage { target, amount } => self.apply_damage(target, amount),
                BehaviorCommand::PlayAnimation { node, clip } => {
                    self.play_animation(node, &clip, LoopMode::Once);
                }
                BehaviorCommand::Remove { node } => {
                    if !report.removals.contains(&node) {
                        report.removals.push(node);
                    }
                }
            }
        }
        report
    }

    /// Start a clip on a game object. Returns false if the node or clip is missing.
    pub fn play_animation(&mut self, key: NodeKey, clip: &str, mode: LoopMode) -> bool {
        self.nodes
            .get_mut(key)
            .and_then(Node::game_object_mut)
            .is_some_and(|object| object.animator.play(clip, mode))
    }

    fn apply_damage(&mut self, target: NodeKey, amount: f32) {
        let Some(node) = self.nodes.get_mut(target) else {
            return;
        };
        let mut death_clip = None;
        for behavior in &mut node.behaviors {
            if let Some(destructable) = behavior.as_destructable_mut() {
                if destructable.apply_damage(amount) == DamageOutcome::Killed {
                    log::info!("'{}' was destroyed", node.name);
                    death_clip = destructable.death_animation().map(str::to_string);
                }
            }
        }
        if let Some(clip) = death_clip {
            self.play_animation(target, &clip, LoopMode::Once);
        }
    }

    fn destructable_targets(&self) -> Vec<TargetInfo> {
        self.children(self.root)
            .iter()
            .filter_map(|key| {
                let node = self.nodes.get(*key)?;
                let mut destructables = node
                    .behaviors
                    .iter()
                    .filter_map(|behavior| match behavior.kind() {
                        BehaviorKind::Destructable(d) => Some(d),
                        _ => None,
                    })
                    .peekable();
                destructables.peek()?;
                let alive = destructables.all(|d| d.is_alive());
                Some(TargetInfo {
                    node: *key,
                    position: self.world_position(*key),
                    alive,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::{Behavior, BehaviorConfig, DestructableConfig, MeleeAttackerConfig};
    use crate::foundation::math::Transform;
    use crate::scene::{AnimationClip, Animator, Axis, GameObject, HelperKind};
    use approx::assert_relative_eq;

    fn cube(name: &str, position: Vec3) -> Node {
        Node::new(name, NodeKind::Mesh { bounds: AABB::unit() })
            .with_transform(Transform::from_position(position))
    }

    #[test]
    fn test_remove_subtree_and_object_list() {
        let mut scene = Scene::new();
        let parent = scene.add_game_object(cube("parent", Vec3::zeros()));
        let child = scene.add_child(parent, cube("child", Vec3::zeros())).unwrap();
        let grandchild = scene.add_child(child, cube("grandchild", Vec3::zeros())).unwrap();

        let removed = scene.remove_node(parent).unwrap();
        assert_eq!(removed, vec![parent, child, grandchild]);
        assert!(scene.objects().is_empty());
        assert_eq!(scene.node_count(), 1);
        assert!(scene.children(scene.root()).is_empty());
    }

    #[test]
    fn test_root_cannot_be_removed() {
        let mut scene = Scene::new();
        let root = scene.root();
        assert!(matches!(scene.remove_node(root), Err(SceneError::RootRemoval)));
    }

    #[test]
    fn test_lights_initialize_once() {
        let mut scene = Scene::new();
        let config = SceneConfig::default();
        scene.initialize_lights(&config);
        scene.initialize_lights(&config);
        assert_eq!(scene.node_count(), 4);
        assert!(scene.objects().is_empty());
    }

    #[test]
    fn test_world_matrix_composes_parents() {
        let mut scene = Scene::new();
        let parent = scene.add_game_object(cube("parent", Vec3::new(1.0, 0.0, 0.0)));
        let child = scene.add_child(parent, cube("child", Vec3::new(0.0, 2.0, 0.0))).unwrap();
        assert_relative_eq!(scene.world_position(child), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_raycast_orders_hits_and_skips_hidden() {
        let mut scene = Scene::new();
        let far = scene.add_game_object(cube("far", Vec3::new(0.0, 0.0, -10.0)));
        let near = scene.add_game_object(cube("near", Vec3::new(0.0, 0.0, -5.0)));
        let hidden = scene.add_game_object(cube("hidden", Vec3::new(0.0, 0.0, -2.0)));
        scene.node_mut(hidden).unwrap().visible = false;

        let hits = scene.raycast(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));
        let keys: Vec<_> = hits.iter().map(|hit| hit.node).collect();
        assert_eq!(keys, vec![near, far]);
        assert_relative_eq!(hits[0].distance, 4.5, epsilon = 1e-5);
    }

    #[test]
    fn test_topmost_ancestor_and_gizmo_tag() {
        let mut scene = Scene::new();
        let object = scene.add_game_object(cube("object", Vec3::zeros()));
        let child = scene.add_child(object, cube("child", Vec3::zeros())).unwrap();
        assert_eq!(scene.topmost_ancestor(child), Some(object));
        assert_eq!(scene.topmost_ancestor(scene.root()), None);

        scene.node_mut(object).unwrap().gizmo = true;
        assert!(scene.is_gizmo(child));
    }

    #[test]
    fn test_remove_helpers_keeps_scene_content() {
        let mut scene = Scene::new();
        let object = scene.add_game_object(cube("object", Vec3::zeros()));
        scene.insert_under_root(Node::new("gizmo_x", NodeKind::Helper(HelperKind::GizmoHandle(Axis::X))));
        scene.insert_under_root(Node::new("selection_box", NodeKind::Helper(HelperKind::SelectionBox(AABB::unit()))));
        let count = scene.node_count();

        assert_eq!(scene.remove_helpers(), 2);
        assert_eq!(scene.node_count(), count - 2);
        assert!(scene.contains(object));
        assert_eq!(scene.remove_helpers(), 0);
    }

    #[test]
    fn test_find_by_id_and_name() {
        let mut scene = Scene::new();
        let node = cube("robot", Vec3::zeros());
        let id = node.id;
        let key = scene.add_game_object(node);
        assert_eq!(scene.find_by_id(id), Some(key));
        assert_eq!(scene.find_object_by_name("robot"), Some(key));
        assert_eq!(scene.find_by_id(NodeId::new()), None);
    }

    #[test]
    fn test_inactive_node_skips_update_and_behaviors() {
        let mut scene = Scene::new();
        let mut object = GameObject::new("a.glb");
        object.animator = Animator::new(vec![AnimationClip::new("Wave", 0.5)]);
        object.animator.play("Wave", LoopMode::Once);
        let key = scene.add_game_object(Node::new("a", NodeKind::GameObject(object)));
        scene.node_mut(key).unwrap().active = false;

        let report = scene.tick(1.0);
        assert!(report.finished_animations.is_empty());

        scene.node_mut(key).unwrap().active = true;
        let report = scene.tick(1.0);
        assert_eq!(report.finished_animations, vec![(key, "Wave".to_string())]);
    }

    #[test]
    fn test_melee_kills_destructable_and_requests_removal() {
        let mut scene = Scene::new();
        let attacker = scene.add_game_object(Node::new("orc", NodeKind::GameObject(GameObject::new("orc.glb"))));
        let victim = scene.add_game_object(
            Node::new("crate", NodeKind::GameObject(GameObject::new("crate.glb")))
                .with_transform(Transform::from_position(Vec3::new(1.0, 0.0, 0.0))),
        );
        let melee = Behavior::new(
            attacker,
            BehaviorConfig::MeleeAttacker(MeleeAttackerConfig { damage: 50.0, ..Default::default() }),
        );
        scene.node_mut(attacker).unwrap().behaviors.push(melee);
        let health = Behavior::new(
            victim,
            BehaviorConfig::Destructable(DestructableConfig { health: 50.0, ..Default::default() }),
        );
        scene.node_mut(victim).unwrap().behaviors.push(health);

        assert!(scene.tick(0.1).removals.is_empty());
        assert_eq!(scene.tick(0.1).removals, vec![victim]);
        assert!(scene.tick(0.1).removals.is_empty());
    }
}
