//! Per-node behavior scripts
//!
//! Behaviors are a closed set of variants, each with its own configuration
//! record and tick. A behavior never touches other nodes directly: it may edit
//! its owner's transform and otherwise emits [`BehaviorCommand`]s that the
//! scene applies after every behavior has ticked.

pub mod destructable;
pub mod melee_attacker;
pub mod move_by_checkpoints;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::foundation::collections::NodeKey;
use crate::foundation::math::{Transform, Vec3};

pub use destructable::{DamageOutcome, Destructable, DestructableConfig};
pub use melee_attacker::{MeleeAttacker, MeleeAttackerConfig};
pub use move_by_checkpoints::{Checkpoint, MoveByCheckpoints, MoveByCheckpointsConfig};

/// Behavior construction errors
#[derive(Error, Debug)]
pub enum BehaviorError {
    /// The configuration has no string `type` field
    #[error("Behavior configuration has no type tag")]
    MissingType,

    /// The `type` tag names no known behavior
    #[error("Unknown behavior type '{0}'")]
    UnknownType(String),

    /// The configuration does not match the behavior's parameters
    #[error("Invalid {type_name} configuration: {source}")]
    Invalid {
        /// Behavior type tag
        type_name: String,
        /// Decode error
        #[source]
        source: serde_json::Error,
    },
}

/// Behavior configuration as stored in level files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BehaviorConfig {
    /// Follow a checkpoint path
    MoveByCheckpoints(MoveByCheckpointsConfig),
    /// Take damage and get removed when health runs out
    Destructable(DestructableConfig),
    /// Damage nearby destructables
    MeleeAttacker(MeleeAttackerConfig),
}

impl BehaviorConfig {
    /// Names accepted in the `type` tag
    pub const TYPE_NAMES: [&'static str; 3] = ["MoveByCheckpoints", "Destructable", "MeleeAttacker"];

    /// Decode a tagged configuration object
    pub fn from_value(value: &Value) -> Result<Self, BehaviorError> {
        let type_name = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(BehaviorError::MissingType)?;
        if !Self::TYPE_NAMES.contains(&type_name) {
            return Err(BehaviorError::UnknownType(type_name.to_string()));
        }
        serde_json::from_value(value.clone()).map_err(|source| BehaviorError::Invalid {
            type_name: type_name.to_string(),
            source,
        })
    }

    /// Encode as a tagged configuration object
    pub fn to_value(&self) -> Value {
        // Plain structs of numbers, strings and vectors always encode
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Request emitted by a behavior for the scene to carry out
#[derive(Debug, Clone, PartialEq)]
pub enum BehaviorCommand {
    /// Apply damage to the destructables of a node
    Damage {
        /// Node to damage
        target: NodeKey,
        /// Health to remove
        amount: f32,
    },
    /// Start a one-shot clip on a game object
    PlayAnimation {
        /// Game object node
        node: NodeKey,
        /// Clip name
        clip: String,
    },
    /// Remove a node through the session's delete path
    Remove {
        /// Node to remove
        node: NodeKey,
    },
}

/// A node carrying a destructable, as seen at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    /// Node key
    pub node: NodeKey,
    /// World position
    pub position: Vec3,
    /// Whether every destructable on it still has health
    pub alive: bool,
}

/// Read-only context handed to every behavior tick
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Elapsed time in seconds
    pub dt: f32,
    /// Destructable nodes in the scene
    pub targets: &'a [TargetInfo],
}

/// Runtime state of a behavior variant
#[derive(Debug, Clone, PartialEq)]
pub enum BehaviorKind {
    /// Checkpoint follower
    MoveByCheckpoints(MoveByCheckpoints),
    /// Health and delayed removal
    Destructable(Destructable),
    /// Proximity attacker
    MeleeAttacker(MeleeAttacker),
}

/// A behavior attached to one node
#[derive(Debug, Clone, PartialEq)]
pub struct Behavior {
    owner: NodeKey,
    kind: BehaviorKind,
}

impl Behavior {
    /// Attach fresh runtime state for a configuration
    pub fn new(owner: NodeKey, config: BehaviorConfig) -> Self {
        let kind = match config {
            BehaviorConfig::MoveByCheckpoints(c) => BehaviorKind::MoveByCheckpoints(MoveByCheckpoints::new(c)),
            BehaviorConfig::Destructable(c) => BehaviorKind::Destructable(Destructable::new(c)),
            BehaviorConfig::MeleeAttacker(c) => BehaviorKind::MeleeAttacker(MeleeAttacker::new(c)),
        };
        Self { owner, kind }
    }

    /// Build from a tagged configuration object
    pub fn from_config(owner: NodeKey, value: &Value) -> Result<Self, BehaviorError> {
        BehaviorConfig::from_value(value).map(|config| Self::new(owner, config))
    }

    /// Node this behavior is attached to
    pub fn owner(&self) -> NodeKey {
        self.owner
    }

    /// Runtime state
    pub fn kind(&self) -> &BehaviorKind {
        &self.kind
    }

    /// Mutable runtime state
    pub fn kind_mut(&mut self) -> &mut BehaviorKind {
        &mut self.kind
    }

    /// `type` tag of this behavior
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            BehaviorKind::MoveByCheckpoints(_) => "MoveByCheckpoints",
            BehaviorKind::Destructable(_) => "Destructable",
            BehaviorKind::MeleeAttacker(_) => "MeleeAttacker",
        }
    }

    /// Authored configuration, without runtime state
    pub fn config(&self) -> BehaviorConfig {
        match &self.kind {
            BehaviorKind::MoveByCheckpoints(b) => BehaviorConfig::MoveByCheckpoints(b.config().clone()),
            BehaviorKind::Destructable(b) => BehaviorConfig::Destructable(b.config().clone()),
            BehaviorKind::MeleeAttacker(b) => BehaviorConfig::MeleeAttacker(b.config().clone()),
        }
    }

    /// Authored configuration as a tagged JSON object
    pub fn to_config_value(&self) -> Value {
        self.config().to_value()
    }

    /// Destructable state, if this is one
    pub fn as_destructable_mut(&mut self) -> Option<&mut Destructable> {
        match &mut self.kind {
            BehaviorKind::Destructable(d) => Some(d),
            _ => None,
        }
    }

    pub(crate) fn rebind(&mut self, owner: NodeKey) {
        self.owner = owner;
    }

    /// Advance one frame
    pub fn tick(&mut self, transform: &mut Transform, ctx: &TickContext<'_>, commands: &mut Vec<BehaviorCommand>) {
        match &mut self.kind {
            BehaviorKind::MoveByCheckpoints(b) => b.tick(transform, ctx.dt),
            BehaviorKind::Destructable(b) => {
                if b.tick(ctx.dt) {
                    commands.push(BehaviorCommand::Remove { node: self.owner });
                }
            }
            BehaviorKind::MeleeAttacker(b) => b.tick(self.owner, transform, ctx, commands),
        }
    }
}
