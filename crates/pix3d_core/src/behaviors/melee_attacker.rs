//! Proximity melee attacks against destructables

use serde::{Deserialize, Serialize};

use crate::foundation::collections::NodeKey;
use crate::foundation::math::Transform;

use super::{BehaviorCommand, TargetInfo, TickContext};

fn default_radius() -> f32 {
    1.5
}

fn default_damage() -> f32 {
    10.0
}

fn default_cooldown() -> f32 {
    1.0
}

/// `MeleeAttacker` parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeleeAttackerConfig {
    /// Reach in world units
    #[serde(default = "default_radius")]
    pub attack_radius: f32,
    /// Damage per hit
    #[serde(default = "default_damage")]
    pub damage: f32,
    /// Seconds between hits
    #[serde(default = "default_cooldown")]
    pub cooldown: f32,
    /// One-shot clip played on each hit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_animation: Option<String>,
}

impl Default for MeleeAttackerConfig {
    fn default() -> Self {
        Self {
            attack_radius: default_radius(),
            damage: default_damage(),
            cooldown: default_cooldown(),
            attack_animation: None,
        }
    }
}

/// Runtime state of a melee attacker
#[derive(Debug, Clone, PartialEq)]
pub struct MeleeAttacker {
    config: MeleeAttackerConfig,
    cooldown_left: f32,
}

impl MeleeAttacker {
    /// Ready to attack immediately
    pub fn new(config: MeleeAttackerConfig) -> Self {
        Self {
            config,
            cooldown_left: 0.0,
        }
    }

    /// Authored configuration
    pub fn config(&self) -> &MeleeAttackerConfig {
        &self.config
    }

    /// Seconds until the next attack is allowed
    pub fn cooldown_left(&self) -> f32 {
        self.cooldown_left
    }

    /// Attack the nearest living target within reach when off cooldown
    pub fn tick(
        &mut self,
        owner: NodeKey,
        transform: &Transform,
        ctx: &TickContext<'_>,
        commands: &mut Vec<BehaviorCommand>,
    ) {
        self.cooldown_left = (self.cooldown_left - ctx.dt).max(0.0);
        if self.cooldown_left > 0.0 {
            return;
        }
        // A dead attacker stays dead
        if ctx.targets.iter().any(|t| t.node == owner && !t.alive) {
            return;
        }
        let Some(target) = self.nearest_target(owner, transform, ctx.targets) else {
            return;
        };

        commands.push(BehaviorCommand::Damage {
            target: target.node,
            amount: self.config.damage,
        });
        if let Some(clip) = &self.config.attack_animation {
            commands.push(BehaviorCommand::PlayAnimation {
                node: owner,
                clip: clip.clone(),
            });
        }
        self.cooldown_left = self.config.cooldown;
    }

    fn nearest_target<'t>(
        &self,
        owner: NodeKey,
        transform: &Transform,
        targets: &'t [TargetInfo],
    ) -> Option<&'t TargetInfo> {
        targets
            .iter()
            .filter(|t| t.node != owner && t.alive)
            .map(|t| (t, (t.position - transform.position).norm()))
            .filter(|(_, distance)| *distance <= self.config.attack_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(t, _)| t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use slotmap::SlotMap;

    fn keys(count: usize) -> Vec<NodeKey> {
        let mut map: SlotMap<NodeKey, ()> = SlotMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    fn target(node: NodeKey, x: f32, alive: bool) -> TargetInfo {
        TargetInfo {
            node,
            position: Vec3::new(x, 0.0, 0.0),
            alive,
        }
    }

    #[test]
    fn test_hits_nearest_living_target_then_waits() {
        let k = keys(4);
        let targets = [target(k[1], 1.2, true), target(k[2], 0.8, false), target(k[3], 1.0, true)];
        let mut attacker = MeleeAttacker::new(MeleeAttackerConfig {
            attack_animation: Some("Punch".to_string()),
            ..Default::default()
        });
        let transform = Transform::identity();
        let mut commands = Vec::new();

        attacker.tick(k[0], &transform, &TickContext { dt: 0.1, targets: &targets }, &mut commands);
        assert_eq!(
            commands,
            vec![
                BehaviorCommand::Damage { target: k[3], amount: 10.0 },
                BehaviorCommand::PlayAnimation { node: k[0], clip: "Punch".to_string() },
            ]
        );

        commands.clear();
        attacker.tick(k[0], &transform, &TickContext { dt: 0.5, targets: &targets }, &mut commands);
        assert!(commands.is_empty());

        attacker.tick(k[0], &transform, &TickContext { dt: 0.5, targets: &targets }, &mut commands);
        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn test_ignores_self_and_out_of_range() {
        let k = keys(2);
        let targets = [target(k[0], 0.0, true), target(k[1], 3.0, true)];
        let mut attacker = MeleeAttacker::new(MeleeAttackerConfig::default());
        let mut commands = Vec::new();
        attacker.tick(k[0], &Transform::identity(), &TickContext { dt: 0.1, targets: &targets }, &mut commands);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_dead_attacker_does_not_attack() {
        let k = keys(2);
        let targets = [target(k[0], 0.0, false), target(k[1], 0.5, true)];
        let mut attacker = MeleeAttacker::new(MeleeAttackerConfig::default());
        let mut commands = Vec::new();
        attacker.tick(k[0], &Transform::identity(), &TickContext { dt: 0.1, targets: &targets }, &mut commands);
        assert!(commands.is_empty());
    }
}
