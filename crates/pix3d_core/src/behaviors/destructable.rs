//! Health with delayed removal

use serde::{Deserialize, Serialize};

fn default_health() -> f32 {
    100.0
}

/// `Destructable` parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestructableConfig {
    /// Starting health
    #[serde(default = "default_health")]
    pub health: f32,
    /// Seconds between death and removal
    #[serde(default)]
    pub destroy_delay: f32,
    /// One-shot clip played on death
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_animation: Option<String>,
}

impl Default for DestructableConfig {
    fn default() -> Self {
        Self {
            health: default_health(),
            destroy_delay: 0.0,
            death_animation: None,
        }
    }
}

/// Result of applying damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Already dead, nothing changed
    Ignored,
    /// Health reduced, still alive
    Hurt,
    /// This hit brought health to zero
    Killed,
}

/// Runtime state of a destructable
#[derive(Debug, Clone, PartialEq)]
pub struct Destructable {
    config: DestructableConfig,
    health: f32,
    countdown: Option<f32>,
    removal_requested: bool,
}

impl Destructable {
    /// Full health
    pub fn new(config: DestructableConfig) -> Self {
        Self {
            health: config.health,
            config,
            countdown: None,
            removal_requested: false,
        }
    }

    /// Authored configuration
    pub fn config(&self) -> &DestructableConfig {
        &self.config
    }

    /// Remaining health
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Whether health is above zero
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Clip to play on death
    pub fn death_animation(&self) -> Option<&str> {
        self.config.death_animation.as_deref()
    }

    /// Remove health; death starts the removal countdown
    pub fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome::Ignored;
        }
        self.health = (self.health - amount.max(0.0)).max(0.0);
        if self.is_alive() {
            DamageOutcome::Hurt
        } else {
            log::debug!("Destructable died, removal in {}s", self.config.destroy_delay);
            self.countdown = Some(self.config.destroy_delay);
            DamageOutcome::Killed
        }
    }

    /// Run the removal countdown. Returns true exactly once, when removal is due.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.removal_requested {
            return false;
        }
        let Some(remaining) = self.countdown.as_mut() else {
            return false;
        };
        *remaining -= dt;
        if *remaining <= 0.0 {
            self.removal_requested = true;
            true
        } else {
            false
        }
    }
}
