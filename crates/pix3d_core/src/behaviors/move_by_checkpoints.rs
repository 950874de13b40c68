//! Checkpoint path following
//!
//! Each tick the owner travels `speed * dt` along the path. Reaching a
//! checkpoint snaps onto it exactly and any leftover distance carries into the
//! next segment, so movement is monotonic and never passes the last checkpoint
//! of a non-looping path.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{quat_from_euler_xyz, Quat, Transform, Vec3};
use crate::level::format::Vec3Record;

fn default_speed() -> f32 {
    1.0
}

/// One waypoint of a path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Target position
    #[serde(default)]
    pub position: Vec3Record,
    /// Target Euler XYZ rotation in radians, if the path turns the owner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec3Record>,
}

/// `MoveByCheckpoints` parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveByCheckpointsConfig {
    /// Waypoints in travel order
    #[serde(default)]
    pub checkpoints: Vec<Checkpoint>,
    /// Travel speed in units per second
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Restart from the first checkpoint after the last
    #[serde(rename = "loop", default)]
    pub looping: bool,
}

impl Default for MoveByCheckpointsConfig {
    fn default() -> Self {
        Self {
            checkpoints: Vec::new(),
            speed: default_speed(),
            looping: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Segment {
    start_position: Vec3,
    start_rotation: Quat,
    length: f32,
}

/// Runtime state of a checkpoint follower
#[derive(Debug, Clone, PartialEq)]
pub struct MoveByCheckpoints {
    config: MoveByCheckpointsConfig,
    target: usize,
    segment: Option<Segment>,
    finished: bool,
}

impl MoveByCheckpoints {
    /// Start at the first checkpoint of the path
    pub fn new(config: MoveByCheckpointsConfig) -> Self {
        let finished = config.checkpoints.is_empty();
        Self {
            config,
            target: 0,
            segment: None,
            finished,
        }
    }

    /// Authored configuration
    pub fn config(&self) -> &MoveByCheckpointsConfig {
        &self.config
    }

    /// Index of the checkpoint being approached
    pub fn target_index(&self) -> usize {
        self.target
    }

    /// Whether a non-looping path has been completed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance the owner along the path
    pub fn tick(&mut self, transform: &mut Transform, dt: f32) {
        if self.finished || dt <= 0.0 || self.config.speed <= 0.0 {
            return;
        }
        let mut budget = self.config.speed * dt;
        let loop_length = if self.config.looping { self.loop_length() } else { 0.0 };
        // Full laps are skipped below, so a tick never needs more arrivals than this
        let max_arrivals = 2 * self.config.checkpoints.len() + 1;
        let mut arrivals = 0;

        while budget > 0.0 && !self.finished {
            let checkpoint = &self.config.checkpoints[self.target];
            let goal: Vec3 = checkpoint.position.into();
            let goal_rotation = checkpoint.rotation.map(|r| quat_from_euler_xyz(r.into()));

            let segment = self.segment.get_or_insert_with(|| Segment {
                start_position: transform.position,
                start_rotation: transform.rotation,
                length: (goal - transform.position).norm(),
            });

            let remaining = (goal - transform.position).norm();
            if budget >= remaining {
                transform.position = goal;
                if let Some(rotation) = goal_rotation {
                    transform.rotation = rotation;
                }
                budget -= remaining;
                arrivals += 1;
                if arrivals >= max_arrivals {
                    break;
                }
                // On a checkpoint, whole laps end where they start
                if loop_length > 0.0 && budget >= loop_length {
                    budget %= loop_length;
                }
                self.advance();
            } else {
                let direction = (goal - transform.position) / remaining;
                transform.position += direction * budget;
                if let Some(rotation) = goal_rotation {
                    let progress = if segment.length > 0.0 {
                        1.0 - (remaining - budget) / segment.length
                    } else {
                        1.0
                    };
                    transform.rotation = segment.start_rotation.slerp(&rotation, progress.clamp(0.0, 1.0));
                }
                budget = 0.0;
            }
        }
    }

    /// Distance of one lap through every checkpoint and back to the first
    fn loop_length(&self) -> f32 {
        let points: Vec<Vec3> = self.config.checkpoints.iter().map(|c| c.position.into()).collect();
        points
            .iter()
            .zip(points.iter().cycle().skip(1))
            .map(|(a, b)| (b - a).norm())
            .sum()
    }

    fn advance(&mut self) {
        self.segment = None;
        self.target += 1;
        if self.target >= self.config.checkpoints.len() {
            if self.config.looping {
                self.target = 0;
            } else {
                self.target = self.config.checkpoints.len() - 1;
                self.finished = true;
            }
        }
    }
}
