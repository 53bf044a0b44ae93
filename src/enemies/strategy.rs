//! Pluggable movement for enemies.
//!
//! A strategy turns the agent's current pose and a reference point (usually
//! the player) into the next pose. Agents can swap strategies at any time;
//! the new one takes over on the next update.

use bevy::math::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// The direction an unrotated agent faces.
pub const FORWARD: Vec3 = Vec3::NEG_Z;

/// Position and facing of an agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Which built-in strategy an agent uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    DirectChase,
    RandomWander,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 2] = [StrategyKind::DirectChase, StrategyKind::RandomWander];

    /// Uniformly random pick among all strategies.
    pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

pub trait MovementStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Advance `pose` by `dt` seconds relative to `target`.
    fn next_pose(&mut self, pose: Pose, target: Vec3, dt: f32) -> Pose;
}

/// Move towards `goal` without passing it and turn to face the travel direction.
fn steer(pose: Pose, goal: Vec3, speed: f32, turn_speed: f32, dt: f32) -> Pose {
    let offset = goal - pose.position;
    let direction = offset.normalize_or_zero();
    if direction == Vec3::ZERO {
        return pose;
    }

    let step = (speed * dt).min(offset.length());
    let facing = Quat::from_rotation_arc(FORWARD, direction);

    Pose {
        position: pose.position + direction * step,
        rotation: pose.rotation.slerp(facing, (turn_speed * dt).clamp(0.0, 1.0)),
    }
}

/// Head straight for the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectChase {
    pub speed: f32,
    pub turn_speed: f32,
}

impl Default for DirectChase {
    fn default() -> Self {
        Self {
            speed: 3.0,
            turn_speed: 10.0,
        }
    }
}

impl MovementStrategy for DirectChase {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DirectChase
    }

    fn next_pose(&mut self, pose: Pose, target: Vec3, dt: f32) -> Pose {
        steer(pose, target, self.speed, self.turn_speed, dt)
    }
}

/// Tunables for [`RandomWander`], as stored in config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderTuning {
    pub speed: f32,
    pub turn_speed: f32,
    /// How close the agent gets before it picks a new wander point
    pub min_distance: f32,
    /// Wander points are picked within this distance of the target
    pub radius: f32,
}

impl Default for WanderTuning {
    fn default() -> Self {
        Self {
            speed: 2.0,
            turn_speed: 10.0,
            min_distance: 1.0,
            radius: 5.0,
        }
    }
}

/// Roam between random points around the target.
#[derive(Debug, Clone)]
pub struct RandomWander {
    pub tuning: WanderTuning,
    wander_target: Option<Vec3>,
    rng: StdRng,
}

impl RandomWander {
    pub fn new(tuning: WanderTuning) -> Self {
        Self::with_rng(tuning, StdRng::from_entropy())
    }

    pub fn with_seed(tuning: WanderTuning, seed: u64) -> Self {
        Self::with_rng(tuning, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(tuning: WanderTuning, rng: StdRng) -> Self {
        Self {
            tuning,
            wander_target: None,
            rng,
        }
    }

    /// The point currently being walked to, once one has been picked.
    pub fn wander_target(&self) -> Option<Vec3> {
        self.wander_target
    }

    /// A point inside the sphere of `radius` around `reference`, moved to
    /// `elevation`. Its ground distance to `reference` never exceeds the radius.
    fn pick_point(&mut self, reference: Vec3, elevation: f32) -> Vec3 {
        let offset = loop {
            let candidate = Vec3::new(
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
            );
            if candidate.length_squared() <= 1.0 {
                break candidate * self.tuning.radius;
            }
        };

        let mut point = reference + offset;
        point.y = elevation;
        point
    }
}

impl MovementStrategy for RandomWander {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RandomWander
    }

    fn next_pose(&mut self, pose: Pose, target: Vec3, dt: f32) -> Pose {
        let goal = match self.wander_target {
            Some(point) if pose.position.distance(point) >= self.tuning.min_distance => point,
            _ => {
                let point = self.pick_point(target, pose.position.y);
                self.wander_target = Some(point);
                point
            }
        };

        steer(pose, goal, self.tuning.speed, self.tuning.turn_speed, dt)
    }
}
