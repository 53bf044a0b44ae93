//! Enemy tunables, as loaded from the arena config.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::strategy::{DirectChase, MovementStrategy, RandomWander, StrategyKind, WanderTuning};
use crate::economy::SoulstonePickup;

/// Settings for every movement strategy an enemy may be given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyTuning {
    pub chase: DirectChase,
    pub wander: WanderTuning,
}

impl StrategyTuning {
    /// Build a strategy of the given kind. Wanderers get their own RNG seeded
    /// from `rng`, so a seeded caller gets reproducible wandering.
    pub fn build<R: Rng + ?Sized>(&self, kind: StrategyKind, rng: &mut R) -> Box<dyn MovementStrategy> {
        match kind {
            StrategyKind::DirectChase => Box::new(self.chase),
            StrategyKind::RandomWander => Box::new(RandomWander::with_rng(
                self.wander,
                StdRng::seed_from_u64(rng.gen()),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub max_health: i32,
    /// Upper bound, in seconds, of the nap an enemy takes after spawning
    pub max_sleep: f32,
    /// Dropped where the enemy dies
    pub drop: Option<SoulstonePickup>,
    pub strategies: StrategyTuning,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            max_health: 100,
            max_sleep: 5.0,
            drop: None,
            strategies: StrategyTuning::default(),
        }
    }
}
