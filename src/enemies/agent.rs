//! Per-enemy behavior: a nap after spawning, then movement by strategy, and
//! health that reacts to hits.

use bevy::log::debug;
use bevy::math::Vec3;
use rand::Rng;

use super::data::EnemyTuning;
use super::strategy::{DirectChase, MovementStrategy, Pose, StrategyKind};
use crate::combat::DealsDamage;

/// Height at which a destroyed enemy's loot appears.
pub const DROP_ELEVATION: f32 = 1.0;

/// Below this share of max health an enemy stops wandering and chases.
pub const ENRAGE_RATIO: f32 = 0.5;

/// What a hit did to an enemy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    Wounded { health_ratio: f32 },
    /// Health fell to the enrage threshold; the enemy now chases directly.
    Enraged { health_ratio: f32 },
    /// Health ran out. Loot, if any, goes at `drop_at`.
    Destroyed { drop_at: Vec3 },
    /// The enemy was already destroyed.
    Ignored,
}

pub struct EnemyAgent {
    pub pose: Pose,
    health: i32,
    max_health: i32,
    sleep_remaining: f32,
    strategy: Box<dyn MovementStrategy>,
    chase: DirectChase,
}

impl EnemyAgent {
    /// A fresh enemy with a random strategy and a random nap of 1 to
    /// `max_sleep` seconds.
    pub fn spawn<R: Rng + ?Sized>(position: Vec3, tuning: &EnemyTuning, rng: &mut R) -> Self {
        let kind = StrategyKind::pick(rng);
        let strategy = tuning.strategies.build(kind, rng);
        let sleep = rng.gen_range(1.0..=tuning.max_sleep.max(1.0));

        Self::new(position, tuning, strategy, sleep)
    }

    pub fn new(
        position: Vec3,
        tuning: &EnemyTuning,
        strategy: Box<dyn MovementStrategy>,
        sleep: f32,
    ) -> Self {
        Self {
            pose: Pose::at(position),
            health: tuning.max_health,
            max_health: tuning.max_health.max(1),
            sleep_remaining: sleep,
            strategy,
            chase: tuning.strategies.chase,
        }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn health_ratio(&self) -> f32 {
        self.health as f32 / self.max_health as f32
    }

    pub fn is_asleep(&self) -> bool {
        self.sleep_remaining > 0.0
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    /// Replace the movement strategy. It takes over on the next tick.
    pub fn set_strategy(&mut self, strategy: Box<dyn MovementStrategy>) {
        debug!("Enemy strategy {:?} -> {:?}", self.strategy.kind(), strategy.kind());
        self.strategy = strategy;
    }

    /// Sleep off `dt`, or move relative to `target` once awake.
    pub fn tick(&mut self, target: Vec3, dt: f32) -> Pose {
        if self.is_destroyed() {
            return self.pose;
        }

        if self.is_asleep() {
            self.sleep_remaining -= dt;
            return self.pose;
        }

        self.pose = self.strategy.next_pose(self.pose, target, dt);
        self.pose
    }

    pub fn take_hit(&mut self, source: &dyn DealsDamage) -> HitOutcome {
        if self.is_destroyed() {
            return HitOutcome::Ignored;
        }

        self.health -= source.damage();
        if self.is_destroyed() {
            let mut drop_at = self.pose.position;
            drop_at.y = DROP_ELEVATION;
            return HitOutcome::Destroyed { drop_at };
        }

        let health_ratio = self.health_ratio();
        if health_ratio <= ENRAGE_RATIO && self.strategy.kind() != StrategyKind::DirectChase {
            self.set_strategy(Box::new(self.chase));
            return HitOutcome::Enraged { health_ratio };
        }

        HitOutcome::Wounded { health_ratio }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::combat::Projectile;
    use crate::enemies::{RandomWander, WanderTuning};

    fn wanderer(sleep: f32) -> EnemyAgent {
        let tuning = EnemyTuning::default();
        let strategy = Box::new(RandomWander::with_seed(WanderTuning::default(), 9));
        EnemyAgent::new(Vec3::new(2.0, 0.0, 3.0), &tuning, strategy, sleep)
    }

    #[test]
    fn sleeping_enemy_does_not_move() {
        let mut agent = wanderer(1.0);

        let pose = agent.tick(Vec3::ZERO, 0.5);
        assert_eq!(pose.position, Vec3::new(2.0, 0.0, 3.0));
        assert!(agent.is_asleep());

        agent.tick(Vec3::ZERO, 0.6);
        assert!(!agent.is_asleep());
        let moved = agent.tick(Vec3::ZERO, 0.1);
        assert_ne!(moved.position, Vec3::new(2.0, 0.0, 3.0));
    }

    #[test]
    fn half_health_switches_to_chase() {
        let mut agent = wanderer(0.0);

        assert_eq!(
            agent.take_hit(&Projectile::new(10)),
            HitOutcome::Wounded { health_ratio: 0.9 }
        );
        assert_eq!(
            agent.take_hit(&Projectile::new(40)),
            HitOutcome::Enraged { health_ratio: 0.5 }
        );
        assert_eq!(agent.strategy_kind(), StrategyKind::DirectChase);
        assert_eq!(
            agent.take_hit(&Projectile::new(10)),
            HitOutcome::Wounded { health_ratio: 0.4 }
        );
    }

    #[test]
    fn destroyed_enemy_drops_at_fixed_height_and_ignores_more_hits() {
        let mut agent = wanderer(0.0);

        let outcome = agent.take_hit(&Projectile::new(150));
        assert_eq!(
            outcome,
            HitOutcome::Destroyed {
                drop_at: Vec3::new(2.0, DROP_ELEVATION, 3.0)
            }
        );
        assert_eq!(agent.take_hit(&Projectile::new(10)), HitOutcome::Ignored);
        assert_eq!(agent.health(), -50);
    }

    #[test]
    fn spawned_sleep_is_within_configured_range() {
        let tuning = EnemyTuning::default();
        let mut rng = StdRng::seed_from_u64(21);

        for _ in 0..50 {
            let agent = EnemyAgent::spawn(Vec3::ZERO, &tuning, &mut rng);
            assert!((1.0..=tuning.max_sleep).contains(&agent.sleep_remaining));
            assert_eq!(agent.health(), tuning.max_health);
        }
    }
}
