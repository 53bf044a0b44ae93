//! Timed enemy spawning over a rectangular area.

use bevy::log::info;
use bevy::math::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::{EventBus, SpawningStarted, SpawningStopped};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Centre of the spawn area
    pub origin: (f32, f32, f32),
    /// Half-size of the spawn area along x and z
    pub extent: (f32, f32),
    pub max_spawn: u32,
    /// Seconds between two spawns
    pub interval: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            origin: (0.0, 0.0, 0.0),
            extent: (8.0, 8.0),
            max_spawn: 10,
            interval: 3.0,
        }
    }
}

/// Hands out `max_spawn` spawn positions, one per interval.
///
/// Announces [`SpawningStarted`] when started and [`SpawningStopped`] right
/// after the last position was handed out.
pub struct Spawner {
    config: SpawnerConfig,
    spawned: u32,
    elapsed: f32,
    spawning: bool,
    bus: EventBus,
}

impl Spawner {
    pub fn new(config: SpawnerConfig, bus: EventBus) -> Self {
        Self {
            config,
            spawned: 0,
            elapsed: 0.0,
            spawning: false,
            bus,
        }
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    pub fn is_spawning(&self) -> bool {
        self.spawning
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    /// Begin a run. Does nothing while a run is in progress.
    pub fn start(&mut self) {
        if self.spawning {
            return;
        }

        self.spawning = true;
        self.spawned = 0;
        self.elapsed = 0.0;
        self.bus.publish(SpawningStarted);

        if self.config.max_spawn == 0 {
            self.finish();
        }
    }

    /// Advance the timer and call `spawn` for every spawn that came due.
    pub fn tick<R, F>(&mut self, dt: f32, rng: &mut R, mut spawn: F)
    where
        R: Rng + ?Sized,
        F: FnMut(Vec3, &mut R),
    {
        if !self.spawning {
            return;
        }

        self.elapsed += dt;
        while self.spawning && self.elapsed >= self.config.interval {
            self.elapsed -= self.config.interval;

            let position = self.random_position(rng);
            spawn(position, rng);
            self.spawned += 1;

            if self.spawned >= self.config.max_spawn {
                self.finish();
            }
        }
    }

    fn finish(&mut self) {
        self.spawning = false;
        info!("Spawner finished after {} enemies", self.spawned);
        self.bus.publish(SpawningStopped);
    }

    fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let (x, y, z) = self.config.origin;
        let (half_x, half_z) = (self.config.extent.0.abs(), self.config.extent.1.abs());
        Vec3::new(
            x + rng.gen_range(-half_x..=half_x),
            y,
            z + rng.gen_range(-half_z..=half_z),
        )
    }
}
