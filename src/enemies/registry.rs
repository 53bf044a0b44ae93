//! Bookkeeping of live enemies and of the wave they belong to.
//!
//! The registry listens for spawner start/stop announcements on the bus. A
//! wave ends once every spawner that started has stopped and the last live
//! enemy is gone; that moment is announced exactly once with [`WaveCleared`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bevy::log::{debug, info, warn};

use crate::core::{EventBus, Handler, SpawningStarted, SpawningStopped};

/// Handle identifying one enemy for its whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u64);

/// Published just before an enemy joins the live list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyAdded {
    pub agent: AgentId,
}

/// Published after an enemy left the live list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyRemoved {
    pub agent: AgentId,
}

/// Every spawner stopped and no enemy is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WaveCleared;

#[derive(Debug, Default)]
struct WaveState {
    live: Vec<AgentId>,
    active_spawners: usize,
    spawning_finished: bool,
    wave_declared: bool,
}

impl WaveState {
    /// Latch the end of the wave. True only the first time it is reached.
    fn try_declare_end(&mut self) -> bool {
        if self.wave_declared || !self.spawning_finished || !self.live.is_empty() {
            return false;
        }
        self.wave_declared = true;
        true
    }
}

/// Read-only snapshot of the live enemies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveEnemies {
    pub agents: Vec<AgentId>,
    pub active_spawners: usize,
}

pub struct EnemyRegistry {
    state: Arc<Mutex<WaveState>>,
    bus: EventBus,
    on_started: Handler<SpawningStarted>,
    on_stopped: Handler<SpawningStopped>,
}

fn lock(state: &Mutex<WaveState>) -> MutexGuard<'_, WaveState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl EnemyRegistry {
    pub fn new(bus: EventBus) -> Self {
        let state = Arc::new(Mutex::new(WaveState::default()));

        let started = Arc::clone(&state);
        let on_started = bus.subscribe_fn(move |_: &SpawningStarted| {
            let mut wave = lock(&started);
            wave.active_spawners += 1;
            wave.spawning_finished = false;
            wave.wave_declared = false;
            debug!("Spawner started, {} active", wave.active_spawners);
        });

        let stopped = Arc::clone(&state);
        let stop_bus = bus.clone();
        let on_stopped = bus.subscribe_fn(move |_: &SpawningStopped| {
            let cleared = {
                let mut wave = lock(&stopped);
                wave.active_spawners = wave.active_spawners.saturating_sub(1);
                if wave.active_spawners == 0 {
                    wave.spawning_finished = true;
                }
                debug!("Spawner stopped, {} active", wave.active_spawners);
                wave.try_declare_end()
            };
            if cleared {
                info!("Wave cleared");
                stop_bus.publish(WaveCleared);
            }
        });

        Self {
            state,
            bus,
            on_started,
            on_stopped,
        }
    }

    /// Announce the enemy, then start tracking it. Listeners run before the
    /// enemy appears in [`live_agents`](Self::live_agents).
    pub fn add(&mut self, agent: AgentId) {
        if self.contains(agent) {
            warn!("Enemy {:?} already registered", agent);
            return;
        }

        self.bus.publish(EnemyAdded { agent });
        lock(&self.state).live.push(agent);
    }

    /// Stop tracking a live enemy and check whether the wave is over.
    ///
    /// Removing an enemy that is not tracked does nothing and returns false.
    pub fn remove(&mut self, agent: AgentId) -> bool {
        let removed = {
            let mut wave = lock(&self.state);
            match wave.live.iter().position(|&live| live == agent) {
                Some(index) => {
                    wave.live.remove(index);
                    true
                }
                None => false,
            }
        };
        if !removed {
            return false;
        }

        self.bus.publish(EnemyRemoved { agent });

        let cleared = lock(&self.state).try_declare_end();
        if cleared {
            info!("Wave cleared");
            self.bus.publish(WaveCleared);
        }
        true
    }

    pub fn contains(&self, agent: AgentId) -> bool {
        lock(&self.state).live.contains(&agent)
    }

    pub fn len(&self) -> usize {
        lock(&self.state).live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn live_agents(&self) -> Vec<AgentId> {
        lock(&self.state).live.clone()
    }

    pub fn view(&self) -> LiveEnemies {
        let wave = lock(&self.state);
        LiveEnemies {
            agents: wave.live.clone(),
            active_spawners: wave.active_spawners,
        }
    }

    /// Forget every enemy and spawner, ready for a new wave.
    pub fn clear(&mut self) {
        *lock(&self.state) = WaveState::default();
    }
}

impl Drop for EnemyRegistry {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.on_started);
        self.bus.unsubscribe(&self.on_stopped);
    }
}
