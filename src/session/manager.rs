//! Match sessions: when a match started, when it ended, what was earned.

use std::time::{SystemTime, UNIX_EPOCH};

use bevy::log::{error, info, warn};
use serde::{Deserialize, Serialize};

use super::store::{load_ron, save_ron, PersistenceError, PersistenceService};
use crate::core::EventBus;
use crate::economy::SoulstoneCache;

/// Where the match history is persisted.
pub const SESSIONS_SAVE_PATH: &str = "game_sessions.ron";

/// One finished match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Seconds since the Unix epoch
    pub started_at: u64,
    pub ended_at: u64,
    pub duration_secs: u64,
    /// Soulstone balances when the match ended
    pub stones: Vec<SoulstoneCache>,
}

/// Published after a match was recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSessionAdded {
    pub record: MatchRecord,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionHistory {
    sessions: Vec<MatchRecord>,
}

pub struct SessionManager {
    active_since: Option<u64>,
    history: Vec<MatchRecord>,
    bus: EventBus,
}

impl SessionManager {
    pub fn new(bus: EventBus) -> Self {
        Self {
            active_since: None,
            history: Vec::new(),
            bus,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active_since.is_some()
    }

    pub fn history(&self) -> &[MatchRecord] {
        &self.history
    }

    /// Open a match. Ignored with a warning if one is already running.
    pub fn start_match(&mut self, now: u64) -> bool {
        if self.active_since.is_some() {
            warn!("Match already active, ignoring start");
            return false;
        }

        info!("Match started");
        self.active_since = Some(now);
        true
    }

    /// Close the running match, record it and persist the history.
    ///
    /// Ignored with a warning if no match is running. A failed save is
    /// logged; the record is kept in memory either way.
    pub fn end_match(
        &mut self,
        now: u64,
        stones: &[SoulstoneCache],
        store: &dyn PersistenceService,
    ) -> Option<&MatchRecord> {
        let Some(started_at) = self.active_since.take() else {
            warn!("No active match to end");
            return None;
        };

        let record = MatchRecord {
            started_at,
            ended_at: now,
            duration_secs: now.saturating_sub(started_at),
            stones: stones.to_vec(),
        };
        info!("Match ended after {}s", record.duration_secs);

        self.history.push(record.clone());
        self.bus.publish(NewSessionAdded { record });

        if let Err(e) = self.save(store) {
            error!("Failed to save match history: {}", e);
        }
        self.history.last()
    }

    pub fn save(&self, store: &dyn PersistenceService) -> Result<(), PersistenceError> {
        let history = SessionHistory {
            sessions: self.history.clone(),
        };
        save_ron(store, SESSIONS_SAVE_PATH, &history)
    }

    pub fn load(&mut self, store: &dyn PersistenceService) -> Result<(), PersistenceError> {
        self.history = load_ron::<SessionHistory>(store, SESSIONS_SAVE_PATH)?
            .unwrap_or_default()
            .sessions;
        info!("Loaded {} past matches", self.history.len());
        Ok(())
    }
}

/// Wall clock time in whole seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
