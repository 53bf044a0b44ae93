//! Arena configuration loaded from `assets/data/arena.ron`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::audio::SoundLibrary;
use crate::combat::{ImpactEffect, ImpactLibrary, WeaponTuning};
use crate::core::DataLoadError;
use crate::economy::{StoneDefinition, StoneKind, StoneRarity};
use crate::enemies::{EnemyTuning, SpawnerConfig};
use crate::player::PlayerTuning;

pub const ARENA_CONFIG_PATH: &str = "assets/data/arena.ron";

/// Everything tunable about a match.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Directory for save files, relative to the working directory
    pub save_dir: String,
    pub stones: Vec<StoneDefinition>,
    pub sounds: SoundLibrary,
    pub spawners: Vec<SpawnerConfig>,
    pub enemy: EnemyTuning,
    pub player: PlayerTuning,
    pub weapon: WeaponTuning,
    /// Flashes spawned where bullets land, by name
    pub impacts: ImpactLibrary,
    /// Impact effect left by every bullet that hits an enemy
    pub hit_effect: Option<String>,
    /// Sound played when a bullet hits an enemy
    pub hit_sound: Option<String>,
    /// Sound played for every shot
    pub shot_sound: Option<String>,
    /// Fixed seed for enemy randomness. Random when absent.
    pub seed: Option<u64>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            save_dir: "saves".to_string(),
            stones: vec![StoneDefinition {
                id: "ember".to_string(),
                name: "Ember Soulstone".to_string(),
                kind: StoneKind::Upgrade,
                rarity: StoneRarity::Normal,
            }],
            sounds: SoundLibrary::default(),
            spawners: vec![SpawnerConfig::default()],
            enemy: EnemyTuning::default(),
            player: PlayerTuning::default(),
            weapon: WeaponTuning::default(),
            impacts: ImpactLibrary::new(HashMap::from([(
                "Spark".to_string(),
                ImpactEffect {
                    radius: 0.3,
                    lifetime: 0.15,
                    color: [1.0, 0.8, 0.3],
                },
            )])),
            hit_effect: Some("Spark".to_string()),
            hit_sound: Some("Hit".to_string()),
            shot_sound: Some("Shoot".to_string()),
            seed: None,
        }
    }
}

/// Parse an arena config from RON text. `origin` names the source in errors.
pub fn parse_arena_config(contents: &str, origin: &str) -> Result<ArenaConfig, DataLoadError> {
    ron::from_str(contents).map_err(|e| DataLoadError::ParseError {
        path: origin.to_string(),
        details: e.to_string(),
    })
}

pub fn load_arena_config(path: &Path) -> Result<ArenaConfig, DataLoadError> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound(path.display().to_string()));
    }

    let contents = fs::read_to_string(path).map_err(|e| DataLoadError::ReadError {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;

    let config = parse_arena_config(&contents, &path.display().to_string())?;
    info!(
        "Loaded arena config: {} stones, {} sounds, {} spawners",
        config.stones.len(),
        config.sounds.len(),
        config.spawners.len()
    );
    Ok(config)
}

/// Load the config, falling back to defaults when it is missing or broken.
pub fn load_or_default(path: &Path) -> ArenaConfig {
    match load_arena_config(path) {
        Ok(config) => config,
        Err(DataLoadError::FileNotFound(path)) => {
            info!("No arena config at {}, using defaults", path);
            ArenaConfig::default()
        }
        Err(e) => {
            error!("{}; using default arena config", e);
            ArenaConfig::default()
        }
    }
}
