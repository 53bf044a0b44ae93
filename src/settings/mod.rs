//! Player settings - audio levels and display mode.
//!
//! Every change is saved right away and announced on the bus so the audio
//! backend and the window can pick it up.

use bevy::log::{error, info};
use serde::{Deserialize, Serialize};

use crate::core::{AudioSettingsChanged, EventBus, ResolutionChanged};
use crate::session::{load_ron, save_ron, PersistenceError, PersistenceService};

/// Where settings are persisted.
pub const SETTINGS_SAVE_PATH: &str = "settings.ron";

/// Decibel level used for a muted channel.
pub const MUTED_DECIBELS: f32 = -80.0;

/// Number of graphics quality presets. Levels run from 0 to this minus one.
pub const QUALITY_LEVELS: u32 = 4;

/// Published after the graphics quality level changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityChanged {
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Linear volume, 0.0 to 1.0
    pub master_volume: f32,
    pub music_volume: f32,
    pub sfx_volume: f32,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    /// Index into the quality presets
    pub quality: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            music_volume: 1.0,
            sfx_volume: 1.0,
            width: 1280,
            height: 720,
            fullscreen: true,
            quality: 2,
        }
    }
}

pub struct SettingsManager {
    settings: Settings,
    bus: EventBus,
}

impl SettingsManager {
    pub fn new(bus: EventBus) -> Self {
        Self {
            settings: Settings::default(),
            bus,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Restore saved settings, falling back to defaults when none exist.
    pub fn load(&mut self, store: &dyn PersistenceService) -> Result<(), PersistenceError> {
        self.settings = load_ron(store, SETTINGS_SAVE_PATH)?.unwrap_or_default();
        info!("Settings loaded");
        Ok(())
    }

    /// Volumes are clamped to 0.0..=1.0.
    pub fn save_audio(&mut self, master: f32, music: f32, sfx: f32, store: &dyn PersistenceService) {
        self.settings.master_volume = master.clamp(0.0, 1.0);
        self.settings.music_volume = music.clamp(0.0, 1.0);
        self.settings.sfx_volume = sfx.clamp(0.0, 1.0);
        self.persist(store);

        self.bus.publish(AudioSettingsChanged {
            master: self.settings.master_volume,
            music: self.settings.music_volume,
            sfx: self.settings.sfx_volume,
        });
    }

    pub fn save_resolution(
        &mut self,
        width: u32,
        height: u32,
        fullscreen: bool,
        store: &dyn PersistenceService,
    ) {
        self.settings.width = width;
        self.settings.height = height;
        self.settings.fullscreen = fullscreen;
        self.persist(store);

        self.bus.publish(ResolutionChanged {
            width,
            height,
            fullscreen,
        });
    }

    /// Levels past the last preset are clamped to it.
    pub fn save_quality(&mut self, level: u32, store: &dyn PersistenceService) {
        let level = level.min(QUALITY_LEVELS - 1);
        self.settings.quality = level;
        self.persist(store);
        self.bus.publish(QualityChanged { level });
    }

    fn persist(&self, store: &dyn PersistenceService) {
        if let Err(e) = save_ron(store, SETTINGS_SAVE_PATH, &self.settings) {
            error!("Failed to save settings: {}", e);
        }
    }
}

/// Convert a linear 0..1 volume to decibels for a mixer.
pub fn linear_to_decibels(linear: f32) -> f32 {
    if linear > 0.0 {
        20.0 * linear.log10()
    } else {
        MUTED_DECIBELS
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::session::MemoryStore;

    #[test]
    fn decibel_conversion() {
        assert_eq!(linear_to_decibels(1.0), 0.0);
        assert!((linear_to_decibels(0.1) + 20.0).abs() < 1e-4);
        assert_eq!(linear_to_decibels(0.0), MUTED_DECIBELS);
    }

    #[test]
    fn audio_changes_are_clamped_saved_and_announced() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        bus.subscribe_fn(move |e: &AudioSettingsChanged| *sink.lock().unwrap() = Some(*e));

        let store = MemoryStore::new();
        let mut manager = SettingsManager::new(bus);
        manager.save_audio(0.5, 1.5, -0.2, &store);

        assert_eq!(
            *seen.lock().unwrap(),
            Some(AudioSettingsChanged {
                master: 0.5,
                music: 1.0,
                sfx: 0.0,
            })
        );

        let mut reloaded = SettingsManager::new(EventBus::new());
        reloaded.load(&store).unwrap();
        assert_eq!(reloaded.settings().master_volume, 0.5);
    }

    #[test]
    fn resolution_and_quality_are_announced() {
        let bus = EventBus::new();
        let resolutions = Arc::new(Mutex::new(Vec::new()));
        let qualities = Arc::new(Mutex::new(Vec::new()));
        let res_sink = Arc::clone(&resolutions);
        let quality_sink = Arc::clone(&qualities);
        bus.subscribe_fn(move |e: &ResolutionChanged| res_sink.lock().unwrap().push(*e));
        bus.subscribe_fn(move |e: &QualityChanged| quality_sink.lock().unwrap().push(e.level));

        let store = MemoryStore::new();
        let mut manager = SettingsManager::new(bus);
        manager.save_resolution(1920, 1080, false, &store);
        manager.save_quality(0, &store);

        assert_eq!(
            *resolutions.lock().unwrap(),
            vec![ResolutionChanged {
                width: 1920,
                height: 1080,
                fullscreen: false,
            }]
        );
        assert_eq!(*qualities.lock().unwrap(), vec![0]);
        assert_eq!(manager.settings().quality, 0);
    }

    #[test]
    fn quality_is_clamped_to_the_last_preset() {
        let mut manager = SettingsManager::new(EventBus::new());
        manager.save_quality(QUALITY_LEVELS + 3, &MemoryStore::new());
        assert_eq!(manager.settings().quality, QUALITY_LEVELS - 1);
    }

    #[test]
    fn missing_save_loads_defaults() {
        let mut manager = SettingsManager::new(EventBus::new());
        manager.load(&MemoryStore::new()).unwrap();
        assert_eq!(manager.settings(), &Settings::default());
    }
}
