//! Named sound lookups and the playback rules around them.
//!
//! Sounds are addressed by name ("Theme", "Hit") and resolved through the
//! [`SoundLibrary`]. The [`SoundDeck`] remembers what music is playing so a
//! track is never restarted on top of itself.

use std::collections::HashMap;

use bevy::log::{debug, warn};
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::core::AudioService;
use crate::settings::Settings;

/// One playable sound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundCue {
    /// Asset path, relative to the assets folder
    pub path: String,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default)]
    pub looped: bool,
}

fn default_volume() -> f32 {
    1.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoundLibrary {
    cues: HashMap<String, SoundCue>,
}

impl SoundLibrary {
    pub fn new(cues: HashMap<String, SoundCue>) -> Self {
        Self { cues }
    }

    pub fn get(&self, name: &str) -> Option<&SoundCue> {
        self.cues.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SoundCue)> {
        self.cues.iter().map(|(name, cue)| (name.as_str(), cue))
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}

/// What actually makes noise.
pub trait AudioBackend {
    /// `volume` is the final linear volume after channel levels were applied.
    fn play(&mut self, cue: &SoundCue, volume: f32);

    fn play_music(&mut self, cue: &SoundCue, volume: f32);

    fn stop_music(&mut self);
}

/// Channel levels applied on top of each cue's own volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioLevels {
    pub master: f32,
    pub music: f32,
    pub sfx: f32,
}

impl Default for AudioLevels {
    fn default() -> Self {
        Self {
            master: 1.0,
            music: 1.0,
            sfx: 1.0,
        }
    }
}

impl From<&Settings> for AudioLevels {
    fn from(settings: &Settings) -> Self {
        Self {
            master: settings.master_volume,
            music: settings.music_volume,
            sfx: settings.sfx_volume,
        }
    }
}

#[derive(Resource, Debug, Default)]
pub struct SoundDeck {
    library: SoundLibrary,
    now_playing: Option<String>,
    pub levels: AudioLevels,
}

impl SoundDeck {
    pub fn new(library: SoundLibrary) -> Self {
        Self {
            library,
            ..Default::default()
        }
    }

    pub fn now_playing(&self) -> Option<&str> {
        self.now_playing.as_deref()
    }

    /// Volume of the current music track at the current levels.
    pub fn music_volume(&self) -> Option<f32> {
        let cue = self.library.get(self.now_playing.as_deref()?)?;
        Some(cue.volume * self.levels.master * self.levels.music)
    }

    /// Borrow the deck together with a backend as an [`AudioService`].
    pub fn player<'a>(&'a mut self, backend: &'a mut dyn AudioBackend) -> DeckPlayer<'a> {
        DeckPlayer {
            deck: self,
            backend,
        }
    }
}

pub struct DeckPlayer<'a> {
    deck: &'a mut SoundDeck,
    backend: &'a mut dyn AudioBackend,
}

impl AudioService for DeckPlayer<'_> {
    fn play_sound(&mut self, name: &str) {
        let Some(cue) = self.deck.library.get(name) else {
            warn!("Sound: {} not found!", name);
            return;
        };

        let levels = self.deck.levels;
        self.backend.play(cue, cue.volume * levels.master * levels.sfx);
    }

    fn play_music(&mut self, name: &str) {
        if self.deck.now_playing.is_some() {
            debug!("Music already playing, not starting '{}'", name);
            return;
        }

        let Some(cue) = self.deck.library.get(name) else {
            warn!("Music: {} not found!", name);
            return;
        };

        let levels = self.deck.levels;
        self.backend
            .play_music(cue, cue.volume * levels.master * levels.music);
        self.deck.now_playing = Some(name.to_string());
    }

    fn stop_music(&mut self) {
        if self.deck.now_playing.take().is_some() {
            self.backend.stop_music();
        }
    }
}
