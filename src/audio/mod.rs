//! Audio module - named sounds, music and volume levels.

mod library;
mod plugin;

pub use library::*;
pub use plugin::{KiraBackend, MusicTrack, SoundPlugin};
