//! Kira playback for the sound deck.

use bevy::prelude::*;
use bevy_kira_audio::prelude::{AudioApp, AudioChannel, AudioControl, AudioSource as KiraSource};
use bevy_kira_audio::Audio;

use super::library::{AudioBackend, AudioLevels, SoundCue, SoundDeck};
use crate::game::Game;

/// Channel reserved for background music, so it can be stopped on its own.
#[derive(Resource)]
pub struct MusicTrack;

/// Plays cues through bevy_kira_audio for the length of one system call.
pub struct KiraBackend<'a> {
    audio: &'a Audio,
    music: &'a AudioChannel<MusicTrack>,
    assets: &'a AssetServer,
}

impl<'a> KiraBackend<'a> {
    pub fn new(
        audio: &'a Audio,
        music: &'a AudioChannel<MusicTrack>,
        assets: &'a AssetServer,
    ) -> Self {
        Self {
            audio,
            music,
            assets,
        }
    }
}

impl AudioBackend for KiraBackend<'_> {
    fn play(&mut self, cue: &SoundCue, volume: f32) {
        let source: Handle<KiraSource> = self.assets.load(&cue.path);
        let mut command = self.audio.play(source);
        command.with_volume(volume as f64);
        if cue.looped {
            command.looped();
        }
    }

    fn play_music(&mut self, cue: &SoundCue, volume: f32) {
        let source: Handle<KiraSource> = self.assets.load(&cue.path);
        self.music.play(source).looped().with_volume(volume as f64);
    }

    fn stop_music(&mut self) {
        self.music.stop();
    }
}

pub struct SoundPlugin;

impl Plugin for SoundPlugin {
    fn build(&self, app: &mut App) {
        app.add_audio_channel::<MusicTrack>()
            .add_systems(PreUpdate, sync_audio_levels);
    }
}

/// Follow the saved volume settings, retuning music that is already playing.
fn sync_audio_levels(
    game: Res<Game>,
    mut deck: ResMut<SoundDeck>,
    music: Res<AudioChannel<MusicTrack>>,
) {
    let levels = AudioLevels::from(game.settings());
    if deck.levels == levels {
        return;
    }

    deck.levels = levels;
    if let Some(volume) = deck.music_volume() {
        music.set_volume(volume as f64);
    }
    debug!("Audio levels now {:?}", levels);
}
