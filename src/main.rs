//! Soulstone Arena - Entry Point
//!
//! Controls:
//! - Enter: Start a match from the main menu
//! - WASD: Move
//! - Left mouse: Fire towards the cursor
//! - Right mouse: Stand still and fire
//! - 1-4: Stack a bullet modifier (Shift + key takes it off)
//! - O: Options
//! - Escape: Pause / back
//! - Q: Quit to the main menu while paused
//! - Backspace: Undo the last soulstone change

use std::path::Path;

use bevy::prelude::*;
use bevy_kira_audio::AudioPlugin as KiraAudioPlugin;
use bevy_rapier3d::prelude::*;

use soulstone_arena::audio::SoundDeck;
use soulstone_arena::config::{load_or_default, ARENA_CONFIG_PATH};
use soulstone_arena::core::InitError;
use soulstone_arena::game::GameBuilder;
use soulstone_arena::session::FileStore;

fn main() -> Result<(), InitError> {
    let config = load_or_default(Path::new(ARENA_CONFIG_PATH));
    let game = GameBuilder::from_config(&config)
        .store(FileStore::new(&config.save_dir))
        .build()?;

    let settings = game.settings().clone();
    let deck = SoundDeck::new(config.sounds.clone());

    App::new()
        // Bevy default plugins, with kira taking over audio
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Soulstone Arena".to_string(),
                        resolution: (settings.width as f32, settings.height as f32).into(),
                        ..default()
                    }),
                    ..default()
                })
                .disable::<bevy::audio::AudioPlugin>(),
        )
        .add_plugins(KiraAudioPlugin)
        // Physics
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        .insert_resource(config)
        .insert_resource(deck)
        .insert_resource(game)
        // Our game plugin
        .add_plugins(soulstone_arena::SoulstoneArenaPlugin)
        .run();

    Ok(())
}
