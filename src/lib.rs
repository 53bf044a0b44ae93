//! Soulstone Arena - a top-down arena shooter in Bevy.
//!
//! Waves of enemies pour out of spawners; the player shoots them for
//! soulstones, the currency that persists between matches.
//!
//! # Architecture
//!
//! The game logic is plain Rust wired together by [`game::Game`] and talks
//! to the engine only through the traits in [`core::services`]. Plugins
//! adapt it to Bevy:
//!
//! - **Core**: Game flow states, event bus, scene switching, hotkeys
//! - **Audio**: Named sounds and music through kira
//! - **Enemies**: Spawners, movement strategies, wave tracking
//! - **Player**: Locomotion states and input
//! - **Combat**: Bullets, modifiers, hits and pickups
//! - **Economy**: Soulstone wallet, undoable commands, collectibles
//! - **Session / Settings**: Match history and options, saved as RON

pub mod audio;
pub mod combat;
pub mod config;
pub mod core;
pub mod economy;
pub mod enemies;
pub mod game;
pub mod player;
pub mod session;
pub mod settings;

#[cfg(test)]
mod testing;

use bevy::prelude::*;

/// Main game plugin that adds all sub-plugins.
///
/// Expects [`config::ArenaConfig`], [`game::Game`] and [`audio::SoundDeck`]
/// to be inserted as resources first.
pub struct SoulstoneArenaPlugin;

impl Plugin for SoulstoneArenaPlugin {
    fn build(&self, app: &mut App) {
        app
            // Core systems (must be first)
            .add_plugins(core::CorePlugin)
            .add_plugins(audio::SoundPlugin)
            .add_plugins(player::PlayerPlugin)
            .add_plugins(combat::CombatPlugin)
            .add_plugins(enemies::EnemyPlugin);
    }
}
