//! Payloads published on the [`EventBus`](super::EventBus).
//!
//! Menu and UI notifications carry no data: the type itself is the message.
//! Gameplay events with payloads live next to the system that publishes them
//! (wallet, registry, weapon, sessions).

/// The currency panel should become visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShowCurrencyUi;

/// The currency panel should be hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HideCurrencyUi;

/// The match history panel should become visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShowSessionUi;

/// The match history panel should be hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HideSessionUi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShowOptionsMenu;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HideOptionsMenu;

/// A spawner began producing enemies for the current wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpawningStarted;

/// A spawner handed out its last enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpawningStopped;

/// Audio levels were changed and saved. Values are linear, 0.0 to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSettingsChanged {
    pub master: f32,
    pub music: f32,
    pub sfx: f32,
}

/// Display mode was changed and saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionChanged {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}
