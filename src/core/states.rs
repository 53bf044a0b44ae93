//! Top-level game flow states.
//!
//! Each state owns the side effects of entering and leaving it: menus
//! announced on the bus, simulation time frozen, scenes swapped, the match
//! session opened or closed. The [`GameStateMachine`](super::GameStateMachine)
//! decides when these hooks run.

use bevy::prelude::*;

use super::events::*;
use super::flow::GameContext;
use super::services::SceneId;

/// Identifies a top-level flow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStateKind {
    MainMenu,
    Play,
    OptionsMenu,
    Pause,
}

impl GameStateKind {
    /// Build a fresh instance of the state this kind names.
    pub fn into_state(self) -> Box<dyn FlowState> {
        match self {
            GameStateKind::MainMenu => Box::new(MainMenuState),
            GameStateKind::Play => Box::new(PlayState),
            GameStateKind::OptionsMenu => Box::new(OptionsMenuState),
            GameStateKind::Pause => Box::new(PauseState),
        }
    }
}

/// Lifecycle of a top-level flow state.
///
/// `resume` is distinct from `enter`: it runs when the state comes back from
/// the suspension stack, after the overlay that covered it has exited.
pub trait FlowState: Send + Sync {
    fn kind(&self) -> GameStateKind;

    fn enter(&mut self, ctx: &mut dyn GameContext);

    fn handle_input(&mut self, _ctx: &mut dyn GameContext) {}

    fn update(&mut self, _ctx: &mut dyn GameContext) {}

    fn resume(&mut self, _ctx: &mut dyn GameContext) {}

    fn exit(&mut self, ctx: &mut dyn GameContext);
}

/// Title screen with the currency and match history panels.
pub struct MainMenuState;

impl FlowState for MainMenuState {
    fn kind(&self) -> GameStateKind {
        GameStateKind::MainMenu
    }

    fn enter(&mut self, ctx: &mut dyn GameContext) {
        if ctx.is_match_active() {
            ctx.end_match();
        }
        ctx.play_music("Theme");
        ctx.bus().publish(ShowCurrencyUi);
        ctx.bus().publish(ShowSessionUi);
    }

    fn exit(&mut self, ctx: &mut dyn GameContext) {
        ctx.bus().publish(HideCurrencyUi);
        ctx.bus().publish(HideSessionUi);
    }
}

/// A running match in the arena.
pub struct PlayState;

impl FlowState for PlayState {
    fn kind(&self) -> GameStateKind {
        GameStateKind::Play
    }

    fn enter(&mut self, ctx: &mut dyn GameContext) {
        ctx.load_scene(SceneId::Arena);
        ctx.start_match();
    }

    fn exit(&mut self, ctx: &mut dyn GameContext) {
        ctx.load_scene(SceneId::Menu);
        ctx.end_match();
    }
}

/// Options overlay. Gameplay time stands still while it is open.
pub struct OptionsMenuState;

impl FlowState for OptionsMenuState {
    fn kind(&self) -> GameStateKind {
        GameStateKind::OptionsMenu
    }

    fn enter(&mut self, ctx: &mut dyn GameContext) {
        ctx.bus().publish(ShowOptionsMenu);
        ctx.set_time_frozen(true);
    }

    // An overlay opened on top of the options menu unfreezes time when it exits.
    fn resume(&mut self, ctx: &mut dyn GameContext) {
        ctx.set_time_frozen(true);
    }

    fn exit(&mut self, ctx: &mut dyn GameContext) {
        ctx.set_time_frozen(false);
        ctx.bus().publish(HideOptionsMenu);
    }
}

/// Pause overlay on top of a match.
pub struct PauseState;

impl FlowState for PauseState {
    fn kind(&self) -> GameStateKind {
        GameStateKind::Pause
    }

    fn enter(&mut self, ctx: &mut dyn GameContext) {
        ctx.set_time_frozen(true);
    }

    fn resume(&mut self, ctx: &mut dyn GameContext) {
        ctx.set_time_frozen(true);
    }

    fn exit(&mut self, ctx: &mut dyn GameContext) {
        ctx.set_time_frozen(false);
    }
}

/// Which scene the engine currently shows.
///
/// The scene loader boundary drives this state; arena entities are spawned on
/// entering `Arena` and torn down on leaving it.
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum ArenaScene {
    #[default]
    Menu,
    Arena,
}
