//! The top-level game state machine.
//!
//! Two kinds of transition exist. A permanent change exits the current state
//! and replaces it. A temporary transition suspends the current state on a
//! stack without exiting it, so an overlay (options, pause) can later hand
//! control back with [`GameStateMachine::resume_previous_state`].

use bevy::log::{debug, info, warn};

use super::bus::EventBus;
use super::services::SceneId;
use super::states::{FlowState, GameStateKind};

/// Everything a flow state may touch while entering, leaving or resuming.
pub trait GameContext {
    fn bus(&self) -> &EventBus;

    fn is_match_active(&self) -> bool;

    fn start_match(&mut self);

    fn end_match(&mut self);

    fn set_time_frozen(&mut self, frozen: bool);

    fn load_scene(&mut self, scene: SceneId);

    fn play_music(&mut self, name: &str);
}

/// Requests from the input/UI layer, queued until the flow can apply them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowRequest {
    /// Permanent change to the given state.
    Change(GameStateKind),
    /// Suspend the current state and open the given one on top.
    Transition(GameStateKind),
    /// Close the top overlay and restore what it covered.
    Resume,
    /// Close the top overlay, then change to the main menu.
    QuitToMenu,
    /// Close every overlay, then change to the main menu.
    ReturnToMenu,
}

#[derive(Default)]
pub struct GameStateMachine {
    current: Option<Box<dyn FlowState>>,
    suspended: Vec<Box<dyn FlowState>>,
}

impl GameStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<GameStateKind> {
        self.current.as_ref().map(|state| state.kind())
    }

    /// Suspended states, bottom of the stack first.
    pub fn suspended(&self) -> Vec<GameStateKind> {
        self.suspended.iter().map(|state| state.kind()).collect()
    }

    /// Permanent transition. The suspension stack is left untouched.
    pub fn change_state(&mut self, next: Box<dyn FlowState>, ctx: &mut dyn GameContext) {
        self.transition_state(next, false, ctx);
    }

    pub fn transition_state(
        &mut self,
        mut next: Box<dyn FlowState>,
        temporary: bool,
        ctx: &mut dyn GameContext,
    ) {
        if let Some(mut previous) = self.current.take() {
            if temporary {
                debug!("Suspending {:?} for {:?}", previous.kind(), next.kind());
                self.suspended.push(previous);
            } else {
                previous.exit(ctx);
            }
        }

        info!("Entering game state {:?}", next.kind());
        next.enter(ctx);
        self.current = Some(next);
    }

    /// Exit the current state and restore the most recently suspended one.
    ///
    /// Returns false, leaving everything as it was, when nothing is suspended.
    pub fn resume_previous_state(&mut self, ctx: &mut dyn GameContext) -> bool {
        let Some(mut restored) = self.suspended.pop() else {
            warn!("No suspended game state to resume");
            return false;
        };

        if let Some(mut current) = self.current.take() {
            current.exit(ctx);
        }

        info!("Resuming game state {:?}", restored.kind());
        restored.resume(ctx);
        self.current = Some(restored);
        true
    }

    pub fn handle_input(&mut self, ctx: &mut dyn GameContext) {
        if let Some(state) = self.current.as_mut() {
            state.handle_input(ctx);
        }
    }

    pub fn update(&mut self, ctx: &mut dyn GameContext) {
        if let Some(state) = self.current.as_mut() {
            state.update(ctx);
        }
    }

    pub fn log_stack(&self) {
        debug!(
            "Game state: {:?}, suspended: {:?}",
            self.current(),
            self.suspended()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeContext, StateLog};

    fn recording(kind: GameStateKind, log: &StateLog) -> Box<dyn FlowState> {
        Box::new(log.state(kind))
    }

    #[test]
    fn change_state_exits_old_before_entering_new() {
        let log = StateLog::new();
        let mut ctx = FakeContext::new();
        let mut flow = GameStateMachine::new();

        flow.change_state(recording(GameStateKind::MainMenu, &log), &mut ctx);
        flow.change_state(recording(GameStateKind::Play, &log), &mut ctx);

        assert_eq!(log.entries(), vec!["enter MainMenu", "exit MainMenu", "enter Play"]);
        assert_eq!(flow.current(), Some(GameStateKind::Play));
        assert!(flow.suspended().is_empty());
    }

    #[test]
    fn temporary_transition_suspends_without_exit() {
        let log = StateLog::new();
        let mut ctx = FakeContext::new();
        let mut flow = GameStateMachine::new();

        flow.change_state(recording(GameStateKind::MainMenu, &log), &mut ctx);
        flow.transition_state(recording(GameStateKind::OptionsMenu, &log), true, &mut ctx);

        assert_eq!(log.entries(), vec!["enter MainMenu", "enter OptionsMenu"]);
        assert_eq!(flow.suspended(), vec![GameStateKind::MainMenu]);
    }

    #[test]
    fn resume_exits_overlay_then_resumes_suspended_state() {
        let log = StateLog::new();
        let mut ctx = FakeContext::new();
        let mut flow = GameStateMachine::new();

        flow.change_state(recording(GameStateKind::MainMenu, &log), &mut ctx);
        flow.transition_state(recording(GameStateKind::OptionsMenu, &log), true, &mut ctx);
        log.clear();

        assert!(flow.resume_previous_state(&mut ctx));

        assert_eq!(log.entries(), vec!["exit OptionsMenu", "resume MainMenu"]);
        assert_eq!(flow.current(), Some(GameStateKind::MainMenu));
    }

    #[test]
    fn nested_overlays_unwind_in_lifo_order() {
        let log = StateLog::new();
        let mut ctx = FakeContext::new();
        let mut flow = GameStateMachine::new();

        flow.change_state(recording(GameStateKind::MainMenu, &log), &mut ctx);
        flow.transition_state(recording(GameStateKind::OptionsMenu, &log), true, &mut ctx);
        flow.transition_state(recording(GameStateKind::Pause, &log), true, &mut ctx);
        assert_eq!(
            flow.suspended(),
            vec![GameStateKind::MainMenu, GameStateKind::OptionsMenu]
        );
        log.clear();

        flow.resume_previous_state(&mut ctx);
        flow.resume_previous_state(&mut ctx);

        assert_eq!(
            log.entries(),
            vec![
                "exit Pause",
                "resume OptionsMenu",
                "exit OptionsMenu",
                "resume MainMenu",
            ]
        );
        assert_eq!(flow.current(), Some(GameStateKind::MainMenu));
        assert!(flow.suspended().is_empty());
    }

    #[test]
    fn resume_with_empty_stack_changes_nothing() {
        let log = StateLog::new();
        let mut ctx = FakeContext::new();
        let mut flow = GameStateMachine::new();

        flow.change_state(recording(GameStateKind::Play, &log), &mut ctx);
        log.clear();

        assert!(!flow.resume_previous_state(&mut ctx));
        assert!(log.entries().is_empty());
        assert_eq!(flow.current(), Some(GameStateKind::Play));
    }

    #[test]
    fn permanent_change_keeps_suspended_states() {
        let log = StateLog::new();
        let mut ctx = FakeContext::new();
        let mut flow = GameStateMachine::new();

        flow.change_state(recording(GameStateKind::Play, &log), &mut ctx);
        flow.transition_state(recording(GameStateKind::Pause, &log), true, &mut ctx);
        flow.change_state(recording(GameStateKind::OptionsMenu, &log), &mut ctx);

        assert_eq!(flow.suspended(), vec![GameStateKind::Play]);
        assert_eq!(flow.current(), Some(GameStateKind::OptionsMenu));
    }

    #[test]
    fn real_states_restore_frozen_time_on_resume() {
        let mut ctx = FakeContext::new();
        let mut flow = GameStateMachine::new();

        flow.change_state(GameStateKind::Play.into_state(), &mut ctx);
        flow.transition_state(GameStateKind::Pause.into_state(), true, &mut ctx);
        flow.transition_state(GameStateKind::OptionsMenu.into_state(), true, &mut ctx);

        flow.resume_previous_state(&mut ctx);
        assert_eq!(flow.current(), Some(GameStateKind::Pause));
        assert!(ctx.frozen);

        flow.resume_previous_state(&mut ctx);
        assert_eq!(flow.current(), Some(GameStateKind::Play));
        assert!(!ctx.frozen);
    }
}
