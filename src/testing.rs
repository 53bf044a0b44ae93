//! Recording fakes for the engine boundaries, shared by unit tests.

use std::sync::{Arc, Mutex};

use crate::core::{
    AudioService, EventBus, FlowState, GameContext, GameStateKind, HideCurrencyUi,
    HideOptionsMenu, HideSessionUi, SceneId, SceneLoader, ShowCurrencyUi, ShowOptionsMenu,
    ShowSessionUi, SimulationClock,
};

/// One observable side effect of a flow hook.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartMatch,
    EndMatch,
    Frozen(bool),
    Scene(SceneId),
    Music(String),
    Published(&'static str),
}

/// A [`GameContext`] that records everything done to it, in order.
pub struct FakeContext {
    pub bus: EventBus,
    pub match_active: bool,
    pub frozen: bool,
    log: Arc<Mutex<Vec<Effect>>>,
}

impl FakeContext {
    pub fn new() -> Self {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        record::<ShowCurrencyUi>(&bus, &log, "ShowCurrencyUi");
        record::<HideCurrencyUi>(&bus, &log, "HideCurrencyUi");
        record::<ShowSessionUi>(&bus, &log, "ShowSessionUi");
        record::<HideSessionUi>(&bus, &log, "HideSessionUi");
        record::<ShowOptionsMenu>(&bus, &log, "ShowOptionsMenu");
        record::<HideOptionsMenu>(&bus, &log, "HideOptionsMenu");

        Self {
            bus,
            match_active: false,
            frozen: false,
            log,
        }
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.log.lock().unwrap().clone()
    }

    fn push(&self, effect: Effect) {
        self.log.lock().unwrap().push(effect);
    }
}

fn record<E: Send + Sync + 'static>(bus: &EventBus, log: &Arc<Mutex<Vec<Effect>>>, name: &'static str) {
    let log = Arc::clone(log);
    bus.subscribe_fn(move |_: &E| log.lock().unwrap().push(Effect::Published(name)));
}

impl GameContext for FakeContext {
    fn bus(&self) -> &EventBus {
        &self.bus
    }

    fn is_match_active(&self) -> bool {
        self.match_active
    }

    fn start_match(&mut self) {
        self.match_active = true;
        self.push(Effect::StartMatch);
    }

    fn end_match(&mut self) {
        self.match_active = false;
        self.push(Effect::EndMatch);
    }

    fn set_time_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
        self.push(Effect::Frozen(frozen));
    }

    fn load_scene(&mut self, scene: SceneId) {
        self.push(Effect::Scene(scene));
    }

    fn play_music(&mut self, name: &str) {
        self.push(Effect::Music(name.to_string()));
    }
}

/// Shared log of lifecycle calls made on [`RecordingState`]s.
#[derive(Clone, Default)]
pub struct StateLog(Arc<Mutex<Vec<String>>>);

impl StateLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, kind: GameStateKind) -> RecordingState {
        RecordingState {
            kind,
            log: self.clone(),
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    fn push(&self, hook: &str, kind: GameStateKind) {
        self.0.lock().unwrap().push(format!("{hook} {kind:?}"));
    }
}

/// A flow state with no behavior of its own that logs each hook call.
pub struct RecordingState {
    kind: GameStateKind,
    log: StateLog,
}

impl FlowState for RecordingState {
    fn kind(&self) -> GameStateKind {
        self.kind
    }

    fn enter(&mut self, _ctx: &mut dyn GameContext) {
        self.log.push("enter", self.kind);
    }

    fn resume(&mut self, _ctx: &mut dyn GameContext) {
        self.log.push("resume", self.kind);
    }

    fn exit(&mut self, _ctx: &mut dyn GameContext) {
        self.log.push("exit", self.kind);
    }
}

#[derive(Debug, Default)]
pub struct FakeClock {
    pub frozen: bool,
}

impl SimulationClock for FakeClock {
    fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    fn is_frozen(&self) -> bool {
        self.frozen
    }
}

#[derive(Debug, Default)]
pub struct FakeScenes {
    pub loaded: Vec<SceneId>,
}

impl SceneLoader for FakeScenes {
    fn load_scene(&mut self, scene: SceneId) {
        self.loaded.push(scene);
    }
}

#[derive(Debug, Default)]
pub struct FakeAudio {
    pub sounds: Vec<String>,
    pub music: Vec<String>,
    pub stops: usize,
}

impl AudioService for FakeAudio {
    fn play_sound(&mut self, name: &str) {
        self.sounds.push(name.to_string());
    }

    fn play_music(&mut self, name: &str) {
        self.music.push(name.to_string());
    }

    fn stop_music(&mut self) {
        self.stops += 1;
    }
}
