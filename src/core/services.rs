//! Boundaries between the game logic and the engine it runs in.
//!
//! The flow states only ever talk to these traits, so they can be driven by
//! Bevy resources in the running game and by recording fakes in tests.

/// Global simulation time scale. Frozen means gameplay time stops while
/// input and menus keep working.
pub trait SimulationClock {
    fn set_frozen(&mut self, frozen: bool);
    fn is_frozen(&self) -> bool;
}

/// Scenes the game can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneId {
    /// Menu backdrop. Scene index 0.
    Menu,
    /// The fighting arena. Scene index 1.
    Arena,
}

pub trait SceneLoader {
    fn load_scene(&mut self, scene: SceneId);
}

/// Named sound playback. Unknown names are logged and ignored by implementors.
pub trait AudioService {
    fn play_sound(&mut self, name: &str);
    fn play_music(&mut self, name: &str);
    fn stop_music(&mut self);
}

/// The engine services a flow transition needs, borrowed for one call.
pub struct Services<'a> {
    pub clock: &'a mut dyn SimulationClock,
    pub scenes: &'a mut dyn SceneLoader,
    pub audio: &'a mut dyn AudioService,
}

impl<'a> Services<'a> {
    pub fn new(
        clock: &'a mut dyn SimulationClock,
        scenes: &'a mut dyn SceneLoader,
        audio: &'a mut dyn AudioService,
    ) -> Self {
        Self { clock, scenes, audio }
    }
}
