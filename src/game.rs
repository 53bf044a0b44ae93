//! The composition root: every game service, wired together once.
//!
//! [`Game`] owns the event bus and the services hanging off it, and exposes
//! the operations the input and UI layer may call. Anything that needs the
//! engine (clock, scenes, audio) is passed in per call as [`Services`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use bevy::log::{error, info, warn};
use bevy::prelude::Resource;

use crate::config::ArenaConfig;
use crate::core::{
    EventBus, FlowRequest, GameContext, GameStateKind, GameStateMachine, Handler, InitError,
    SceneId, Services,
};
use crate::economy::{Collectible, Command, CommandInvoker, StoneCatalog, Wallet};
use crate::enemies::{AgentId, EnemyRegistry, EnemyTuning, WaveCleared};
use crate::session::{unix_now, PersistenceService, SessionManager};
use crate::settings::{Settings, SettingsManager};

type RequestQueue = Arc<Mutex<VecDeque<FlowRequest>>>;

#[derive(Default)]
pub struct GameBuilder {
    bus: Option<EventBus>,
    store: Option<Box<dyn PersistenceService>>,
    catalog: Option<StoneCatalog>,
    enemy: EnemyTuning,
}

impl GameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog and enemy tuning taken from the arena config.
    pub fn from_config(config: &ArenaConfig) -> Self {
        Self::new()
            .catalog(StoneCatalog::new(config.stones.iter().cloned()))
            .enemy_tuning(config.enemy.clone())
    }

    pub fn bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn store(mut self, store: impl PersistenceService + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn catalog(mut self, catalog: StoneCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn enemy_tuning(mut self, tuning: EnemyTuning) -> Self {
        self.enemy = tuning;
        self
    }

    /// Assemble the game and restore saved progress.
    ///
    /// Fails when the persistence store or the stone catalog was not given.
    /// Unreadable saves are logged and replaced by fresh state.
    pub fn build(self) -> Result<Game, InitError> {
        let store = self
            .store
            .ok_or(InitError::MissingService("persistence store"))?;
        let catalog = self
            .catalog
            .ok_or(InitError::MissingService("stone catalog"))?;
        let bus = self.bus.unwrap_or_default();

        let mut wallet = Wallet::new(bus.clone());
        if let Err(e) = wallet.load(store.as_ref(), &catalog) {
            error!("Failed to load soulstones, starting fresh: {}", e);
            wallet = Wallet::with_balances(bus.clone(), &catalog);
        }

        let mut sessions = SessionManager::new(bus.clone());
        if let Err(e) = sessions.load(store.as_ref()) {
            error!("Failed to load match history: {}", e);
        }

        let mut settings = SettingsManager::new(bus.clone());
        if let Err(e) = settings.load(store.as_ref()) {
            error!("Failed to load settings, using defaults: {}", e);
        }

        let pending: RequestQueue = Arc::default();
        let queue = Arc::clone(&pending);
        let on_wave_cleared = bus.subscribe_fn(move |_: &WaveCleared| {
            queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(FlowRequest::ReturnToMenu);
        });

        info!("Game assembled with {} soulstone kinds", catalog.len());
        Ok(Game {
            enemies: EnemyRegistry::new(bus.clone()),
            flow: GameStateMachine::new(),
            invoker: CommandInvoker::new(),
            wallet,
            sessions,
            settings,
            catalog,
            enemy_tuning: self.enemy,
            store,
            pending,
            on_wave_cleared,
            removals: Vec::new(),
            next_agent: 0,
            bus,
        })
    }
}

#[derive(Resource)]
pub struct Game {
    bus: EventBus,
    flow: GameStateMachine,
    enemies: EnemyRegistry,
    invoker: CommandInvoker<Wallet>,
    wallet: Wallet,
    sessions: SessionManager,
    settings: SettingsManager,
    catalog: StoneCatalog,
    enemy_tuning: EnemyTuning,
    store: Box<dyn PersistenceService>,
    pending: RequestQueue,
    on_wave_cleared: Handler<WaveCleared>,
    removals: Vec<AgentId>,
    next_agent: u64,
}

/// What flow states see of the game during one call.
struct HostView<'a, 's> {
    bus: &'a EventBus,
    sessions: &'a mut SessionManager,
    wallet: &'a Wallet,
    store: &'a dyn PersistenceService,
    services: &'a mut Services<'s>,
}

impl GameContext for HostView<'_, '_> {
    fn bus(&self) -> &EventBus {
        self.bus
    }

    fn is_match_active(&self) -> bool {
        self.sessions.is_active()
    }

    fn start_match(&mut self) {
        self.sessions.start_match(unix_now());
    }

    fn end_match(&mut self) {
        if self
            .sessions
            .end_match(unix_now(), self.wallet.stones(), self.store)
            .is_some()
        {
            if let Err(e) = self.wallet.save(self.store) {
                error!("Failed to save soulstones: {}", e);
            }
        }
    }

    fn set_time_frozen(&mut self, frozen: bool) {
        self.services.clock.set_frozen(frozen);
    }

    fn load_scene(&mut self, scene: SceneId) {
        self.services.scenes.load_scene(scene);
    }

    fn play_music(&mut self, name: &str) {
        self.services.audio.play_music(name);
    }
}

impl Game {
    fn with_flow<R>(
        &mut self,
        services: &mut Services<'_>,
        f: impl FnOnce(&mut GameStateMachine, &mut dyn GameContext) -> R,
    ) -> R {
        let mut host = HostView {
            bus: &self.bus,
            sessions: &mut self.sessions,
            wallet: &self.wallet,
            store: self.store.as_ref(),
            services,
        };
        f(&mut self.flow, &mut host)
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn current_state(&self) -> Option<GameStateKind> {
        self.flow.current()
    }

    pub fn suspended_states(&self) -> Vec<GameStateKind> {
        self.flow.suspended()
    }

    /// Enter the main menu if no state is running yet.
    pub fn start(&mut self, services: &mut Services<'_>) {
        if self.flow.current().is_none() {
            self.change_state(GameStateKind::MainMenu, services);
        }
    }

    pub fn change_state(&mut self, kind: GameStateKind, services: &mut Services<'_>) {
        self.with_flow(services, |flow, ctx| flow.change_state(kind.into_state(), ctx));
    }

    pub fn transition_state(
        &mut self,
        kind: GameStateKind,
        temporary: bool,
        services: &mut Services<'_>,
    ) {
        self.with_flow(services, |flow, ctx| {
            flow.transition_state(kind.into_state(), temporary, ctx)
        });
    }

    pub fn resume_previous_state(&mut self, services: &mut Services<'_>) -> bool {
        self.with_flow(services, |flow, ctx| flow.resume_previous_state(ctx))
    }

    /// Close the top overlay, then leave for the main menu.
    pub fn quit_to_menu(&mut self, services: &mut Services<'_>) {
        self.resume_previous_state(services);
        self.change_state(GameStateKind::MainMenu, services);
    }

    /// Unwind every overlay so the match state exits, then go to the main menu.
    pub fn return_to_menu(&mut self, services: &mut Services<'_>) {
        while !self.flow.suspended().is_empty() {
            self.resume_previous_state(services);
        }
        self.change_state(GameStateKind::MainMenu, services);
    }

    pub fn apply(&mut self, request: FlowRequest, services: &mut Services<'_>) {
        match request {
            FlowRequest::Change(kind) => self.change_state(kind, services),
            FlowRequest::Transition(kind) => self.transition_state(kind, true, services),
            FlowRequest::Resume => {
                self.resume_previous_state(services);
            }
            FlowRequest::QuitToMenu => self.quit_to_menu(services),
            FlowRequest::ReturnToMenu => self.return_to_menu(services),
        }
        self.flow.log_stack();
    }

    /// Apply flow requests queued by bus listeners, such as the end of a wave.
    pub fn pump(&mut self, services: &mut Services<'_>) {
        let queued: Vec<FlowRequest> = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        for request in queued {
            self.apply(request, services);
        }
    }

    /// Per-frame hooks of the current state.
    pub fn update(&mut self, services: &mut Services<'_>) {
        self.with_flow(services, |flow, ctx| {
            flow.handle_input(ctx);
            flow.update(ctx);
        });
    }

    pub fn execute_command(&mut self, command: Box<dyn Command<Wallet>>) {
        self.invoker.execute_command(command, &mut self.wallet);
    }

    pub fn undo(&mut self) -> bool {
        self.invoker.undo(&mut self.wallet)
    }

    pub fn can_undo(&self) -> bool {
        self.invoker.can_undo()
    }

    /// The player touched a collectible.
    pub fn collect(&mut self, item: &dyn Collectible) {
        item.accept(&mut self.wallet);
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn catalog(&self) -> &StoneCatalog {
        &self.catalog
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn settings(&self) -> &Settings {
        self.settings.settings()
    }

    pub fn save_audio_settings(&mut self, master: f32, music: f32, sfx: f32) {
        self.settings
            .save_audio(master, music, sfx, self.store.as_ref());
    }

    pub fn save_resolution(&mut self, width: u32, height: u32, fullscreen: bool) {
        self.settings
            .save_resolution(width, height, fullscreen, self.store.as_ref());
    }

    pub fn save_quality(&mut self, level: u32) {
        self.settings.save_quality(level, self.store.as_ref());
    }

    pub fn enemy_tuning(&self) -> &EnemyTuning {
        &self.enemy_tuning
    }

    pub fn enemies(&self) -> &EnemyRegistry {
        &self.enemies
    }

    /// Register a new enemy and return its handle.
    pub fn add_enemy(&mut self) -> AgentId {
        let agent = AgentId(self.next_agent);
        self.next_agent += 1;
        self.enemies.add(agent);
        agent
    }

    /// Queue an enemy for removal at the next [`flush_removals`](Self::flush_removals).
    pub fn schedule_removal(&mut self, agent: AgentId) {
        if !self.removals.contains(&agent) {
            self.removals.push(agent);
        }
    }

    /// Remove every queued enemy. Returns the ones that were still live.
    pub fn flush_removals(&mut self) -> Vec<AgentId> {
        let queued = std::mem::take(&mut self.removals);
        queued
            .into_iter()
            .filter(|&agent| self.enemies.remove(agent))
            .collect()
    }

    /// Forget all enemies and spawners before a new wave.
    pub fn reset_wave(&mut self) {
        self.enemies.clear();
        self.removals.clear();
    }

    pub fn save_progress(&self) {
        if let Err(e) = self.wallet.save(self.store.as_ref()) {
            error!("Failed to save soulstones: {}", e);
        }
        if self.sessions.is_active() {
            warn!("Saving while a match is still running; it will not be recorded");
        }
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.on_wave_cleared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::{AddSoulstone, RemoveSoulstone, SoulstonePickup, StoneDefinition};
    use crate::core::{SpawningStarted, SpawningStopped};
    use crate::economy::{StoneKind, StoneRarity};
    use crate::session::MemoryStore;
    use crate::testing::{FakeAudio, FakeClock, FakeScenes};

    fn catalog() -> StoneCatalog {
        StoneCatalog::new([StoneDefinition {
            id: "ember".into(),
            name: "Ember".into(),
            kind: StoneKind::Upgrade,
            rarity: StoneRarity::Normal,
        }])
    }

    fn fakes() -> (FakeClock, FakeScenes, FakeAudio) {
        Default::default()
    }

    fn game() -> Game {
        GameBuilder::new()
            .store(MemoryStore::new())
            .catalog(catalog())
            .build()
            .unwrap()
    }

    #[test]
    fn build_requires_store_and_catalog() {
        let missing_store = GameBuilder::new().catalog(catalog()).build();
        assert!(matches!(
            missing_store,
            Err(InitError::MissingService("persistence store"))
        ));

        let missing_catalog = GameBuilder::new().store(MemoryStore::new()).build();
        assert!(matches!(
            missing_catalog,
            Err(InitError::MissingService("stone catalog"))
        ));
    }

    #[test]
    fn start_enters_main_menu_with_theme() {
        let mut game = game();
        let (mut clock, mut scenes, mut audio) = fakes();
        let mut services = Services::new(&mut clock, &mut scenes, &mut audio);

        game.start(&mut services);
        game.start(&mut services);

        assert_eq!(game.current_state(), Some(GameStateKind::MainMenu));
        assert_eq!(audio.music, vec!["Theme"]);
    }

    #[test]
    fn play_records_a_session_when_leaving() {
        let mut game = game();
        let (mut clock, mut scenes, mut audio) = fakes();
        let mut services = Services::new(&mut clock, &mut scenes, &mut audio);

        game.start(&mut services);
        game.change_state(GameStateKind::Play, &mut services);
        assert!(game.sessions().is_active());

        game.transition_state(GameStateKind::Pause, true, &mut services);
        game.quit_to_menu(&mut services);

        assert_eq!(game.current_state(), Some(GameStateKind::MainMenu));
        assert!(game.suspended_states().is_empty());
        assert_eq!(game.sessions().history().len(), 1);
        assert!(!clock.frozen);
        assert_eq!(scenes.loaded, vec![SceneId::Arena, SceneId::Menu]);
    }

    #[test]
    fn wave_end_under_an_overlay_leaves_the_arena() {
        let mut game = game();
        let (mut clock, mut scenes, mut audio) = fakes();
        let mut services = Services::new(&mut clock, &mut scenes, &mut audio);

        game.start(&mut services);
        game.change_state(GameStateKind::Play, &mut services);
        game.bus().publish(SpawningStarted);
        let last = game.add_enemy();
        game.bus().publish(SpawningStopped);
        game.transition_state(GameStateKind::Pause, true, &mut services);
        game.transition_state(GameStateKind::OptionsMenu, true, &mut services);

        game.schedule_removal(last);
        game.flush_removals();
        game.pump(&mut services);

        assert_eq!(game.current_state(), Some(GameStateKind::MainMenu));
        assert!(game.suspended_states().is_empty());
        assert!(!game.sessions().is_active());
        assert_eq!(game.sessions().history().len(), 1);
        assert!(!clock.frozen);
        assert_eq!(scenes.loaded.last(), Some(&SceneId::Menu));
    }

    #[test]
    fn commands_and_pickups_change_the_wallet() {
        let mut game = game();

        game.execute_command(Box::new(AddSoulstone::new("ember", 5)));
        game.execute_command(Box::new(RemoveSoulstone::new("ember", 8)));
        assert_eq!(game.wallet().amount("ember"), -3);

        assert!(game.undo());
        assert_eq!(game.wallet().amount("ember"), 5);

        game.collect(&SoulstonePickup {
            stone_id: "ember".into(),
            quantity: 2,
        });
        assert_eq!(game.wallet().amount("ember"), 7);
    }

    #[test]
    fn scheduled_removals_flush_once() {
        let mut game = game();
        let first = game.add_enemy();
        let second = game.add_enemy();

        game.schedule_removal(first);
        game.schedule_removal(first);
        assert_eq!(game.flush_removals(), vec![first]);
        assert_eq!(game.flush_removals(), Vec::<AgentId>::new());

        assert_eq!(game.enemies().live_agents(), vec![second]);
    }

    #[test]
    fn progress_survives_a_rebuild() {
        let store = Arc::new(MemoryStore::new());

        let mut first = GameBuilder::new()
            .store(Arc::clone(&store))
            .catalog(catalog())
            .build()
            .unwrap();
        first.execute_command(Box::new(AddSoulstone::new("ember", 11)));
        first.save_progress();
        drop(first);

        let second = GameBuilder::new()
            .store(store)
            .catalog(catalog())
            .build()
            .unwrap();
        assert_eq!(second.wallet().amount("ember"), 11);
    }
}
