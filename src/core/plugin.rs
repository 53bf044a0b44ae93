//! Core plugin: drives the game flow from the bevy schedule.

use bevy::app::AppExit;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::{MonitorSelection, PrimaryWindow, WindowMode};
use bevy_kira_audio::{Audio, AudioChannel};

use super::flow::FlowRequest;
use super::services::{SceneId, SceneLoader, Services, SimulationClock};
use super::states::{ArenaScene, GameStateKind};
use crate::audio::{KiraBackend, MusicTrack, SoundDeck};
use crate::economy::{AddSoulstone, Command as WalletCommand, RemoveSoulstone, StoneCatalog, Wallet};
use crate::game::Game;
use crate::settings::QUALITY_LEVELS;

/// Step of the master volume hotkeys in the options menu.
const VOLUME_STEP: f32 = 0.1;

/// Soulstones added or removed per press of the main menu currency keys.
const CURRENCY_STEP: i32 = 10;

/// Ask the game to change its flow state. Applied once per frame, in order.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestFlow(pub FlowRequest);

/// Per-frame ordering shared by all gameplay plugins.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArenaSet {
    Input,
    Simulation,
    Cleanup,
    Flow,
}

/// Everything spawned for the arena scene. Despawned when the scene unloads.
#[derive(Component, Debug, Default)]
pub struct ArenaEntity;

#[derive(Component, Debug, Default)]
pub struct ArenaCamera;

/// Half-size of the arena floor.
pub const ARENA_HALF_SIZE: f32 = 20.0;

impl SimulationClock for Time<Virtual> {
    fn set_frozen(&mut self, frozen: bool) {
        if frozen {
            self.pause();
        } else {
            self.unpause();
        }
    }

    fn is_frozen(&self) -> bool {
        self.is_paused()
    }
}

impl SceneLoader for NextState<ArenaScene> {
    fn load_scene(&mut self, scene: SceneId) {
        info!("Loading scene {:?}", scene);
        self.set(match scene {
            SceneId::Menu => ArenaScene::Menu,
            SceneId::Arena => ArenaScene::Arena,
        });
    }
}

/// Engine side of [`Services`]: virtual time, scene state and the sound deck.
#[derive(SystemParam)]
pub struct EngineServices<'w> {
    clock: ResMut<'w, Time<Virtual>>,
    scene: ResMut<'w, NextState<ArenaScene>>,
    deck: ResMut<'w, SoundDeck>,
    audio: Res<'w, Audio>,
    music: Res<'w, AudioChannel<MusicTrack>>,
    assets: Res<'w, AssetServer>,
}

impl EngineServices<'_> {
    pub fn with<R>(&mut self, f: impl FnOnce(&mut Services<'_>) -> R) -> R {
        let mut backend = KiraBackend::new(&self.audio, &self.music, &self.assets);
        let mut player = self.deck.player(&mut backend);
        let mut services = Services::new(&mut *self.clock, &mut *self.scene, &mut player);
        f(&mut services)
    }
}

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<ArenaScene>()
            .add_event::<RequestFlow>()
            .configure_sets(
                Update,
                (
                    ArenaSet::Input,
                    ArenaSet::Simulation,
                    ArenaSet::Cleanup,
                    ArenaSet::Flow,
                )
                    .chain(),
            )
            .add_systems(Startup, (spawn_camera, start_game_flow).chain())
            .add_systems(
                Update,
                (flow_hotkeys, options_hotkeys, currency_hotkeys).in_set(ArenaSet::Input),
            )
            .add_systems(PostUpdate, apply_display_settings)
            .add_systems(
                Update,
                (apply_flow_requests, update_flow)
                    .chain()
                    .in_set(ArenaSet::Flow),
            )
            .add_systems(OnEnter(ArenaScene::Arena), setup_arena)
            .add_systems(OnExit(ArenaScene::Arena), cleanup_arena)
            .add_systems(Last, save_on_exit);
    }
}

/// Run condition: the match is running and not paused.
pub fn in_play(game: Res<Game>) -> bool {
    game.current_state() == Some(GameStateKind::Play)
}

fn spawn_camera(mut commands: Commands) {
    // Straight down, so screen right is +X and screen down is +Z.
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 30.0, 0.0).looking_at(Vec3::ZERO, Vec3::NEG_Z),
        ArenaCamera,
    ));
}

fn start_game_flow(mut game: ResMut<Game>, mut engine: EngineServices) {
    engine.with(|services| game.start(services));
}

fn flow_hotkeys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut game: ResMut<Game>,
    mut requests: EventWriter<RequestFlow>,
) {
    let current = game.current_state();

    if keyboard.just_pressed(KeyCode::Enter) && current == Some(GameStateKind::MainMenu) {
        requests.send(RequestFlow(FlowRequest::Change(GameStateKind::Play)));
    }

    if keyboard.just_pressed(KeyCode::KeyO)
        && matches!(current, Some(GameStateKind::MainMenu | GameStateKind::Play))
    {
        requests.send(RequestFlow(FlowRequest::Transition(
            GameStateKind::OptionsMenu,
        )));
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        match current {
            Some(GameStateKind::Play) => {
                requests.send(RequestFlow(FlowRequest::Transition(GameStateKind::Pause)));
            }
            Some(GameStateKind::Pause | GameStateKind::OptionsMenu) => {
                requests.send(RequestFlow(FlowRequest::Resume));
            }
            _ => {}
        }
    }

    if keyboard.just_pressed(KeyCode::KeyQ) && current == Some(GameStateKind::Pause) {
        requests.send(RequestFlow(FlowRequest::QuitToMenu));
    }

    if keyboard.just_pressed(KeyCode::Backspace) && !game.undo() {
        debug!("Nothing to undo");
    }
}

/// Minus / Equal change the master volume, F toggles fullscreen and G cycles
/// the quality preset. Only while the options menu is open.
fn options_hotkeys(keyboard: Res<ButtonInput<KeyCode>>, mut game: ResMut<Game>) {
    if game.current_state() != Some(GameStateKind::OptionsMenu) {
        return;
    }

    let settings = game.settings().clone();

    let mut master = settings.master_volume;
    if keyboard.just_pressed(KeyCode::Minus) {
        master -= VOLUME_STEP;
    }
    if keyboard.just_pressed(KeyCode::Equal) {
        master += VOLUME_STEP;
    }
    if master != settings.master_volume {
        game.save_audio_settings(master, settings.music_volume, settings.sfx_volume);
    }

    if keyboard.just_pressed(KeyCode::KeyF) {
        game.save_resolution(settings.width, settings.height, !settings.fullscreen);
    }

    if keyboard.just_pressed(KeyCode::KeyG) {
        game.save_quality((settings.quality + 1) % QUALITY_LEVELS);
    }
}

/// Tab selects the next soulstone, Equal and Minus add or remove some of it.
/// Only in the main menu; Backspace undoes.
fn currency_hotkeys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut game: ResMut<Game>,
    mut selected: Local<usize>,
) {
    if game.current_state() != Some(GameStateKind::MainMenu) {
        return;
    }

    if let Some(command) = currency_command(&keyboard, game.catalog(), &mut selected) {
        game.execute_command(command);
    }
}

fn currency_command(
    keyboard: &ButtonInput<KeyCode>,
    catalog: &StoneCatalog,
    selected: &mut usize,
) -> Option<Box<dyn WalletCommand<Wallet>>> {
    if catalog.is_empty() {
        return None;
    }

    if keyboard.just_pressed(KeyCode::Tab) {
        *selected = (*selected + 1) % catalog.len();
    }
    let stone = catalog.iter().nth(*selected % catalog.len())?;

    if keyboard.just_pressed(KeyCode::Equal) {
        info!("Adding {} {}", CURRENCY_STEP, stone.name);
        Some(Box::new(AddSoulstone::new(stone.id.clone(), CURRENCY_STEP)))
    } else if keyboard.just_pressed(KeyCode::Minus) {
        info!("Removing {} {}", CURRENCY_STEP, stone.name);
        Some(Box::new(RemoveSoulstone::new(stone.id.clone(), CURRENCY_STEP)))
    } else {
        None
    }
}

/// Apply the saved display settings to the window whenever they change.
fn apply_display_settings(
    game: Res<Game>,
    mut applied: Local<Option<(u32, u32, bool)>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let settings = game.settings();
    let wanted = (settings.width, settings.height, settings.fullscreen);
    if *applied == Some(wanted) {
        return;
    }
    let Ok(mut window) = windows.get_single_mut() else {
        return;
    };

    window.mode = if settings.fullscreen {
        WindowMode::BorderlessFullscreen(MonitorSelection::Current)
    } else {
        WindowMode::Windowed
    };
    window
        .resolution
        .set(settings.width as f32, settings.height as f32);
    info!(
        "Display set to {}x{}, fullscreen: {}",
        settings.width, settings.height, settings.fullscreen
    );
    *applied = Some(wanted);
}

fn apply_flow_requests(
    mut game: ResMut<Game>,
    mut requests: EventReader<RequestFlow>,
    mut engine: EngineServices,
) {
    engine.with(|services| {
        for RequestFlow(request) in requests.read() {
            game.apply(*request, services);
        }
        game.pump(services);
    });
}

fn update_flow(mut game: ResMut<Game>, mut engine: EngineServices) {
    engine.with(|services| game.update(services));
}

fn setup_arena(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let size = ARENA_HALF_SIZE * 2.0;
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(size, size))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.25, 0.22, 0.28),
            perceptual_roughness: 0.9,
            ..default()
        })),
        Transform::default(),
        ArenaEntity,
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 4000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_3,
            std::f32::consts::FRAC_PI_6,
            0.0,
        )),
        ArenaEntity,
    ));
}

fn cleanup_arena(mut commands: Commands, query: Query<Entity, With<ArenaEntity>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

fn save_on_exit(mut exits: EventReader<AppExit>, game: Res<Game>) {
    if exits.read().next().is_some() {
        info!("Saving progress before exit");
        game.save_progress();
    }
}
