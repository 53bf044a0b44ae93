//! Player plugin - keyboard and mouse into the player controller.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_rapier3d::prelude::*;

use super::controller::{PlayerController, PlayerInput};
use crate::combat::ShotFired;
use crate::config::ArenaConfig;
use crate::core::{in_play, ArenaCamera, ArenaEntity, ArenaScene, ArenaSet};
use crate::game::Game;

/// Where the player stands when the arena loads.
const PLAYER_SPAWN: Vec3 = Vec3::new(0.0, 0.9, 0.0);
const CAMERA_HEIGHT: f32 = 30.0;

#[derive(Component)]
pub struct Player {
    pub controller: PlayerController,
}

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(ArenaScene::Arena), spawn_player)
            .add_systems(
                Update,
                drive_player
                    .in_set(ArenaSet::Input)
                    .run_if(in_state(ArenaScene::Arena))
                    .run_if(in_play),
            )
            .add_systems(
                Update,
                follow_player
                    .in_set(ArenaSet::Cleanup)
                    .run_if(in_state(ArenaScene::Arena)),
            );
    }
}

fn spawn_player(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    game: Res<Game>,
    config: Res<ArenaConfig>,
) {
    let controller = PlayerController::new(
        PLAYER_SPAWN,
        config.player.clone(),
        config.weapon.clone(),
        game.bus().clone(),
    );

    commands.spawn((
        Player { controller },
        Mesh3d(meshes.add(Capsule3d::new(0.4, 1.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.3, 0.55, 0.85),
            ..default()
        })),
        Transform::from_translation(PLAYER_SPAWN),
        RigidBody::KinematicPositionBased,
        Collider::capsule_y(0.5, 0.4),
        ArenaEntity,
    ));
}

/// WASD moves; left mouse fires while moving, right mouse plants and fires.
fn drive_player(
    time: Res<Time>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut players: Query<(&mut Player, &mut Transform)>,
    mut shots: EventWriter<ShotFired>,
) {
    let Ok((mut player, mut transform)) = players.get_single_mut() else {
        return;
    };

    let mut movement = Vec2::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        movement.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        movement.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        movement.x += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        movement.x -= 1.0;
    }

    if mouse.just_pressed(MouseButton::Right) {
        player.controller.begin_attack();
    }
    if mouse.just_released(MouseButton::Right) {
        player.controller.end_attack();
    }

    let trigger = mouse.any_pressed([MouseButton::Left, MouseButton::Right]);
    let fire_at = if trigger {
        windows
            .get_single()
            .ok()
            .and_then(aim_direction)
            .map(|direction| player.controller.pose().position + direction)
    } else {
        None
    };

    let input = PlayerInput { movement, fire_at };
    for shot in player
        .controller
        .tick(input, time.elapsed_secs(), time.delta_secs())
    {
        shots.send(ShotFired(shot));
    }

    let pose = player.controller.pose();
    transform.translation = pose.position;
    transform.rotation = pose.rotation;
}

/// Ground direction from the player to the cursor.
///
/// The camera looks straight down on the player, so the cursor's offset from
/// the window centre is the aim: screen right is +X, screen down is +Z.
fn aim_direction(window: &Window) -> Option<Vec3> {
    let offset = window.cursor_position()? - window.size() / 2.0;
    let direction = Vec3::new(offset.x, 0.0, offset.y).normalize_or_zero();
    (direction != Vec3::ZERO).then_some(direction)
}

fn follow_player(
    player: Query<&Transform, (With<Player>, Without<ArenaCamera>)>,
    mut camera: Query<&mut Transform, With<ArenaCamera>>,
) {
    let (Ok(player), Ok(mut camera)) = (player.get_single(), camera.get_single_mut()) else {
        return;
    };
    camera.translation.x = player.translation.x;
    camera.translation.z = player.translation.z;
    camera.translation.y = CAMERA_HEIGHT;
}
