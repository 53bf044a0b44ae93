//! Enemy plugin - spawner entities, enemy movement and removal.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::agent::EnemyAgent;
use super::registry::AgentId;
use super::spawner::Spawner;
use crate::config::ArenaConfig;
use crate::core::{in_play, ArenaEntity, ArenaScene, ArenaSet};
use crate::game::Game;
use crate::player::Player;

/// A live enemy entity and the agent that drives it.
#[derive(Component)]
pub struct Enemy {
    pub id: AgentId,
    pub agent: EnemyAgent,
}

#[derive(Component)]
pub struct SpawnArea(pub Spawner);

/// Randomness for spawn positions, naps and strategies.
#[derive(Resource)]
pub struct EnemyRng(pub StdRng);

impl FromWorld for EnemyRng {
    fn from_world(world: &mut World) -> Self {
        match world.get_resource::<ArenaConfig>().and_then(|c| c.seed) {
            Some(seed) => {
                info!("Enemy randomness seeded with {}", seed);
                Self(StdRng::seed_from_u64(seed))
            }
            None => Self(StdRng::from_entropy()),
        }
    }
}

#[derive(Resource)]
pub struct EnemyVisuals {
    mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
}

impl FromWorld for EnemyVisuals {
    fn from_world(world: &mut World) -> Self {
        let mesh = world
            .resource_mut::<Assets<Mesh>>()
            .add(Capsule3d::new(0.4, 1.0));
        let material = world
            .resource_mut::<Assets<StandardMaterial>>()
            .add(StandardMaterial {
                base_color: Color::srgb(0.7, 0.15, 0.2),
                ..default()
            });
        Self { mesh, material }
    }
}

pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EnemyRng>()
            .init_resource::<EnemyVisuals>()
            .add_systems(OnEnter(ArenaScene::Arena), start_wave)
            .add_systems(
                Update,
                (tick_spawners, move_enemies)
                    .chain()
                    .in_set(ArenaSet::Simulation)
                    .run_if(in_state(ArenaScene::Arena))
                    .run_if(in_play),
            )
            .add_systems(
                Update,
                flush_enemy_removals
                    .in_set(ArenaSet::Cleanup)
                    .run_if(in_state(ArenaScene::Arena)),
            );
    }
}

/// Forget the previous wave and start every configured spawner.
fn start_wave(mut commands: Commands, mut game: ResMut<Game>, config: Res<ArenaConfig>) {
    game.reset_wave();

    for spawner_config in &config.spawners {
        let mut spawner = Spawner::new(spawner_config.clone(), game.bus().clone());
        spawner.start();
        commands.spawn((SpawnArea(spawner), ArenaEntity));
    }
    info!("Wave started with {} spawners", config.spawners.len());
}

fn tick_spawners(
    time: Res<Time>,
    mut commands: Commands,
    mut game: ResMut<Game>,
    mut rng: ResMut<EnemyRng>,
    visuals: Res<EnemyVisuals>,
    mut spawners: Query<&mut SpawnArea>,
) {
    let tuning = game.enemy_tuning().clone();

    for mut area in spawners.iter_mut() {
        area.0.tick(time.delta_secs(), &mut rng.0, |position, rng| {
            let id = game.add_enemy();
            let agent = EnemyAgent::spawn(position, &tuning, rng);
            debug!("Spawned enemy {:?} at {}", id, position);

            commands.spawn((
                Enemy { id, agent },
                Mesh3d(visuals.mesh.clone()),
                MeshMaterial3d(visuals.material.clone()),
                Transform::from_translation(position),
                RigidBody::KinematicPositionBased,
                Collider::capsule_y(0.5, 0.4),
                ArenaEntity,
            ));
        });
    }
}

fn move_enemies(
    time: Res<Time>,
    player: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut enemies: Query<(&mut Enemy, &mut Transform)>,
) {
    let Ok(player) = player.get_single() else {
        return;
    };
    let target = player.translation;
    let dt = time.delta_secs();

    for (mut enemy, mut transform) in enemies.iter_mut() {
        let pose = enemy.agent.tick(target, dt);
        transform.translation = pose.position;
        transform.rotation = pose.rotation;
    }
}

/// Despawn the enemies whose removal was scheduled this frame.
fn flush_enemy_removals(
    mut commands: Commands,
    mut game: ResMut<Game>,
    enemies: Query<(Entity, &Enemy)>,
) {
    let removed = game.flush_removals();
    if removed.is_empty() {
        return;
    }

    for (entity, enemy) in enemies.iter() {
        if removed.contains(&enemy.id) {
            commands.entity(entity).despawn_recursive();
        }
    }
}
