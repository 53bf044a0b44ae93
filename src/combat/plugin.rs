//! Combat plugin - projectiles, hits, impact flashes and pickups.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::damage::{ImpactEffect, Projectile};
use super::weapon::ShotRequest;
use crate::config::ArenaConfig;
use crate::core::{in_play, ArenaEntity, ArenaScene, ArenaSet, EngineServices};
use crate::economy::Loot;
use crate::enemies::{Enemy, HitOutcome};
use crate::game::Game;
use crate::player::Player;

const BULLET_RADIUS: f32 = 0.15;
const PICKUP_RADIUS: f32 = 0.4;

/// Loadout keys, matched in order with the weapon's hotkey modifiers.
const LOADOUT_KEYS: [KeyCode; 4] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
];

/// A bullet left the gun and should be put into the world.
#[derive(Event, Debug, Clone, Copy)]
pub struct ShotFired(pub ShotRequest);

#[derive(Component)]
pub struct Bullet {
    pub projectile: Projectile,
    pub lifetime: Timer,
}

/// Flash left where a bullet struck. Despawned when the timer runs out.
#[derive(Component)]
pub struct ImpactFlash {
    pub lifetime: Timer,
}

/// Loot lying in the arena, collected when the player touches it.
#[derive(Component)]
pub struct Pickup(pub Loot);

#[derive(Resource)]
pub struct CombatVisuals {
    bullet_mesh: Handle<Mesh>,
    impact_mesh: Handle<Mesh>,
    pickup_mesh: Handle<Mesh>,
    pickup_material: Handle<StandardMaterial>,
}

impl FromWorld for CombatVisuals {
    fn from_world(world: &mut World) -> Self {
        let mut meshes = world.resource_mut::<Assets<Mesh>>();
        let bullet_mesh = meshes.add(Sphere::new(BULLET_RADIUS));
        let impact_mesh = meshes.add(Sphere::new(1.0));
        let pickup_mesh = meshes.add(Cuboid::new(0.4, 0.4, 0.4));
        let pickup_material = world
            .resource_mut::<Assets<StandardMaterial>>()
            .add(StandardMaterial {
                base_color: Color::srgb(0.9, 0.75, 0.2),
                emissive: LinearRgba::rgb(0.6, 0.45, 0.1),
                ..default()
            });
        Self {
            bullet_mesh,
            impact_mesh,
            pickup_mesh,
            pickup_material,
        }
    }
}

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ShotFired>()
            .init_resource::<CombatVisuals>()
            .add_systems(
                Update,
                loadout_hotkeys
                    .in_set(ArenaSet::Input)
                    .run_if(in_state(ArenaScene::Arena))
                    .run_if(in_play),
            )
            .add_systems(
                Update,
                (
                    spawn_projectiles,
                    expire_projectiles,
                    resolve_collisions,
                    fade_impacts,
                )
                    .chain()
                    .in_set(ArenaSet::Simulation)
                    .run_if(in_state(ArenaScene::Arena)),
            );
    }
}

/// Number keys stack a bullet modifier; with Shift held they take one off.
fn loadout_hotkeys(keyboard: Res<ButtonInput<KeyCode>>, mut players: Query<&mut Player>) {
    let Ok(mut player) = players.get_single_mut() else {
        return;
    };

    let removing = keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
    let weapon = player.controller.weapon_mut();
    let bindings = weapon.tuning.hotkey_modifiers.clone();

    for (key, modifier) in LOADOUT_KEYS.iter().zip(bindings) {
        if !keyboard.just_pressed(*key) {
            continue;
        }
        if removing {
            weapon.loadout.remove_modifier(modifier);
        } else {
            weapon.loadout.add_modifier(modifier);
        }
    }
}

fn spawn_projectiles(
    mut commands: Commands,
    mut shots: EventReader<ShotFired>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    visuals: Res<CombatVisuals>,
    config: Res<ArenaConfig>,
    mut engine: EngineServices,
) {
    for ShotFired(shot) in shots.read() {
        let mut projectile = Projectile::new(shot.damage);
        if let Some(effect) = &config.hit_effect {
            projectile = projectile.with_hit_effect(effect.clone());
        }

        commands.spawn((
            Bullet {
                projectile,
                lifetime: Timer::from_seconds(config.weapon.bullet_lifetime, TimerMode::Once),
            },
            Mesh3d(visuals.bullet_mesh.clone()),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: shot.tint.into(),
                emissive: shot.tint,
                unlit: true,
                ..default()
            })),
            Transform::from_translation(shot.origin),
            RigidBody::Dynamic,
            GravityScale(0.0),
            Velocity::linear(shot.velocity),
            Collider::ball(BULLET_RADIUS),
            Sensor,
            ActiveEvents::COLLISION_EVENTS,
            ArenaEntity,
        ));

        if let Some(sound) = &config.shot_sound {
            engine.with(|services| services.audio.play_sound(sound));
        }
    }
}

fn expire_projectiles(
    time: Res<Time>,
    mut commands: Commands,
    mut bullets: Query<(Entity, &mut Bullet)>,
) {
    for (entity, mut bullet) in bullets.iter_mut() {
        if bullet.lifetime.tick(time.delta()).finished() {
            commands.entity(entity).despawn_recursive();
        }
    }
}

fn fade_impacts(
    time: Res<Time>,
    mut commands: Commands,
    mut flashes: Query<(Entity, &mut ImpactFlash)>,
) {
    for (entity, mut flash) in flashes.iter_mut() {
        if flash.lifetime.tick(time.delta()).finished() {
            commands.entity(entity).despawn_recursive();
        }
    }
}

/// Bullets hurt the enemies they touch; the player collects loot they touch.
#[allow(clippy::too_many_arguments)]
fn resolve_collisions(
    mut collisions: EventReader<CollisionEvent>,
    mut commands: Commands,
    mut game: ResMut<Game>,
    mut engine: EngineServices,
    mut materials: ResMut<Assets<StandardMaterial>>,
    visuals: Res<CombatVisuals>,
    config: Res<ArenaConfig>,
    bullets: Query<(&Bullet, &Transform)>,
    mut enemies: Query<&mut Enemy>,
    pickups: Query<&Pickup>,
    players: Query<(), With<Player>>,
    mut consumed: Local<Vec<Entity>>,
) {
    consumed.clear();

    for event in collisions.read() {
        let &CollisionEvent::Started(a, b, _) = event else {
            continue;
        };

        for (first, second) in [(a, b), (b, a)] {
            if consumed.contains(&first) || consumed.contains(&second) {
                continue;
            }

            if let (Ok((bullet, at)), Ok(mut enemy)) =
                (bullets.get(first), enemies.get_mut(second))
            {
                consumed.push(first);
                commands.entity(first).despawn_recursive();

                if let Some(effect) = config.impacts.for_hit(&bullet.projectile) {
                    spawn_impact(&mut commands, &visuals, &mut materials, effect, at.translation);
                }
                if let Some(sound) = &config.hit_sound {
                    engine.with(|services| services.audio.play_sound(sound));
                }

                match enemy.agent.take_hit(&bullet.projectile) {
                    HitOutcome::Destroyed { drop_at } => {
                        info!("Enemy {:?} destroyed", enemy.id);
                        game.schedule_removal(enemy.id);
                        if let Some(drop) = game.enemy_tuning().drop.clone() {
                            spawn_pickup(&mut commands, &visuals, Loot::Soulstone(drop), drop_at);
                        }
                    }
                    HitOutcome::Enraged { health_ratio } => {
                        debug!("Enemy {:?} enraged at {:.2}", enemy.id, health_ratio);
                    }
                    HitOutcome::Wounded { .. } | HitOutcome::Ignored => {}
                }
            } else if players.contains(first) {
                if let Ok(pickup) = pickups.get(second) {
                    consumed.push(second);
                    game.collect(&pickup.0);
                    commands.entity(second).despawn_recursive();
                }
            }
        }
    }
}

fn spawn_impact(
    commands: &mut Commands,
    visuals: &CombatVisuals,
    materials: &mut Assets<StandardMaterial>,
    effect: &ImpactEffect,
    position: Vec3,
) {
    let [r, g, b] = effect.color;
    commands.spawn((
        ImpactFlash {
            lifetime: Timer::from_seconds(effect.lifetime, TimerMode::Once),
        },
        Mesh3d(visuals.impact_mesh.clone()),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::linear_rgb(r, g, b),
            emissive: LinearRgba::rgb(r, g, b),
            unlit: true,
            ..default()
        })),
        Transform::from_translation(position).with_scale(Vec3::splat(effect.radius)),
        ArenaEntity,
    ));
}

fn spawn_pickup(commands: &mut Commands, visuals: &CombatVisuals, loot: Loot, position: Vec3) {
    commands.spawn((
        Pickup(loot),
        Mesh3d(visuals.pickup_mesh.clone()),
        MeshMaterial3d(visuals.pickup_material.clone()),
        Transform::from_translation(position),
        Collider::ball(PICKUP_RADIUS),
        Sensor,
        ActiveEvents::COLLISION_EVENTS,
        ActiveCollisionTypes::default() | ActiveCollisionTypes::KINEMATIC_STATIC,
        ArenaEntity,
    ));
}
