//! The player's gun and the bullet modifiers stacked on it.

use bevy::color::{LinearRgba, Mix};
use bevy::log::{debug, warn};
use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::EventBus;

/// Damage at which bullets are fully red.
const MAX_TINT_DAMAGE: f32 = 50.0;
/// Speed at which bullets are fully blue.
const MAX_TINT_SPEED: f32 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTuning {
    /// Minimum seconds between two shots
    pub shoot_interval: f32,
    /// Height above the player's feet where bullets appear
    pub muzzle_height: f32,
    pub base_damage: i32,
    pub base_speed: f32,
    /// Seconds before an unobstructed bullet disappears
    pub bullet_lifetime: f32,
    /// Modifiers bound to the loadout hotkeys, in key order
    pub hotkey_modifiers: Vec<BulletModifier>,
}

impl Default for WeaponTuning {
    fn default() -> Self {
        Self {
            shoot_interval: 0.5,
            muzzle_height: 1.0,
            base_damage: 10,
            base_speed: 10.0,
            bullet_lifetime: 3.0,
            hotkey_modifiers: vec![BulletModifier::Damage(10), BulletModifier::Speed(5.0)],
        }
    }
}

/// A stackable change to every bullet fired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BulletModifier {
    Damage(i32),
    Speed(f32),
}

/// The bullet that comes out of the gun with the current modifiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulletStats {
    pub damage: i32,
    pub speed: f32,
    pub tint: LinearRgba,
}

impl BulletStats {
    fn from_base(damage: i32, speed: f32, base_damage: i32, base_speed: f32) -> Self {
        let hot = LinearRgba::WHITE.mix(
            &LinearRgba::RED,
            inverse_lerp(base_damage as f32, MAX_TINT_DAMAGE, damage as f32),
        );
        let fast = LinearRgba::WHITE.mix(
            &LinearRgba::BLUE,
            inverse_lerp(base_speed, MAX_TINT_SPEED, speed),
        );

        Self {
            damage,
            speed,
            tint: hot.mix(&fast, 0.5),
        }
    }
}

/// Where `value` sits between `a` and `b`, clamped to 0..=1.
fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Published after a modifier was stacked onto the gun.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponBulletAdded {
    pub modifier: BulletModifier,
    pub stats: BulletStats,
}

/// Published after a modifier was taken off the gun.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponBulletRemoved {
    pub modifier: BulletModifier,
    pub stats: BulletStats,
}

pub struct BulletLoadout {
    base_damage: i32,
    base_speed: f32,
    modifiers: Vec<BulletModifier>,
    stats: BulletStats,
    bus: EventBus,
}

impl BulletLoadout {
    pub fn new(base_damage: i32, base_speed: f32, bus: EventBus) -> Self {
        Self {
            base_damage,
            base_speed,
            modifiers: Vec::new(),
            stats: BulletStats::from_base(base_damage, base_speed, base_damage, base_speed),
            bus,
        }
    }

    pub fn stats(&self) -> BulletStats {
        self.stats
    }

    pub fn modifiers(&self) -> &[BulletModifier] {
        &self.modifiers
    }

    pub fn add_modifier(&mut self, modifier: BulletModifier) {
        self.modifiers.push(modifier);
        self.recompute();
        debug!("Bullet modifier added: {:?}", modifier);
        self.bus.publish(WeaponBulletAdded {
            modifier,
            stats: self.stats,
        });
    }

    /// Take off one instance of `modifier`. False if none is stacked.
    pub fn remove_modifier(&mut self, modifier: BulletModifier) -> bool {
        let Some(index) = self.modifiers.iter().position(|m| *m == modifier) else {
            warn!("Bullet modifier {:?} is not applied", modifier);
            return false;
        };

        self.modifiers.remove(index);
        self.recompute();
        self.bus.publish(WeaponBulletRemoved {
            modifier,
            stats: self.stats,
        });
        true
    }

    fn recompute(&mut self) {
        let (damage, speed) = self.modifiers.iter().fold(
            (self.base_damage, self.base_speed),
            |(damage, speed), modifier| match modifier {
                BulletModifier::Damage(extra) => (damage + extra, speed),
                BulletModifier::Speed(extra) => (damage, speed + extra),
            },
        );
        self.stats = BulletStats::from_base(damage, speed, self.base_damage, self.base_speed);
    }
}

/// A bullet to be put into the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotRequest {
    pub origin: Vec3,
    pub velocity: Vec3,
    pub damage: i32,
    pub tint: LinearRgba,
}

pub struct PlayerWeapon {
    pub tuning: WeaponTuning,
    pub loadout: BulletLoadout,
    last_shot: Option<f32>,
}

impl PlayerWeapon {
    pub fn new(tuning: WeaponTuning, bus: EventBus) -> Self {
        let loadout = BulletLoadout::new(tuning.base_damage, tuning.base_speed, bus);
        Self {
            tuning,
            loadout,
            last_shot: None,
        }
    }

    pub fn can_shoot(&self, now: f32) -> bool {
        self.last_shot
            .map_or(true, |last| now - last >= self.tuning.shoot_interval)
    }

    /// Fire from `feet` towards `direction` unless the gun is still cooling down.
    pub fn try_shoot(&mut self, feet: Vec3, direction: Vec3, now: f32) -> Option<ShotRequest> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO || !self.can_shoot(now) {
            return None;
        }

        self.last_shot = Some(now);
        let stats = self.loadout.stats();
        Some(ShotRequest {
            origin: feet + Vec3::Y * self.tuning.muzzle_height,
            velocity: direction * stats.speed,
            damage: stats.damage,
            tint: stats.tint,
        })
    }
}
