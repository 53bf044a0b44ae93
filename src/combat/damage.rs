//! The capability of hurting something on contact, and the impact effects
//! left where it happens.

use std::collections::HashMap;

use bevy::log::warn;
use serde::{Deserialize, Serialize};

/// Anything that deals damage when it touches a target.
pub trait DealsDamage {
    fn damage(&self) -> i32;

    /// Name of the [`ImpactEffect`] spawned at the point of impact, if any.
    fn hit_effect(&self) -> Option<&str>;
}

/// A fired bullet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projectile {
    pub damage: i32,
    pub hit_effect: Option<String>,
}

impl Projectile {
    pub fn new(damage: i32) -> Self {
        Self {
            damage,
            hit_effect: None,
        }
    }

    pub fn with_hit_effect(mut self, effect: impl Into<String>) -> Self {
        self.hit_effect = Some(effect.into());
        self
    }
}

impl DealsDamage for Projectile {
    fn damage(&self) -> i32 {
        self.damage
    }

    fn hit_effect(&self) -> Option<&str> {
        self.hit_effect.as_deref()
    }
}

/// A short-lived flash spawned where a hit landed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactEffect {
    pub radius: f32,
    /// Seconds before the flash disappears
    pub lifetime: f32,
    /// Linear RGB
    pub color: [f32; 3],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImpactLibrary {
    effects: HashMap<String, ImpactEffect>,
}

impl ImpactLibrary {
    pub fn new(effects: HashMap<String, ImpactEffect>) -> Self {
        Self { effects }
    }

    pub fn get(&self, name: &str) -> Option<&ImpactEffect> {
        self.effects.get(name)
    }

    /// The effect `source` asks for. Unknown names are logged and skipped.
    pub fn for_hit(&self, source: &dyn DealsDamage) -> Option<&ImpactEffect> {
        let name = source.hit_effect()?;
        let effect = self.get(name);
        if effect.is_none() {
            warn!("Impact effect '{}' not found", name);
        }
        effect
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
