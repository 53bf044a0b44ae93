//! Combat module - damage, bullets and the player's weapon.

mod damage;
mod plugin;
mod weapon;

pub use damage::*;
pub use plugin::{Bullet, CombatPlugin, ImpactFlash, Pickup, ShotFired};
pub use weapon::*;
