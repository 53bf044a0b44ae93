//! Enemies module - movement strategies, agents, spawning and wave tracking.

mod agent;
mod data;
mod plugin;
mod registry;
mod spawner;
mod strategy;

pub use agent::*;
pub use data::*;
pub use plugin::{Enemy, EnemyPlugin, EnemyRng, SpawnArea};
pub use registry::*;
pub use spawner::*;
pub use strategy::*;
