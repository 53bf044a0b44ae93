//! Player module - locomotion states, controller and input.

mod controller;
mod plugin;
mod states;

pub use controller::*;
pub use plugin::{Player, PlayerPlugin};
pub use states::*;
