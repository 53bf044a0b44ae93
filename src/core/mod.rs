//! Core game module - event bus, game flow, and the engine boundaries.
//!
//! This module provides the foundation that all other game systems build upon.

mod bus;
mod error;
mod events;
mod flow;
mod plugin;
mod services;
mod states;

pub use bus::*;
pub use error::*;
pub use events::*;
pub use flow::*;
pub use plugin::*;
pub use services::*;
pub use states::*;
