//! Session module - match history and the persistence boundary.

mod manager;
mod store;

pub use manager::*;
pub use store::*;
