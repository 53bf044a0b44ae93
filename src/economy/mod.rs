//! Economy module - soulstones, the player's wallet, and undoable purchases.

mod collectibles;
mod commands;
mod stones;
mod wallet;

pub use collectibles::*;
pub use commands::*;
pub use stones::*;
pub use wallet::*;
