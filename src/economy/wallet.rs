//! The player's soulstone balances.

use bevy::log::{info, warn};
use serde::{Deserialize, Serialize};

use super::stones::StoneCatalog;
use crate::core::EventBus;
use crate::session::{load_ron, save_ron, PersistenceError, PersistenceService};

/// Where balances are persisted.
pub const WALLET_SAVE_PATH: &str = "player_save.ron";

/// Balance of one soulstone. Quantities are not clamped and may go negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoulstoneCache {
    pub stone_id: String,
    pub quantity: i32,
}

/// Published after a balance changed, carrying its new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoulstoneUpdated {
    pub stone: SoulstoneCache,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WalletSave {
    stones: Vec<SoulstoneCache>,
}

pub struct Wallet {
    stones: Vec<SoulstoneCache>,
    bus: EventBus,
}

impl Wallet {
    /// An empty wallet. Every lookup misses until balances are loaded.
    pub fn new(bus: EventBus) -> Self {
        Self {
            stones: Vec::new(),
            bus,
        }
    }

    /// One zero balance per stone in the catalog.
    pub fn with_balances(bus: EventBus, catalog: &StoneCatalog) -> Self {
        let mut wallet = Self::new(bus);
        wallet.fill_missing(catalog);
        wallet
    }

    /// Add `delta` to the balance of `stone_id` and announce the new value.
    ///
    /// Returns false, changing nothing, when the wallet holds no such stone.
    pub fn update_amount(&mut self, stone_id: &str, delta: i32) -> bool {
        let Some(cache) = self.stones.iter_mut().find(|c| c.stone_id == stone_id) else {
            warn!("Soulstone '{}' not found in wallet", stone_id);
            return false;
        };

        // Wrapping keeps every command exactly undoable at the i32 edges.
        cache.quantity = cache.quantity.wrapping_add(delta);
        let stone = cache.clone();
        self.bus.publish(SoulstoneUpdated { stone });
        true
    }

    /// Current balance, or 0 for an unknown stone.
    pub fn amount(&self, stone_id: &str) -> i32 {
        self.stones
            .iter()
            .find(|c| c.stone_id == stone_id)
            .map_or(0, |c| c.quantity)
    }

    pub fn stones(&self) -> &[SoulstoneCache] {
        &self.stones
    }

    pub fn save(&self, store: &dyn PersistenceService) -> Result<(), PersistenceError> {
        let save = WalletSave {
            stones: self.stones.clone(),
        };
        save_ron(store, WALLET_SAVE_PATH, &save)
    }

    /// Replace balances with the saved ones. Stones without a saved balance
    /// start at zero.
    pub fn load(
        &mut self,
        store: &dyn PersistenceService,
        catalog: &StoneCatalog,
    ) -> Result<(), PersistenceError> {
        match load_ron::<WalletSave>(store, WALLET_SAVE_PATH)? {
            Some(save) => {
                info!("Loaded {} soulstone balances", save.stones.len());
                self.stones = save.stones;
            }
            None => {
                info!("No saved soulstones, starting fresh");
                self.stones.clear();
            }
        }
        self.fill_missing(catalog);
        Ok(())
    }

    fn fill_missing(&mut self, catalog: &StoneCatalog) {
        for definition in catalog.iter() {
            if !self.stones.iter().any(|c| c.stone_id == definition.id) {
                self.stones.push(SoulstoneCache {
                    stone_id: definition.id.clone(),
                    quantity: 0,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::economy::{StoneDefinition, StoneKind, StoneRarity};
    use crate::session::MemoryStore;

    fn catalog() -> StoneCatalog {
        StoneCatalog::new(["ember", "frost"].map(|id| StoneDefinition {
            id: id.to_string(),
            name: id.to_uppercase(),
            kind: StoneKind::Upgrade,
            rarity: StoneRarity::Normal,
        }))
    }

    #[test]
    fn update_adjusts_balance_and_publishes_new_value() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe_fn(move |e: &SoulstoneUpdated| sink.lock().unwrap().push(e.stone.clone()));

        let mut wallet = Wallet::with_balances(bus, &catalog());
        assert!(wallet.update_amount("ember", 5));
        assert!(wallet.update_amount("ember", -8));

        assert_eq!(wallet.amount("ember"), -3);
        let quantities: Vec<i32> = seen.lock().unwrap().iter().map(|s| s.quantity).collect();
        assert_eq!(quantities, vec![5, -3]);
    }

    #[test]
    fn unknown_stone_is_a_silent_miss() {
        let bus = EventBus::new();
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        bus.subscribe_fn(move |_: &SoulstoneUpdated| *counter.lock().unwrap() += 1);

        let mut wallet = Wallet::with_balances(bus, &catalog());

        assert!(!wallet.update_amount("void", 10));
        assert_eq!(wallet.amount("void"), 0);
        assert_eq!(*count.lock().unwrap(), 0);
    }

    #[test]
    fn balances_survive_save_and_load() {
        let store = MemoryStore::new();
        let mut wallet = Wallet::with_balances(EventBus::new(), &catalog());
        wallet.update_amount("frost", 12);
        wallet.save(&store).unwrap();

        let mut restored = Wallet::new(EventBus::new());
        restored.load(&store, &catalog()).unwrap();

        assert_eq!(restored.amount("frost"), 12);
        assert_eq!(restored.stones().len(), 2);
    }

    #[test]
    fn loading_without_a_save_starts_every_stone_at_zero() {
        let mut wallet = Wallet::new(EventBus::new());
        wallet.load(&MemoryStore::new(), &catalog()).unwrap();

        assert!(wallet.stones().iter().all(|c| c.quantity == 0));
        assert_eq!(wallet.stones().len(), 2);
    }
}
