//! Things the player can walk over and pick up.
//!
//! A collectible only knows how to present itself to a [`PlayerVisitor`]; what
//! collecting it means is decided by whoever visits.

use bevy::log::info;
use serde::{Deserialize, Serialize};

use super::wallet::Wallet;

pub trait PlayerVisitor {
    fn visit_soulstone(&mut self, pickup: &SoulstonePickup);

    fn visit_power_up(&mut self, pickup: &PowerUpPickup);
}

pub trait Collectible {
    fn accept(&self, visitor: &mut dyn PlayerVisitor);
}

/// A stack of soulstones, usually dropped by a destroyed enemy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoulstonePickup {
    pub stone_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

impl Collectible for SoulstonePickup {
    fn accept(&self, visitor: &mut dyn PlayerVisitor) {
        visitor.visit_soulstone(self);
    }
}

/// A power-up. Collecting one is acknowledged but has no gameplay effect yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpPickup {
    pub name: String,
}

impl Collectible for PowerUpPickup {
    fn accept(&self, visitor: &mut dyn PlayerVisitor) {
        visitor.visit_power_up(self);
    }
}

/// Any collectible lying in the arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Loot {
    Soulstone(SoulstonePickup),
    PowerUp(PowerUpPickup),
}

impl Collectible for Loot {
    fn accept(&self, visitor: &mut dyn PlayerVisitor) {
        match self {
            Loot::Soulstone(pickup) => pickup.accept(visitor),
            Loot::PowerUp(pickup) => pickup.accept(visitor),
        }
    }
}

impl PlayerVisitor for Wallet {
    fn visit_soulstone(&mut self, pickup: &SoulstonePickup) {
        self.update_amount(&pickup.stone_id, pickup.quantity);
    }

    fn visit_power_up(&mut self, pickup: &PowerUpPickup) {
        info!("Picked up power-up '{}'", pickup.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EventBus;
    use crate::economy::{StoneCatalog, StoneDefinition, StoneKind, StoneRarity};

    #[derive(Default)]
    struct Tally {
        stones: i32,
        power_ups: Vec<String>,
    }

    impl PlayerVisitor for Tally {
        fn visit_soulstone(&mut self, pickup: &SoulstonePickup) {
            self.stones += pickup.quantity;
        }

        fn visit_power_up(&mut self, pickup: &PowerUpPickup) {
            self.power_ups.push(pickup.name.clone());
        }
    }

    #[test]
    fn loot_dispatches_to_the_matching_visit() {
        let mut tally = Tally::default();
        let drops = [
            Loot::Soulstone(SoulstonePickup {
                stone_id: "ember".into(),
                quantity: 3,
            }),
            Loot::PowerUp(PowerUpPickup {
                name: "haste".into(),
            }),
            Loot::Soulstone(SoulstonePickup {
                stone_id: "ember".into(),
                quantity: 2,
            }),
        ];

        for drop in &drops {
            drop.accept(&mut tally);
        }

        assert_eq!(tally.stones, 5);
        assert_eq!(tally.power_ups, vec!["haste"]);
    }

    #[test]
    fn wallet_credits_collected_soulstones() {
        let catalog = StoneCatalog::new([StoneDefinition {
            id: "ember".into(),
            name: "Ember".into(),
            kind: StoneKind::Upgrade,
            rarity: StoneRarity::Normal,
        }]);
        let mut wallet = Wallet::with_balances(EventBus::new(), &catalog);

        SoulstonePickup {
            stone_id: "ember".into(),
            quantity: 4,
        }
        .accept(&mut wallet);

        assert_eq!(wallet.amount("ember"), 4);
    }

    #[test]
    fn pickup_quantity_defaults_to_one() {
        let pickup: SoulstonePickup = ron::from_str(r#"(stone_id: "ember")"#).unwrap();
        assert_eq!(pickup.quantity, 1);
    }
}
