//! Soulstone definitions - the currencies the player collects.

use std::collections::HashMap;

use bevy::log::warn;
use serde::{Deserialize, Serialize};

/// What a stone is spent on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StoneKind {
    #[default]
    Upgrade,
    Unlocking,
    Crafting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StoneRarity {
    #[default]
    Normal,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Special,
}

/// Static description of one soulstone, loaded from the arena config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoneDefinition {
    /// Unique key, e.g. "ember"
    pub id: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub kind: StoneKind,
    #[serde(default)]
    pub rarity: StoneRarity,
}

/// Every stone the game knows about, in definition order.
#[derive(Debug, Clone, Default)]
pub struct StoneCatalog {
    stones: Vec<StoneDefinition>,
    index: HashMap<String, usize>,
}

impl StoneCatalog {
    /// Build a catalog. When two definitions share an id the first one wins.
    pub fn new(definitions: impl IntoIterator<Item = StoneDefinition>) -> Self {
        let mut catalog = Self::default();
        for definition in definitions {
            if catalog.index.contains_key(&definition.id) {
                warn!("Duplicate soulstone id '{}' ignored", definition.id);
                continue;
            }
            catalog.index.insert(definition.id.clone(), catalog.stones.len());
            catalog.stones.push(definition);
        }
        catalog
    }

    pub fn get(&self, id: &str) -> Option<&StoneDefinition> {
        self.index.get(id).map(|&i| &self.stones[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoneDefinition> {
        self.stones.iter()
    }

    pub fn len(&self) -> usize {
        self.stones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stones.is_empty()
    }
}
