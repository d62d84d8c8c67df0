use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::NUM_MOD_SLOTS;

/// One inventory slot's editable attributes, kept in their stored text form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemSettings {
    pub quantity: String,
    pub exp: String,
    pub rarity: String,
    pub corrupted: String,
    pub mods: [String; NUM_MOD_SLOTS],
    pub mod_quantities: [String; NUM_MOD_SLOTS],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InventoryEntry {
    pub slot: usize,
    pub id: i32,
    pub reserved_name: Option<String>,
    pub level: i32,
    pub settings: ItemSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CombatChipEntry {
    pub slot: usize,
    pub id: i32,
    pub reserved_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CharacterSheet {
    pub character: usize,
    pub values: BTreeMap<String, String>,
    pub inventory: Vec<InventoryEntry>,
    pub combat_chips: Vec<CombatChipEntry>,
}
