//! Field layout of the Roguelands `PlayerPrefs.txt` save.
//!
//! Every specifier the editor reads or writes is listed here. The game owns
//! this layout; the editor only mirrors it. Specifiers are matched with a
//! leading space and a trailing separator, so none of them may contain
//! `PADDED_SEPARATOR`.

/// Separator between a specifier, its value and its type name.
pub const PADDED_SEPARATOR: &str = " : ";
/// Separator between two records.
pub const ENTRY_SEPARATOR: &str = " ; ";

pub const MAX_CHARACTERS: usize = 6;
pub const NUM_INVENTORY_SLOTS: usize = 42;
pub const NUM_COMBAT_CHIP_SLOTS: usize = 6;
pub const NUM_MOD_SLOTS: usize = 3;

// Character fields, prefixed by the character ID.
pub const NAME: &str = "name";
pub const CHARACTER_EXPERIENCE: &str = "exp";
pub const CHARACTER_LEVEL: &str = "level";

pub const COMBO_BOX_SPECIFIERS: [&str; 4] = ["race", "uniform", "augment", "variant"];
pub const SPIN_BOX_SPECIFIERS: [&str; 7] = [CHARACTER_LEVEL, "vit", "str", "dex", "tec", "mag", "fth"];

// Item fields, prefixed by character ID then slot index.
pub const ITEM_ID: &str = "id";
pub const ITEM_QUANTITY: &str = "q";
pub const ITEM_EXPERIENCE: &str = "exp";
pub const ITEM_RARITY: &str = "tier";
pub const ITEM_CORRUPTED: &str = "corrupted";
// Suffixed by the mod index.
pub const ITEM_MOD: &str = "aspect";
pub const ITEM_MOD_QUANTITY: &str = "aspectLvl";

// Prefixed by character ID, suffixed by the chip index.
pub const COMBAT_CHIP: &str = "chip";

pub const RESERVED_ITEM_IDS: &str = "ReservedItemIDs";
pub const RESERVED_CHIP_IDS: &str = "ReservedChipIDs";

pub const MIN_ITEM_LEVEL: i32 = 1;
pub const MAX_ITEM_LEVEL: i32 = 10;

/// Minimum item experience for levels 1 through 10.
#[rustfmt::skip]
pub const ITEM_LEVEL_EXPERIENCE: [i32; 10] = [
    0,   // level 1
    10,  // level 2
    30,  // level 3
    60,  // level 4
    100, // level 5
    150, // level 6
    210, // level 7
    280, // level 8
    360, // level 9
    450, // level 10
];

pub fn character_specifier(character: usize, field: &str) -> String {
    format!("{character}{field}")
}

pub fn item_specifier(character: usize, slot: usize, field: &str) -> String {
    format!("{character}{slot}{field}")
}

pub fn item_mod_specifier(character: usize, slot: usize, field: &str, mod_index: usize) -> String {
    format!("{character}{slot}{field}{mod_index}")
}

pub fn combat_chip_specifier(character: usize, chip: usize) -> String {
    format!("{character}{COMBAT_CHIP}{chip}")
}

/// Character fields shown and edited as plain values. Level is left out: the
/// game derives it from experience.
pub fn character_value_fields() -> impl Iterator<Item = &'static str> {
    [NAME, CHARACTER_EXPERIENCE]
        .into_iter()
        .chain(COMBO_BOX_SPECIFIERS)
        .chain(SPIN_BOX_SPECIFIERS)
        .filter(|&field| field != CHARACTER_LEVEL)
}

/// Highest level whose threshold `exp` reaches; anything below level 2 is level 1.
pub fn item_level_from_experience(exp: i32) -> i32 {
    ITEM_LEVEL_EXPERIENCE
        .iter()
        .rposition(|&threshold| exp >= threshold)
        .map(|index| index as i32 + MIN_ITEM_LEVEL)
        .unwrap_or(MIN_ITEM_LEVEL)
}

/// Levels outside 2..=10 fall back to the level 1 threshold.
pub fn item_experience_from_level(level: i32) -> i32 {
    if !(MIN_ITEM_LEVEL + 1..=MAX_ITEM_LEVEL).contains(&level) {
        return ITEM_LEVEL_EXPERIENCE[0];
    }
    ITEM_LEVEL_EXPERIENCE[(level - MIN_ITEM_LEVEL) as usize]
}
