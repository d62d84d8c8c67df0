use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::catalog::{
    self, CHARACTER_LEVEL, ITEM_CORRUPTED, ITEM_EXPERIENCE, ITEM_ID, ITEM_MOD,
    ITEM_MOD_QUANTITY, ITEM_QUANTITY, ITEM_RARITY, MAX_CHARACTERS, MIN_ITEM_LEVEL, NAME,
    NUM_COMBAT_CHIP_SLOTS, NUM_INVENTORY_SLOTS, NUM_MOD_SLOTS, character_specifier,
    character_value_fields, combat_chip_specifier, item_mod_specifier, item_specifier,
};
use crate::config::EditorConfig;
use crate::document::SaveDocument;
use crate::reserved::{ReservedKind, ReservedRegistry};

use super::error::{CoreError, CoreErrorCode};
use super::types::{CharacterSheet, CombatChipEntry, InventoryEntry, ItemSettings};

/// Owns one loaded save and the per-character projections built from it.
///
/// The projections are caches of the document. Every write goes through the
/// document first and then updates the matching cache entry.
#[derive(Debug)]
pub struct Editor {
    document: SaveDocument,
    reserved: ReservedRegistry,
    values_character: Option<usize>,
    items_character: Option<usize>,
    character_values: BTreeMap<String, String>,
    inventory: [i32; NUM_INVENTORY_SLOTS],
    combat_chips: [i32; NUM_COMBAT_CHIP_SLOTS],
    item_settings: [ItemSettings; NUM_INVENTORY_SLOTS],
}

impl Editor {
    pub fn open(config: &EditorConfig) -> Result<Self, CoreError> {
        let files = config.resolve_files()?;
        SaveDocument::open_files(files).map(Self::from_document)
    }

    pub fn open_path(path: &Path) -> Result<Self, CoreError> {
        SaveDocument::open(path).map(Self::from_document)
    }

    pub fn from_document(document: SaveDocument) -> Self {
        let reserved = ReservedRegistry::from_document(&document);
        Self {
            document,
            reserved,
            values_character: None,
            items_character: None,
            character_values: BTreeMap::new(),
            inventory: [0; NUM_INVENTORY_SLOTS],
            combat_chips: [0; NUM_COMBAT_CHIP_SLOTS],
            item_settings: std::array::from_fn(|_| ItemSettings::default()),
        }
    }

    pub fn document(&self) -> &SaveDocument {
        &self.document
    }

    pub fn reserved(&self) -> &ReservedRegistry {
        &self.reserved
    }

    pub fn current_character(&self) -> Option<usize> {
        self.values_character.or(self.items_character)
    }

    pub fn character_values(&self) -> &BTreeMap<String, String> {
        &self.character_values
    }

    pub fn inventory(&self) -> &[i32; NUM_INVENTORY_SLOTS] {
        &self.inventory
    }

    pub fn combat_chips(&self) -> &[i32; NUM_COMBAT_CHIP_SLOTS] {
        &self.combat_chips
    }

    pub fn item_settings(&self) -> &[ItemSettings; NUM_INVENTORY_SLOTS] {
        &self.item_settings
    }

    pub fn load_value(&self, specifier: &str) -> String {
        self.document.get(specifier)
    }

    pub fn replace_value(
        &mut self,
        specifier: &str,
        old_value: &str,
        new_value: &str,
    ) -> Result<(), CoreError> {
        self.document.set(specifier, old_value, new_value)
    }

    pub fn save(&mut self) -> Result<(), CoreError> {
        self.document.persist()
    }

    pub fn calculate_item_level_from_experience(exp: i32) -> i32 {
        catalog::item_level_from_experience(exp)
    }

    pub fn calculate_item_experience_from_level(level: i32) -> i32 {
        catalog::item_experience_from_level(level)
    }

    pub fn reserved_name(&self, id: i32, kind: ReservedKind) -> Option<String> {
        self.reserved.name_for(id, kind)
    }

    pub fn reserved_id(&self, name: &str, kind: ReservedKind) -> Result<Option<i32>, CoreError> {
        self.reserved.id_for(name, kind)
    }

    /// Names of every character slot; empty strings mark unused slots.
    pub fn load_character_names(&self) -> [String; MAX_CHARACTERS] {
        std::array::from_fn(|character| self.document.get(&character_specifier(character, NAME)))
    }

    /// Rebuilds `character_values` for `character`. Level is not read: it is
    /// derived from experience.
    pub fn load_character_values(&mut self, character: usize) -> Result<(), CoreError> {
        check_index("character", character, MAX_CHARACTERS)?;

        let mut values = BTreeMap::new();
        for field in character_value_fields() {
            values.insert(
                field.to_string(),
                self.document.get(&character_specifier(character, field)),
            );
        }

        debug!(character, fields = values.len(), "loaded character values");
        self.character_values = values;
        if self.items_character != Some(character) {
            self.items_character = None;
        }
        self.values_character = Some(character);
        Ok(())
    }

    /// Rebuilds inventory, item settings and combat chips for `character`.
    /// Nothing is replaced unless every ID parses.
    pub fn load_character_item_browser(&mut self, character: usize) -> Result<(), CoreError> {
        check_index("character", character, MAX_CHARACTERS)?;

        let mut inventory = [0; NUM_INVENTORY_SLOTS];
        let mut item_settings: [ItemSettings; NUM_INVENTORY_SLOTS] =
            std::array::from_fn(|_| ItemSettings::default());
        for slot in 0..NUM_INVENTORY_SLOTS {
            inventory[slot] = self.required_int(&item_specifier(character, slot, ITEM_ID))?;
            item_settings[slot] = self.read_item_settings(character, slot);
        }

        let mut combat_chips = [0; NUM_COMBAT_CHIP_SLOTS];
        for (chip, id) in combat_chips.iter_mut().enumerate() {
            *id = self.required_int(&combat_chip_specifier(character, chip))?;
        }

        debug!(character, "loaded item browser");
        self.inventory = inventory;
        self.item_settings = item_settings;
        self.combat_chips = combat_chips;
        if self.values_character != Some(character) {
            self.values_character = None;
        }
        self.items_character = Some(character);
        Ok(())
    }

    /// Writes a character field (`name`, `exp`, a combo or spin box field).
    pub fn set_character_value(&mut self, field: &str, value: &str) -> Result<(), CoreError> {
        if field == CHARACTER_LEVEL {
            return Err(CoreError::new(
                CoreErrorCode::UnsupportedOperation,
                "character level is derived from experience and cannot be written",
            ));
        }
        if !character_value_fields().any(|known| known == field) {
            return Err(CoreError::new(
                CoreErrorCode::UnsupportedOperation,
                format!("{field:?} is not an editable character field"),
            ));
        }
        let character = self.require_character()?;
        self.rewrite(&character_specifier(character, field), value)?;

        if self.values_character == Some(character) {
            self.character_values
                .insert(field.to_string(), value.to_string());
        }
        Ok(())
    }

    pub fn set_inventory_item(&mut self, slot: usize, id: i32) -> Result<(), CoreError> {
        check_index("inventory slot", slot, NUM_INVENTORY_SLOTS)?;
        let character = self.require_items()?;
        self.rewrite(&item_specifier(character, slot, ITEM_ID), &id.to_string())?;
        self.inventory[slot] = id;
        Ok(())
    }

    pub fn set_combat_chip(&mut self, slot: usize, id: i32) -> Result<(), CoreError> {
        check_index("combat chip slot", slot, NUM_COMBAT_CHIP_SLOTS)?;
        let character = self.require_items()?;
        self.rewrite(&combat_chip_specifier(character, slot), &id.to_string())?;
        self.combat_chips[slot] = id;
        Ok(())
    }

    /// Writes only the fields of `settings` that differ from the loaded slot,
    /// all together or not at all.
    pub fn set_item_settings(
        &mut self,
        slot: usize,
        settings: &ItemSettings,
    ) -> Result<(), CoreError> {
        check_index("inventory slot", slot, NUM_INVENTORY_SLOTS)?;
        let character = self.require_items()?;

        let current = item_fields(character, slot, &self.item_settings[slot]);
        let wanted = item_fields(character, slot, settings);
        let changed: Vec<_> = current
            .iter()
            .zip(&wanted)
            .filter(|((_, old_value), (_, new_value))| old_value != new_value)
            .map(|((specifier, old_value), (_, new_value))| {
                (specifier.as_str(), old_value.as_str(), new_value.as_str())
            })
            .collect();
        if changed.is_empty() {
            return Ok(());
        }

        self.document.set_many(changed)?;
        self.item_settings[slot] = self.read_item_settings(character, slot);
        Ok(())
    }

    /// Stores the minimum experience for `level` as the slot's item experience.
    pub fn set_item_level(&mut self, slot: usize, level: i32) -> Result<(), CoreError> {
        check_index("inventory slot", slot, NUM_INVENTORY_SLOTS)?;
        let mut settings = self.item_settings[slot].clone();
        settings.exp = catalog::item_experience_from_level(level).to_string();
        self.set_item_settings(slot, &settings)
    }

    pub fn resolved_inventory(&self) -> Vec<InventoryEntry> {
        self.inventory
            .iter()
            .zip(&self.item_settings)
            .enumerate()
            .map(|(slot, (&id, settings))| InventoryEntry {
                slot,
                id,
                reserved_name: self.reserved.name_for(id, ReservedKind::Item),
                level: settings
                    .exp
                    .parse()
                    .map(catalog::item_level_from_experience)
                    .unwrap_or(MIN_ITEM_LEVEL),
                settings: settings.clone(),
            })
            .collect()
    }

    pub fn resolved_combat_chips(&self) -> Vec<CombatChipEntry> {
        self.combat_chips
            .iter()
            .enumerate()
            .map(|(slot, &id)| CombatChipEntry {
                slot,
                id,
                reserved_name: self.reserved.name_for(id, ReservedKind::Chip),
            })
            .collect()
    }

    /// Both projections of the current character, ready for serialization.
    pub fn character_sheet(&self) -> Result<CharacterSheet, CoreError> {
        let character = self.require_character()?;
        if self.items_character != Some(character) {
            return Err(CoreError::new(
                CoreErrorCode::UnsupportedOperation,
                format!("item browser for character {character} has not been loaded"),
            ));
        }

        Ok(CharacterSheet {
            character,
            values: self.character_values.clone(),
            inventory: self.resolved_inventory(),
            combat_chips: self.resolved_combat_chips(),
        })
    }

    fn read_item_settings(&self, character: usize, slot: usize) -> ItemSettings {
        let get = |field| self.document.get(&item_specifier(character, slot, field));
        let get_mod =
            |field, index| self.document.get(&item_mod_specifier(character, slot, field, index));

        ItemSettings {
            quantity: get(ITEM_QUANTITY),
            exp: get(ITEM_EXPERIENCE),
            rarity: get(ITEM_RARITY),
            corrupted: get(ITEM_CORRUPTED),
            mods: std::array::from_fn(|index| get_mod(ITEM_MOD, index)),
            mod_quantities: std::array::from_fn(|index| get_mod(ITEM_MOD_QUANTITY, index)),
        }
    }

    fn required_int(&self, specifier: &str) -> Result<i32, CoreError> {
        let raw = self.document.get(specifier);
        raw.parse().map_err(|e| {
            CoreError::new(
                CoreErrorCode::Parse,
                format!("field {specifier} is not an integer ({raw:?}): {e}"),
            )
        })
    }

    fn rewrite(&mut self, specifier: &str, new_value: &str) -> Result<(), CoreError> {
        let old_value = self.document.find(specifier).map(str::to_string).ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::FieldNotFound,
                format!("no record for {specifier}"),
            )
        })?;
        self.document.set(specifier, &old_value, new_value)
    }

    fn require_character(&self) -> Result<usize, CoreError> {
        self.current_character().ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::UnsupportedOperation,
                "no character has been loaded",
            )
        })
    }

    fn require_items(&self) -> Result<usize, CoreError> {
        self.items_character.ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::UnsupportedOperation,
                "no item browser has been loaded",
            )
        })
    }
}

fn check_index(kind: &str, index: usize, limit: usize) -> Result<(), CoreError> {
    if index >= limit {
        return Err(CoreError::unknown_slot(kind, index, limit));
    }
    Ok(())
}

// Specifier/value pairs in a fixed order, so two settings can be zipped.
fn item_fields(character: usize, slot: usize, settings: &ItemSettings) -> Vec<(String, String)> {
    let mut fields = vec![
        (item_specifier(character, slot, ITEM_QUANTITY), settings.quantity.clone()),
        (item_specifier(character, slot, ITEM_EXPERIENCE), settings.exp.clone()),
        (item_specifier(character, slot, ITEM_RARITY), settings.rarity.clone()),
        (item_specifier(character, slot, ITEM_CORRUPTED), settings.corrupted.clone()),
    ];
    for index in 0..NUM_MOD_SLOTS {
        fields.push((
            item_mod_specifier(character, slot, ITEM_MOD, index),
            settings.mods[index].clone(),
        ));
        fields.push((
            item_mod_specifier(character, slot, ITEM_MOD_QUANTITY, index),
            settings.mod_quantities[index].clone(),
        ));
    }
    fields
}
