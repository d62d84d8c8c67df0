mod editor;
mod error;
mod types;

pub use editor::Editor;
pub use error::{CoreError, CoreErrorCode};
pub use types::{CharacterSheet, CombatChipEntry, InventoryEntry, ItemSettings};
