//! GadgetCore reserved ID lists.
//!
//! Mods register their items and combat chips in two save fields,
//! `ReservedItemIDs` and `ReservedChipIDs`, each a comma separated list of
//! `Mod\:Name=ID` entries. Saves written before any mod was installed have no
//! such fields, which leaves the registry empty.

use tracing::warn;

use crate::catalog::{RESERVED_CHIP_IDS, RESERVED_ITEM_IDS};
use crate::core_api::{CoreError, CoreErrorCode};
use crate::document::SaveDocument;

const LIST_SEPARATOR: char = ',';
const NAME_SEPARATOR: char = ':';
const ID_SEPARATOR: char = '=';
const ESCAPE: char = '\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedKind {
    Item,
    Chip,
}

impl ReservedKind {
    pub fn specifier(self) -> &'static str {
        match self {
            Self::Item => RESERVED_ITEM_IDS,
            Self::Chip => RESERVED_CHIP_IDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedEntry {
    /// Text before the first colon, escape removed.
    pub display_name_prefix: String,
    /// From the first colon up to `=`; empty when the name has no colon.
    pub colon_tail: String,
    /// Name exactly as encoded in the save.
    pub encoded_name: String,
    /// Text after `=`, unparsed.
    pub id_tail: String,
}

impl ReservedEntry {
    pub fn parse(raw: &str) -> Option<Self> {
        let (encoded_name, id_tail) = raw.split_once(ID_SEPARATOR)?;

        let (display_name_prefix, colon_tail) = match encoded_name.find(NAME_SEPARATOR) {
            Some(colon) => {
                let prefix = &encoded_name[..colon];
                (
                    prefix.strip_suffix(ESCAPE).unwrap_or(prefix),
                    &encoded_name[colon..],
                )
            }
            None => (encoded_name, ""),
        };

        Some(Self {
            display_name_prefix: display_name_prefix.to_string(),
            colon_tail: colon_tail.to_string(),
            encoded_name: encoded_name.to_string(),
            id_tail: id_tail.to_string(),
        })
    }

    /// Entries without a colon can still be found by name, but have no
    /// display name and never show up in `name_for` or `display_names`.
    pub fn has_display_name(&self) -> bool {
        !self.colon_tail.is_empty()
    }

    pub fn display_name(&self) -> String {
        format!("{}{}", self.display_name_prefix, self.colon_tail)
    }

    pub fn numeric_id(&self) -> Result<i32, CoreError> {
        self.id_tail.parse().map_err(|e| {
            CoreError::new(
                CoreErrorCode::Parse,
                format!(
                    "reserved entry {:?} has non-numeric ID {:?}: {e}",
                    self.encoded_name, self.id_tail
                ),
            )
        })
    }

    fn matches_name(&self, name: &str) -> bool {
        self.encoded_name == name || self.encoded_name == escape_name(name)
    }
}

/// Splits a raw reserved list. Empty input yields no entries.
pub fn parse_reserved_list(raw: &str) -> Vec<ReservedEntry> {
    raw.split(LIST_SEPARATOR)
        .filter(|item| !item.is_empty())
        .filter_map(|item| {
            let entry = ReservedEntry::parse(item);
            if entry.is_none() {
                warn!(entry = item, "skipping reserved ID entry without '='");
            }
            entry
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservedRegistry {
    items: Vec<ReservedEntry>,
    chips: Vec<ReservedEntry>,
}

impl ReservedRegistry {
    pub fn new(items: Vec<ReservedEntry>, chips: Vec<ReservedEntry>) -> Self {
        Self { items, chips }
    }

    pub fn from_document(document: &SaveDocument) -> Self {
        Self::new(
            parse_reserved_list(&document.get(ReservedKind::Item.specifier())),
            parse_reserved_list(&document.get(ReservedKind::Chip.specifier())),
        )
    }

    pub fn entries(&self, kind: ReservedKind) -> &[ReservedEntry] {
        match kind {
            ReservedKind::Item => &self.items,
            ReservedKind::Chip => &self.chips,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.chips.is_empty()
    }

    /// Names to append after the built-in item or chip list, in save order.
    pub fn display_names(&self, kind: ReservedKind) -> Vec<String> {
        self.entries(kind)
            .iter()
            .filter(|entry| entry.has_display_name())
            .map(ReservedEntry::display_name)
            .collect()
    }

    /// Display name of the first entry registered under `id`.
    pub fn name_for(&self, id: i32, kind: ReservedKind) -> Option<String> {
        let id = id.to_string();
        self.entries(kind)
            .iter()
            .find(|entry| entry.has_display_name() && entry.id_tail == id)
            .map(ReservedEntry::display_name)
    }

    /// ID of the first entry registered under `name`. A matching entry with a
    /// malformed ID is an error rather than a miss.
    pub fn id_for(&self, name: &str, kind: ReservedKind) -> Result<Option<i32>, CoreError> {
        self.entries(kind)
            .iter()
            .find(|entry| entry.matches_name(name))
            .map(ReservedEntry::numeric_id)
            .transpose()
    }
}

// Only the first colon is escaped; that is the mod/name boundary.
fn escape_name(name: &str) -> String {
    match name.find(NAME_SEPARATOR) {
        Some(colon) => format!("{}{ESCAPE}{}", &name[..colon], &name[colon..]),
        None => name.to_string(),
    }
}
