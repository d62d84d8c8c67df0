use std::path::PathBuf;
use std::process;

use clap::Parser;
use rogue_core::catalog::MAX_CHARACTERS;
use rogue_core::config::EditorConfig;
use rogue_core::core_api::{CombatChipEntry, Editor, InventoryEntry};
use rogue_core::reserved::{ReservedEntry, ReservedKind};
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Save file; derived from the current user when omitted.
    #[arg(value_name = "PlayerPrefs.txt")]
    path: Option<PathBuf>,
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[arg(long, short = 'c', value_name = "0-5")]
    character: Option<usize>,
    #[arg(long)]
    names: bool,
    #[arg(long)]
    values: bool,
    #[arg(long)]
    inventory: bool,
    #[arg(long)]
    chips: bool,
    #[arg(long)]
    reserved: bool,
    #[arg(long = "get", value_name = "SPECIFIER")]
    get: Vec<String>,
    #[arg(long)]
    json: bool,
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_field_assignment)]
    set: Vec<(String, String)>,
    #[arg(long = "set-item", value_name = "SLOT=ID", value_parser = parse_slot_assignment, allow_hyphen_values = true)]
    set_item: Vec<(usize, i32)>,
    #[arg(long = "set-item-level", value_name = "SLOT=LEVEL", value_parser = parse_slot_assignment)]
    set_item_level: Vec<(usize, i32)>,
    #[arg(long = "set-chip", value_name = "SLOT=ID", value_parser = parse_slot_assignment, allow_hyphen_values = true)]
    set_chip: Vec<(usize, i32)>,
}

#[derive(Debug, Default, Clone, Copy)]
struct FieldSelection {
    names: bool,
    values: bool,
    inventory: bool,
    chips: bool,
    reserved: bool,
}

impl FieldSelection {
    fn from_cli(cli: &Cli) -> Self {
        let selection = Self {
            names: cli.names,
            values: cli.values,
            inventory: cli.inventory,
            chips: cli.chips,
            reserved: cli.reserved,
        };
        if selection.is_any_selected() || !cli.get.is_empty() {
            return selection;
        }

        // Nothing requested: a character sheet when a character is given,
        // otherwise the character list.
        match cli.character {
            Some(_) => Self {
                values: true,
                inventory: true,
                chips: true,
                ..selection
            },
            None => Self {
                names: true,
                ..selection
            },
        }
    }

    fn is_any_selected(&self) -> bool {
        self.names || self.values || self.inventory || self.chips || self.reserved
    }

    fn needs_character(&self) -> bool {
        self.values || self.inventory || self.chips
    }

    fn selected_pairs(&self, editor: &Editor, get: &[String]) -> Vec<(String, String)> {
        let mut out = Vec::new();

        if self.names {
            for (index, name) in editor.load_character_names().iter().enumerate() {
                if !name.is_empty() {
                    out.push((format!("names.{index}"), name.clone()));
                }
            }
        }
        for specifier in get {
            out.push((specifier.clone(), editor.load_value(specifier)));
        }
        if self.values {
            for (field, value) in editor.character_values() {
                out.push((field.clone(), value.clone()));
            }
        }
        if self.inventory {
            for item in editor.resolved_inventory().iter().filter(|item| item.id != 0) {
                out.push((format!("slot.{}", item.slot), format_item(item)));
            }
        }
        if self.chips {
            for chip in editor.resolved_combat_chips().iter().filter(|chip| chip.id != 0) {
                out.push((format!("chip.{}", chip.slot), format_chip(chip)));
            }
        }
        if self.reserved {
            for (label, kind) in [("item", ReservedKind::Item), ("chip", ReservedKind::Chip)] {
                for entry in editor.reserved().entries(kind) {
                    out.push((
                        format!("reserved_{label}.{}", entry.id_tail),
                        entry.display_name(),
                    ));
                }
            }
        }

        out
    }

    fn selected_json(&self, editor: &Editor, get: &[String]) -> JsonMap<String, JsonValue> {
        let mut out = JsonMap::new();

        if self.names {
            out.insert(
                "names".to_string(),
                JsonValue::Array(
                    editor
                        .load_character_names()
                        .into_iter()
                        .map(JsonValue::String)
                        .collect(),
                ),
            );
        }
        if !get.is_empty() {
            let values = get
                .iter()
                .map(|specifier| {
                    (
                        specifier.clone(),
                        JsonValue::String(editor.load_value(specifier)),
                    )
                })
                .collect();
            out.insert("get".to_string(), JsonValue::Object(values));
        }
        if self.values {
            out.insert(
                "values".to_string(),
                JsonValue::Object(
                    editor
                        .character_values()
                        .iter()
                        .map(|(field, value)| (field.clone(), JsonValue::String(value.clone())))
                        .collect(),
                ),
            );
        }
        if self.inventory {
            out.insert(
                "inventory".to_string(),
                to_json(&editor.resolved_inventory()),
            );
        }
        if self.chips {
            out.insert(
                "chips".to_string(),
                to_json(&editor.resolved_combat_chips()),
            );
        }
        if self.reserved {
            let mut reserved = JsonMap::new();
            reserved.insert(
                "items".to_string(),
                reserved_to_json(editor.reserved().entries(ReservedKind::Item)),
            );
            reserved.insert(
                "chips".to_string(),
                reserved_to_json(editor.reserved().entries(ReservedKind::Chip)),
            );
            out.insert("reserved".to_string(), JsonValue::Object(reserved));
        }

        out
    }
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let fields = FieldSelection::from_cli(&cli);
    let has_item_edits =
        !cli.set_item.is_empty() || !cli.set_item_level.is_empty() || !cli.set_chip.is_empty();
    let has_edits = !cli.set.is_empty() || has_item_edits;

    if (has_edits || fields.needs_character()) && cli.character.is_none() {
        eprintln!("--set*, --values, --inventory and --chips require --character <0-5>");
        process::exit(2);
    }
    if let Some(character) = cli.character
        && character >= MAX_CHARACTERS
    {
        eprintln!(
            "invalid character {character}, expected 0..{}",
            MAX_CHARACTERS - 1
        );
        process::exit(2);
    }

    let mut config = match &cli.config {
        Some(path) => EditorConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Error loading config {}: {e}", path.display());
            process::exit(1);
        }),
        None => EditorConfig::default(),
    };
    if let Some(path) = &cli.path {
        config = config.with_save_path(path);
    }

    let mut editor = Editor::open(&config).unwrap_or_else(|e| {
        eprintln!("Error opening save file");
        eprintln!("  {e}");
        process::exit(1);
    });

    if let Some(character) = cli.character {
        editor.load_character_values(character).unwrap_or_else(|e| {
            eprintln!("Error loading character {character}: {e}");
            process::exit(1);
        });
        if has_item_edits || fields.inventory || fields.chips {
            editor
                .load_character_item_browser(character)
                .unwrap_or_else(|e| {
                    eprintln!("Error loading items of character {character}: {e}");
                    process::exit(1);
                });
        }
    }

    if has_edits {
        apply_edits(&mut editor, &cli);
        editor.save().unwrap_or_else(|e| {
            eprintln!("Error saving: {e}");
            process::exit(1);
        });
        debug!("edits saved");
    }

    if cli.json {
        let json = fields.selected_json(&editor, &cli.get);
        match serde_json::to_string_pretty(&JsonValue::Object(json)) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error rendering JSON: {e}");
                process::exit(1);
            }
        }
    } else {
        for (key, value) in fields.selected_pairs(&editor, &cli.get) {
            println!("{key}={value}");
        }
    }
}

fn apply_edits(editor: &mut Editor, cli: &Cli) {
    for (field, value) in &cli.set {
        editor.set_character_value(field, value).unwrap_or_else(|e| {
            eprintln!("Error applying {field} edit: {e}");
            process::exit(1);
        });
    }
    for &(slot, id) in &cli.set_item {
        editor.set_inventory_item(slot, id).unwrap_or_else(|e| {
            eprintln!("Error applying item edit for slot {slot}: {e}");
            process::exit(1);
        });
    }
    for &(slot, level) in &cli.set_item_level {
        editor.set_item_level(slot, level).unwrap_or_else(|e| {
            eprintln!("Error applying item level edit for slot {slot}: {e}");
            process::exit(1);
        });
    }
    for &(slot, id) in &cli.set_chip {
        editor.set_combat_chip(slot, id).unwrap_or_else(|e| {
            eprintln!("Error applying combat chip edit for slot {slot}: {e}");
            process::exit(1);
        });
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn parse_field_assignment(value: &str) -> Result<(String, String), String> {
    let (field, assigned) = value
        .split_once('=')
        .ok_or_else(|| format!("invalid assignment '{value}', expected FIELD=VALUE"))?;
    if field.is_empty() {
        return Err(format!("invalid assignment '{value}', field name is empty"));
    }
    Ok((field.to_string(), assigned.to_string()))
}

fn parse_slot_assignment(value: &str) -> Result<(usize, i32), String> {
    let (slot, number) = value
        .split_once('=')
        .ok_or_else(|| format!("invalid assignment '{value}', expected SLOT=NUMBER"))?;
    let slot = slot
        .parse()
        .map_err(|e| format!("invalid slot '{slot}': {e}"))?;
    let number = number
        .parse()
        .map_err(|e| format!("invalid number '{number}': {e}"))?;
    Ok((slot, number))
}

fn format_item(item: &InventoryEntry) -> String {
    let settings = &item.settings;
    let mut line = format!("id={}", item.id);
    if let Some(name) = &item.reserved_name {
        line.push_str(&format!(" ({name})"));
    }
    line.push_str(&format!(
        " x{} level={} tier={} corrupted={}",
        settings.quantity, item.level, settings.rarity, settings.corrupted
    ));
    for (index, (aspect, aspect_level)) in settings
        .mods
        .iter()
        .zip(&settings.mod_quantities)
        .enumerate()
    {
        if aspect != "0" && !aspect.is_empty() {
            line.push_str(&format!(" aspect{index}={aspect}:{aspect_level}"));
        }
    }
    line
}

fn format_chip(chip: &CombatChipEntry) -> String {
    match &chip.reserved_name {
        Some(name) => format!("id={} ({name})", chip.id),
        None => format!("id={}", chip.id),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> JsonValue {
    serde_json::to_value(value).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON: {e}");
        process::exit(1);
    })
}

fn reserved_to_json(entries: &[ReservedEntry]) -> JsonValue {
    JsonValue::Array(
        entries
            .iter()
            .map(|entry| {
                let mut m = JsonMap::new();
                m.insert("name".to_string(), JsonValue::String(entry.display_name()));
                m.insert("id".to_string(), JsonValue::String(entry.id_tail.clone()));
                JsonValue::Object(m)
            })
            .collect(),
    )
}
