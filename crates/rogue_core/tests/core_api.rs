use std::fs;
use std::path::{Path, PathBuf};

use rogue_core::catalog::{MAX_CHARACTERS, NUM_COMBAT_CHIP_SLOTS, NUM_INVENTORY_SLOTS};
use rogue_core::config::EditorConfig;
use rogue_core::core_api::{CoreErrorCode, Editor};
use rogue_core::document::SaveDocument;
use rogue_core::reserved::ReservedKind;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture_path() -> PathBuf {
    workspace_root().join("tests/fixtures/PlayerPrefs.txt")
}

fn open_fixture() -> Editor {
    Editor::open_path(&fixture_path()).expect("failed to open fixture")
}

fn copy_fixture_to(dir: &Path) -> PathBuf {
    let path = dir.join("PlayerPrefs.txt");
    fs::copy(fixture_path(), &path).expect("failed to copy fixture");
    path
}

#[test]
fn character_names_fill_every_slot() {
    let editor = open_fixture();
    let names = editor.load_character_names();

    assert_eq!(names.len(), MAX_CHARACTERS);
    assert_eq!(names[0], "Smurfalicious");
    assert_eq!(names[1], "Vex");
    assert!(names[2..].iter().all(String::is_empty));
}

#[test]
fn character_values_skip_level() {
    let mut editor = open_fixture();
    editor
        .load_character_values(0)
        .expect("failed to load character values");

    let values = editor.character_values();
    assert_eq!(values["name"], "Smurfalicious");
    assert_eq!(values["exp"], "1234");
    assert_eq!(values["race"], "3");
    assert_eq!(values["variant"], "1");
    assert_eq!(values["vit"], "10");
    assert_eq!(values["fth"], "1");
    assert!(!values.contains_key("level"));
    assert_eq!(editor.current_character(), Some(0));
}

#[test]
fn switching_character_rebuilds_values() {
    let mut editor = open_fixture();
    editor.load_character_values(0).expect("character 0");
    editor.load_character_values(1).expect("character 1");

    assert_eq!(editor.character_values()["name"], "Vex");
    assert_eq!(editor.character_values()["exp"], "40");
}

#[test]
fn item_browser_reads_slots_and_chips() {
    let mut editor = open_fixture();
    editor
        .load_character_item_browser(0)
        .expect("failed to load item browser");

    assert_eq!(editor.inventory().len(), NUM_INVENTORY_SLOTS);
    assert_eq!(editor.inventory()[0], 1001);
    assert_eq!(editor.inventory()[1], 57);
    assert_eq!(editor.inventory()[2], 0);

    let blade = &editor.item_settings()[0];
    assert_eq!(blade.quantity, "1");
    assert_eq!(blade.exp, "100");
    assert_eq!(blade.rarity, "3");
    assert_eq!(blade.corrupted, "0");
    assert_eq!(blade.mods, ["12", "0", "0"]);
    assert_eq!(blade.mod_quantities, ["2", "0", "0"]);
    assert_eq!(editor.item_settings()[1].corrupted, "1");

    assert_eq!(editor.combat_chips().len(), NUM_COMBAT_CHIP_SLOTS);
    assert_eq!(editor.combat_chips()[..2], [2001, 14]);
}

#[test]
fn resolved_entries_carry_reserved_names_and_levels() {
    let mut editor = open_fixture();
    editor.load_character_item_browser(0).expect("item browser");

    let inventory = editor.resolved_inventory();
    assert_eq!(inventory[0].reserved_name.as_deref(), Some("Gadget:Blade"));
    assert_eq!(inventory[0].level, 5);
    assert_eq!(inventory[1].reserved_name, None);
    assert_eq!(inventory[1].level, 1);

    let chips = editor.resolved_combat_chips();
    assert_eq!(chips[0].reserved_name.as_deref(), Some("Gadget:Zap"));
    assert_eq!(chips[1].reserved_name, None);
}

#[test]
fn loading_twice_gives_identical_projections() {
    let mut first = open_fixture();
    let mut second = open_fixture();
    for editor in [&mut first, &mut second] {
        editor.load_character_values(0).expect("values");
        editor.load_character_item_browser(0).expect("item browser");
    }

    assert_eq!(first.character_values(), second.character_values());
    assert_eq!(first.inventory(), second.inventory());
    assert_eq!(first.combat_chips(), second.combat_chips());
    assert_eq!(first.item_settings(), second.item_settings());
}

#[test]
fn malformed_item_id_is_parse_error_and_keeps_previous_projection() {
    let text = fs::read_to_string(fixture_path())
        .expect("failed to read fixture")
        .replace(" 12id : 0 :", " 12id : junk :");
    let mut editor = Editor::from_document(SaveDocument::from_text(&text));

    editor.load_character_item_browser(0).expect("character 0");
    let err = editor
        .load_character_item_browser(1)
        .expect_err("malformed ID must fail");
    assert_eq!(err.code, CoreErrorCode::Parse);
    assert_eq!(editor.inventory()[0], 1001);
}

#[test]
fn out_of_range_character_is_rejected() {
    let mut editor = open_fixture();
    let err = editor
        .load_character_values(MAX_CHARACTERS)
        .expect_err("character index out of range");
    assert_eq!(err.code, CoreErrorCode::UnsupportedOperation);
}

#[test]
fn unused_character_slot_has_no_items() {
    let mut editor = open_fixture();
    let err = editor
        .load_character_item_browser(2)
        .expect_err("empty slot has no item IDs");
    assert_eq!(err.code, CoreErrorCode::Parse);
}

#[test]
fn load_and_replace_value_round_trip() {
    let mut editor = open_fixture();
    let old = editor.load_value("musicVolume");
    assert_eq!(old, "0.8");

    editor
        .replace_value("musicVolume", &old, "0.5")
        .expect("replace should succeed");
    assert_eq!(editor.load_value("musicVolume"), "0.5");

    let err = editor
        .replace_value("musicVolume", "0.8", "0.1")
        .expect_err("stale value must be rejected");
    assert_eq!(err.code, CoreErrorCode::ValueMismatch);
}

#[test]
fn level_conversions_match_catalog() {
    assert_eq!(Editor::calculate_item_level_from_experience(100), 5);
    assert_eq!(Editor::calculate_item_level_from_experience(99), 4);
    assert_eq!(Editor::calculate_item_experience_from_level(5), 100);
    assert_eq!(Editor::calculate_item_experience_from_level(1), 0);
    assert_eq!(Editor::calculate_item_experience_from_level(42), 0);
}

#[test]
fn reserved_lookups_through_editor() {
    let editor = open_fixture();
    assert_eq!(
        editor.reserved_name(1002, ReservedKind::Item).as_deref(),
        Some("Gadget:Shield")
    );
    assert_eq!(
        editor.reserved_id("Gadget:Zap", ReservedKind::Chip),
        Ok(Some(2001))
    );
    assert_eq!(editor.reserved_id("Nope", ReservedKind::Chip), Ok(None));
}

#[test]
fn character_edits_update_buffer_and_cache() {
    let mut editor = open_fixture();
    editor.load_character_values(1).expect("values");

    editor
        .set_character_value("name", "Vexed")
        .expect("rename should succeed");
    editor.set_character_value("str", "9").expect("str");

    assert_eq!(editor.character_values()["name"], "Vexed");
    assert_eq!(editor.load_value("1name"), "Vexed");
    assert_eq!(editor.load_value("1str"), "9");
    assert_eq!(editor.load_character_names()[1], "Vexed");

    let err = editor
        .set_character_value("level", "3")
        .expect_err("level is derived");
    assert_eq!(err.code, CoreErrorCode::UnsupportedOperation);
}

#[test]
fn character_edits_only_reach_character_fields() {
    let mut editor = open_fixture();
    editor.load_character_values(0).expect("values");
    editor.load_character_item_browser(0).expect("item browser");
    let before = editor.document().text().to_string();

    for field in ["0id", "chip0", "ReservedItemIDs", ""] {
        let err = editor
            .set_character_value(field, "57")
            .expect_err("not a character field");
        assert_eq!(err.code, CoreErrorCode::UnsupportedOperation, "{field:?}");
    }

    assert_eq!(editor.document().text(), before);
    assert_eq!(editor.load_value("00id"), "1001");
    assert_eq!(editor.inventory()[0], 1001);
}

#[test]
fn failed_item_settings_edit_leaves_buffer_and_cache_untouched() {
    let mut editor = open_fixture();
    editor.load_character_item_browser(0).expect("item browser");
    let before = editor.document().text().to_string();
    let loaded = editor.item_settings()[0].clone();

    let mut settings = loaded.clone();
    settings.quantity = "5".to_string();
    settings.rarity = "bad : value".to_string();
    let err = editor
        .set_item_settings(0, &settings)
        .expect_err("rarity is not encodable");
    assert_eq!(err.code, CoreErrorCode::InvalidValue);

    assert_eq!(editor.document().text(), before);
    assert_eq!(editor.load_value("00q"), "1");
    assert_eq!(editor.item_settings()[0], loaded);
    assert!(!editor.document().is_modified());
}

#[test]
fn item_edits_require_loaded_browser() {
    let mut editor = open_fixture();
    let err = editor
        .set_inventory_item(0, 5)
        .expect_err("no browser loaded");
    assert_eq!(err.code, CoreErrorCode::UnsupportedOperation);
}

#[test]
fn item_edits_write_only_changed_fields() {
    let mut editor = open_fixture();
    editor.load_character_item_browser(0).expect("item browser");

    editor.set_inventory_item(2, 1002).expect("set item");
    editor.set_combat_chip(5, 2001).expect("set chip");

    let mut settings = editor.item_settings()[2].clone();
    settings.quantity = "3".to_string();
    settings.mods[1] = "44".to_string();
    editor
        .set_item_settings(2, &settings)
        .expect("set item settings");
    editor.set_item_level(2, 7).expect("set item level");

    assert_eq!(editor.load_value("02id"), "1002");
    assert_eq!(editor.load_value("02q"), "3");
    assert_eq!(editor.load_value("02aspect1"), "44");
    assert_eq!(editor.load_value("02exp"), "210");
    assert_eq!(editor.load_value("0chip5"), "2001");

    let before_reload = editor.resolved_inventory()[2].clone();
    editor.load_character_item_browser(0).expect("reload");
    assert_eq!(editor.resolved_inventory()[2], before_reload);
    assert_eq!(before_reload.level, 7);
    assert_eq!(before_reload.reserved_name.as_deref(), Some("Gadget:Shield"));
}

#[test]
fn character_sheet_needs_both_projections() {
    let mut editor = open_fixture();
    editor.load_character_values(0).expect("values");
    let err = editor
        .character_sheet()
        .expect_err("item browser not loaded");
    assert_eq!(err.code, CoreErrorCode::UnsupportedOperation);

    editor.load_character_item_browser(0).expect("item browser");
    let sheet = editor.character_sheet().expect("sheet");
    assert_eq!(sheet.character, 0);
    assert_eq!(sheet.values["name"], "Smurfalicious");
    assert_eq!(sheet.inventory.len(), NUM_INVENTORY_SLOTS);
    assert_eq!(sheet.combat_chips.len(), NUM_COMBAT_CHIP_SLOTS);
}

#[test]
fn save_persists_edits_through_config() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = copy_fixture_to(dir.path());

    let config = EditorConfig::default().with_save_path(&path);
    let mut editor = Editor::open(&config).expect("failed to open copy");
    editor.load_character_values(0).expect("values");
    editor.set_character_value("exp", "2000").expect("exp");
    editor.save().expect("save should succeed");

    let mut reopened = Editor::open_path(&path).expect("failed to reopen");
    reopened.load_character_values(0).expect("values");
    assert_eq!(reopened.character_values()["exp"], "2000");
    assert_eq!(reopened.character_values()["name"], "Smurfalicious");

    let original = fs::read_to_string(fixture_path()).expect("fixture");
    let saved = fs::read_to_string(&path).expect("saved copy");
    assert_eq!(saved, original.replace(" 0exp : 1234 :", " 0exp : 2000 :"));
}
