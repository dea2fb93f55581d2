//! Tests for the persistence adapter
//!
//! These tests verify:
//! - Save/load round trip
//! - Atomic replace via temp file, cleaned up on failure
//! - Missing, corrupt, and partial documents on load
//! - Pretty vs compact output

use std::fs;

use fitdb::config::SyncStrategy;
use fitdb::row::{fields, Row, Value};
use fitdb::store::persist::{self, Tables};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn known() -> Vec<String> {
    vec!["users".to_string(), "workouts".to_string()]
}

fn sample_tables() -> Tables {
    let mut tables = Tables::new();
    tables.insert(
        "users".to_string(),
        vec![Row::new(fields([("email", Value::from("a@example.com")), ("age", Value::from(30))]))],
    );
    tables.insert(
        "workouts".to_string(),
        vec![
            Row::new(fields([("name", "Leg Day"), ("difficulty", "Beginner")])),
            Row::new(fields([("name", "Push"), ("difficulty", "Advanced")])),
        ],
    );
    tables
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_save_then_load_reproduces_tables() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("db.json");
    let tables = sample_tables();

    persist::save(&path, &tables, SyncStrategy::EveryWrite, true).unwrap();
    let (loaded, report) = persist::load(&path, &known());

    assert_eq!(loaded, tables);
    assert_eq!(report.rows, 3);
    assert_eq!(report.tables, 2);
    assert!(!report.fell_back);
}

#[test]
fn test_save_leaves_no_temp_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("db.json");

    persist::save(&path, &sample_tables(), SyncStrategy::OsBuffered, true).unwrap();

    assert!(path.exists());
    assert!(!persist::tmp_path(&path).exists());
}

#[test]
fn test_save_overwrites_whole_document() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("db.json");

    persist::save(&path, &sample_tables(), SyncStrategy::OsBuffered, true).unwrap();
    persist::save(&path, &Tables::new(), SyncStrategy::OsBuffered, true).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json, serde_json::json!({}));
}

#[test]
fn test_failed_save_removes_temp_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("db.json");
    // A directory in place of the document makes the rename fail
    fs::create_dir(&path).unwrap();

    for sync in [SyncStrategy::OsBuffered, SyncStrategy::EveryWrite] {
        assert!(persist::save(&path, &sample_tables(), sync, true).is_err());
        assert!(!persist::tmp_path(&path).exists());
        assert!(path.is_dir());
    }
}

#[test]
fn test_every_write_save_syncs_nested_directory() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("a").join("b");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("db.json");
    let tables = sample_tables();

    persist::save(&path, &tables, SyncStrategy::EveryWrite, false).unwrap();

    let (loaded, _report) = persist::load(&path, &known());
    assert_eq!(loaded, tables);
    assert!(!persist::tmp_path(&path).exists());
}

#[test]
fn test_tmp_path_appends_suffix() {
    let path = std::path::Path::new("/data/db.json");
    assert_eq!(persist::tmp_path(path), std::path::PathBuf::from("/data/db.json.tmp"));
}

// =============================================================================
// Document Layout Tests
// =============================================================================

#[test]
fn test_document_has_table_keys_and_flat_rows() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("db.json");
    let tables = sample_tables();

    persist::save(&path, &tables, SyncStrategy::OsBuffered, true).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["users"][0]["email"], "a@example.com");
    assert_eq!(json["users"][0]["id"], tables["users"][0].id.as_str());
    assert_eq!(json["workouts"].as_array().unwrap().len(), 2);
}

#[test]
fn test_pretty_and_compact_output() {
    let temp = TempDir::new().unwrap();
    let pretty = temp.path().join("pretty.json");
    let compact = temp.path().join("compact.json");

    persist::save(&pretty, &sample_tables(), SyncStrategy::OsBuffered, true).unwrap();
    persist::save(&compact, &sample_tables(), SyncStrategy::OsBuffered, false).unwrap();

    assert!(fs::read_to_string(&pretty).unwrap().contains("\n  \""));
    assert!(!fs::read_to_string(&compact).unwrap().contains('\n'));
}

// =============================================================================
// Load Fallback Tests
// =============================================================================

#[test]
fn test_load_missing_file_gives_known_tables() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.json");

    let (tables, report) = persist::load(&path, &known());

    assert_eq!(tables.len(), 2);
    assert!(tables.values().all(Vec::is_empty));
    assert!(!report.fell_back);
}

#[test]
fn test_load_invalid_json_falls_back() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("db.json");
    fs::write(&path, "not json").unwrap();

    let (tables, report) = persist::load(&path, &known());

    assert!(report.fell_back);
    assert_eq!(tables.len(), 2);
    assert_eq!(report.rows, 0);
}

#[test]
fn test_load_nested_values_falls_back() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("db.json");
    fs::write(
        &path,
        r#"{"users":[{"id":"1","created_at":"2024-05-01T08:00:00.000Z","tags":["a"]}]}"#,
    )
    .unwrap();

    let (_tables, report) = persist::load(&path, &known());

    assert!(report.fell_back);
}

#[test]
fn test_load_adds_missing_known_tables() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("db.json");
    fs::write(
        &path,
        r#"{"users":[{"id":"1","created_at":"2024-05-01T08:00:00.000Z","email":"a@b.c"}],"extra":[]}"#,
    )
    .unwrap();

    let (tables, report) = persist::load(&path, &known());

    assert!(!report.fell_back);
    assert_eq!(tables["users"].len(), 1);
    assert!(tables["workouts"].is_empty());
    assert!(tables.contains_key("extra"));
}
