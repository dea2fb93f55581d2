//! Tests for QueryBuilder and Filter
//!
//! These tests verify:
//! - Chained calls accumulate into the descriptor in call order
//! - Insert payloads are normalized to a list
//! - The last action wins
//! - Nothing reaches the store before `execute()`
//! - Filter predicates in isolation

use fitdb::config::{Config, SyncStrategy};
use fitdb::query::{Action, CompareOp, Filter, SortKey};
use fitdb::row::{fields, Row, Value};
use fitdb::Datastore;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_db() -> (TempDir, Datastore) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .db_path(temp_dir.path().join("db.json"))
        .sync_strategy(SyncStrategy::OsBuffered)
        .build();
    let db = Datastore::open(config).unwrap();
    (temp_dir, db)
}

fn sample_row() -> Row {
    Row::new(fields([
        ("name", Value::from("Leg Day")),
        ("difficulty", Value::from("Beginner")),
        ("duration", Value::from(45)),
        ("note", Value::Null),
    ]))
}

// =============================================================================
// Descriptor Tests
// =============================================================================

#[test]
fn test_new_builder_is_plain_select() {
    let (_temp, db) = setup_temp_db();

    let builder = db.from("workouts");
    let query = builder.query();

    assert_eq!(query.table, "workouts");
    assert_eq!(query.action, Action::Select);
    assert!(query.filters.is_empty());
    assert!(query.sorts.is_empty());
    assert_eq!(query.limit, None);
    assert!(!query.single);
    assert!(!query.returning);
}

#[test]
fn test_chain_accumulates_in_order() {
    let (_temp, db) = setup_temp_db();

    let builder = db
        .from("workouts")
        .select("id, name")
        .eq("user_id", "u1")
        .ilike("name", "%leg%")
        .gte("duration", 30)
        .order("difficulty", false)
        .order("name", true)
        .limit(10)
        .single();
    let query = builder.query();

    assert_eq!(query.columns.as_deref(), Some("id, name"));
    assert!(query.returning);
    assert_eq!(query.filters.len(), 3);
    assert!(matches!(&query.filters[0], Filter::Eq { field, .. } if field == "user_id"));
    assert!(matches!(&query.filters[1], Filter::ILike { pattern, .. } if pattern == "%leg%"));
    assert!(matches!(&query.filters[2], Filter::Compare { op: CompareOp::Gte, .. }));
    assert_eq!(
        query.sorts,
        vec![
            SortKey { field: "difficulty".to_string(), ascending: false },
            SortKey { field: "name".to_string(), ascending: true },
        ]
    );
    assert_eq!(query.limit, Some(10));
    assert!(query.single);
    assert!(query.invalid().is_none());
}

#[test]
fn test_insert_single_row_is_normalized() {
    let (_temp, db) = setup_temp_db();

    let builder = db.from("workouts").insert(fields([("name", "Leg Day")]));

    match &builder.query().action {
        Action::Insert(rows) => assert_eq!(rows.len(), 1),
        other => panic!("unexpected action {:?}", other),
    }
}

#[test]
fn test_insert_many_rows() {
    let (_temp, db) = setup_temp_db();

    let builder = db
        .from("workouts")
        .insert([fields([("name", "A")]), fields([("name", "B")])]);

    match &builder.query().action {
        Action::Insert(rows) => assert_eq!(rows.len(), 2),
        other => panic!("unexpected action {:?}", other),
    }
}

#[test]
fn test_update_records_patch() {
    let (_temp, db) = setup_temp_db();

    let patch = fields([("difficulty", "Advanced")]);
    let builder = db.from("workouts").update(patch.clone()).eq("name", "Leg Day");

    assert_eq!(builder.query().action, Action::Update(patch));
    assert_eq!(builder.query().action.name(), "update");
}

#[test]
fn test_last_action_wins() {
    let (_temp, db) = setup_temp_db();

    let builder = db.from("workouts").insert(fields([("name", "A")])).delete();

    assert_eq!(builder.query().action, Action::Delete);
}

#[tokio::test]
async fn test_nothing_happens_without_execute() {
    let (_temp, db) = setup_temp_db();

    let builder = db.from("workouts").insert(fields([("name", "Leg Day")]));
    drop(builder);

    assert!(!db.path().exists());
    let result = db.from("workouts").select("*").execute().await;
    assert!(result.rows().is_empty());
}

// =============================================================================
// Filter Tests
// =============================================================================

#[test]
fn test_eq_filter() {
    let row = sample_row();

    let hit = Filter::Eq { field: "duration".to_string(), value: Value::Float(45.0) };
    let miss = Filter::Eq { field: "duration".to_string(), value: Value::from("45") };

    assert!(hit.matches(&row));
    assert!(!miss.matches(&row));
}

#[test]
fn test_eq_null_matches_explicit_null_only() {
    let row = sample_row();

    assert!(Filter::Eq { field: "note".to_string(), value: Value::Null }.matches(&row));
    assert!(!Filter::Eq { field: "missing".to_string(), value: Value::Null }.matches(&row));
}

#[test]
fn test_neq_filter_skips_missing_fields() {
    let row = sample_row();

    assert!(Filter::Neq { field: "difficulty".to_string(), value: Value::from("Advanced") }.matches(&row));
    assert!(!Filter::Neq { field: "difficulty".to_string(), value: Value::from("Beginner") }.matches(&row));
    assert!(!Filter::Neq { field: "missing".to_string(), value: Value::from("x") }.matches(&row));
}

#[test]
fn test_compare_filters() {
    let row = sample_row();
    let check = |op, value: i64| {
        Filter::Compare { field: "duration".to_string(), op, value: Value::from(value) }.matches(&row)
    };

    assert!(check(CompareOp::Gt, 44));
    assert!(!check(CompareOp::Gt, 45));
    assert!(check(CompareOp::Gte, 45));
    assert!(check(CompareOp::Lt, 46));
    assert!(!check(CompareOp::Lt, 45));
    assert!(check(CompareOp::Lte, 45));
}

#[test]
fn test_compare_filter_incomparable_types_never_match() {
    let row = sample_row();

    let filter = Filter::Compare {
        field: "name".to_string(),
        op: CompareOp::Gte,
        value: Value::from(0),
    };
    assert!(!filter.matches(&row));
}

#[test]
fn test_ilike_filter() {
    let row = sample_row();
    let ilike = |pattern: &str| Filter::ilike("name", pattern).unwrap().matches(&row);

    assert!(ilike("%leg%"));
    assert!(ilike("LEG DAY"));
    assert!(ilike("leg%"));
    assert!(ilike("%day"));
    assert!(ilike("%"));
    assert!(!ilike("leg"));
    assert!(!ilike("day%"));
    assert!(!ilike("%legs%"));
}

#[test]
fn test_ilike_treats_regex_characters_literally() {
    let row = Row::new(fields([("name", "Row (3x10) v1.5")]));
    let ilike = |pattern: &str| Filter::ilike("name", pattern).unwrap().matches(&row);

    assert!(ilike("%(3x10)%"));
    assert!(ilike("%v1.5"));
    assert!(!ilike("%v1_5"));
    assert!(!ilike("row .3x10. v1.5"));
}

#[test]
fn test_ilike_non_text_never_matches() {
    let row = sample_row();

    assert!(!Filter::ilike("duration", "%4%").unwrap().matches(&row));
}
