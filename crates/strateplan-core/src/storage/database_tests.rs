//! Tests for database migrations
//!
//! These tests verify that:
//! - All migrations apply successfully
//! - Schema version is tracked correctly
//! - Reopening an existing file is a no-op
//! - Foreign keys are enforced

use rusqlite::params;
use tempfile::TempDir;

use crate::storage::database::Database;

/// Helper to create a temporary database for testing
fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(&db_path).expect("Failed to create database");
    (db, temp_dir)
}

fn table_columns(db: &Database, table: &str) -> Vec<String> {
    let mut stmt = db
        .conn()
        .prepare(&format!("PRAGMA table_info({})", table))
        .expect("Failed to prepare PRAGMA");

    stmt.query_map([], |row| row.get::<_, String>(1))
        .expect("Failed to get columns")
        .filter_map(Result::ok)
        .collect()
}

#[test]
fn test_database_creation() {
    let (db, _temp) = create_test_db();

    let version = db.get_schema_version().expect("Failed to read version");
    assert_eq!(version, 2, "Expected current schema version to be 2");
}

#[test]
fn test_entity_tables_exist() {
    let (db, _temp) = create_test_db();

    for table in ["strategic_plans", "strategic_issues", "kpis", "initiatives"] {
        let count: i64 = db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
                |row| row.get(0),
            )
            .expect("Failed to query sqlite_master");
        assert_eq!(count, 1, "table {} should exist", table);
    }
}

#[test]
fn test_issue_columns() {
    let (db, _temp) = create_test_db();

    let columns = table_columns(&db, "strategic_issues");
    for expected in ["id", "plan_id", "name", "description", "priority", "created_at"] {
        assert!(columns.contains(&expected.to_string()), "missing {}", expected);
    }
}

#[test]
fn test_initiative_status_defaults_to_planned() {
    let (db, _temp) = create_test_db();
    let conn = db.conn();

    conn.execute(
        "INSERT INTO strategic_plans (name, created_at, updated_at) VALUES ('P', 'now', 'now')",
        [],
    )
    .unwrap();
    let plan_id = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO strategic_issues (plan_id, name, created_at, updated_at) VALUES (?1, 'I', 'now', 'now')",
        params![plan_id],
    )
    .unwrap();
    let issue_id = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO initiatives (issue_id, name, created_at, updated_at) VALUES (?1, 'X', 'now', 'now')",
        params![issue_id],
    )
    .unwrap();

    let status: String = conn
        .query_row("SELECT status FROM initiatives", [], |row| row.get(0))
        .unwrap();
    assert_eq!(status, "planned");
}

#[test]
fn test_foreign_keys_enabled() {
    let (db, _temp) = create_test_db();

    let fk_enabled: i32 = db
        .conn()
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .expect("Failed to get foreign_keys setting");
    assert_eq!(fk_enabled, 1, "Foreign keys should be enabled");

    // An issue pointing at a missing plan is rejected by SQLite itself
    let result = db.conn().execute(
        "INSERT INTO strategic_issues (plan_id, name, created_at, updated_at) VALUES (999, 'I', 'now', 'now')",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn test_reopen_keeps_data_and_version() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");

    {
        let db = Database::new(&db_path).expect("Failed to create database");
        db.conn()
            .execute(
                "INSERT INTO strategic_plans (name, created_at, updated_at) VALUES ('Persisted', 'now', 'now')",
                [],
            )
            .unwrap();
    }

    let db = Database::new(&db_path).expect("Failed to reopen database");
    assert_eq!(db.get_schema_version().unwrap(), 2);

    let versions: i64 = db
        .conn()
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(versions, 2, "each migration is recorded once");

    let name: String = db
        .conn()
        .query_row("SELECT name FROM strategic_plans", [], |row| row.get(0))
        .unwrap();
    assert_eq!(name, "Persisted");
}

#[test]
fn test_creates_missing_parent_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("nested").join("dir").join("plans.db");

    Database::new(&db_path).expect("Failed to create database");
    assert!(db_path.exists());
}
