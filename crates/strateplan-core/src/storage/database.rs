//! SQLite database wrapper with versioned migrations

use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;

/// Current schema version
const SCHEMA_VERSION: i32 = 2;

/// SQLite database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at the given path and bring it up to date
    pub fn new(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        // Parent references are checked by the managers, the constraint is a backstop
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self { conn };
        db.run_migrations()?;
        Ok(db)
    }

    /// Get the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Get the current schema version from database
    pub(crate) fn get_schema_version(&self) -> Result<i32> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        let version = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )?;
        Ok(version)
    }

    /// Set schema version after successful migration
    fn set_schema_version(&self, version: i32) -> Result<()> {
        self.conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )?;
        Ok(())
    }

    /// Run database migrations incrementally
    pub(crate) fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version()?;
        debug!(
            "Database schema version: {} (target: {})",
            current_version, SCHEMA_VERSION
        );

        if current_version >= SCHEMA_VERSION {
            return Ok(());
        }

        // Migration 1: Initial schema
        if current_version < 1 {
            info!("Running migration 1: Initial schema");
            self.conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS strategic_plans (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    description TEXT,
                    start_date TEXT,
                    end_date TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                -- No ON DELETE CASCADE: cascades are driven by the managers
                CREATE TABLE IF NOT EXISTS strategic_issues (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    plan_id INTEGER NOT NULL,
                    name TEXT NOT NULL,
                    description TEXT,
                    priority INTEGER,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    FOREIGN KEY (plan_id) REFERENCES strategic_plans(id)
                );

                CREATE TABLE IF NOT EXISTS kpis (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    issue_id INTEGER NOT NULL,
                    name TEXT NOT NULL,
                    description TEXT,
                    target_value REAL,
                    current_value REAL,
                    unit TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    FOREIGN KEY (issue_id) REFERENCES strategic_issues(id)
                );

                CREATE TABLE IF NOT EXISTS initiatives (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    issue_id INTEGER NOT NULL,
                    name TEXT NOT NULL,
                    description TEXT,
                    status TEXT NOT NULL DEFAULT 'planned',
                    budget REAL,
                    start_date TEXT,
                    end_date TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    FOREIGN KEY (issue_id) REFERENCES strategic_issues(id)
                );
                "#,
            )?;
            self.set_schema_version(1)?;
        }

        // Migration 2: Parent lookup indexes
        if current_version < 2 {
            info!("Running migration 2: Parent lookup indexes");
            self.conn.execute_batch(
                r#"
                CREATE INDEX IF NOT EXISTS idx_issues_plan
                    ON strategic_issues(plan_id, priority);

                CREATE INDEX IF NOT EXISTS idx_kpis_issue
                    ON kpis(issue_id);

                CREATE INDEX IF NOT EXISTS idx_initiatives_issue
                    ON initiatives(issue_id);

                CREATE INDEX IF NOT EXISTS idx_initiatives_status
                    ON initiatives(status);
                "#,
            )?;
            self.set_schema_version(2)?;
        }

        info!("Migrations complete");
        Ok(())
    }
}
