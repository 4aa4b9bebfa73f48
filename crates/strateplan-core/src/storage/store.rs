//! Generic record store over the entity tables
//!
//! Every entity table shares the same shape: an integer primary key assigned
//! on insert, `created_at`/`updated_at` stamps, and at most one parent column.
//! The store builds SQL from `&'static str` column names supplied by the
//! entity modules, so user input only ever travels as bound parameters.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params_from_iter, OptionalExtension, Row, Transaction};
use tracing::debug;

use super::database::Database;
use crate::error::Result;
use crate::validate::DATE_FORMAT;

/// Entity tables known to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Plans,
    Issues,
    Kpis,
    Initiatives,
}

impl Table {
    /// SQL table name
    pub fn name(self) -> &'static str {
        match self {
            Table::Plans => "strategic_plans",
            Table::Issues => "strategic_issues",
            Table::Kpis => "kpis",
            Table::Initiatives => "initiatives",
        }
    }
}

/// A column assignment for insert/update
pub type Column = (&'static str, Value);

/// Row selection for list/count
#[derive(Debug, Clone)]
pub enum Filter {
    All,
    Eq(&'static str, Value),
}

impl Filter {
    fn clause(&self) -> (String, Vec<Value>) {
        match self {
            Filter::All => (String::new(), Vec::new()),
            Filter::Eq(column, value) => (format!("WHERE {} = ?1", column), vec![value.clone()]),
        }
    }
}

/// Result ordering for list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Creation order
    Insertion,
    /// Priority ascending (unset first, as SQLite sorts NULL), then creation order
    Priority,
}

impl Order {
    fn clause(self) -> &'static str {
        match self {
            Order::Insertion => "ORDER BY id",
            Order::Priority => "ORDER BY priority, id",
        }
    }
}

/// A typed row of one entity table
pub trait Record: Sized {
    const TABLE: Table;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// Record store backed by a [`Database`]
#[derive(Clone, Copy)]
pub struct Store<'a> {
    db: &'a Database,
}

impl<'a> Store<'a> {
    /// Create a new store with database reference
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a row, stamping `created_at`/`updated_at`, and return its id
    pub fn insert(&self, table: Table, columns: Vec<Column>) -> Result<i64> {
        let now = Value::Text(Utc::now().to_rfc3339());
        let mut columns = columns;
        columns.push(("created_at", now.clone()));
        columns.push(("updated_at", now));

        let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.name(),
            names.join(", "),
            placeholders.join(", ")
        );

        let conn = self.db.conn();
        conn.execute(&sql, params_from_iter(columns.into_iter().map(|(_, v)| v)))?;
        let id = conn.last_insert_rowid();
        debug!("Inserted {} row {}", table.name(), id);
        Ok(id)
    }

    /// Fetch one record by id
    pub fn get<R: Record>(&self, id: i64) -> Result<Option<R>> {
        let sql = format!("SELECT * FROM {} WHERE id = ?1", R::TABLE.name());
        let record = self
            .db
            .conn()
            .query_row(&sql, [id], |row| R::from_row(row))
            .optional()?;
        Ok(record)
    }

    /// List records matching the filter
    pub fn list<R: Record>(&self, filter: Filter, order: Order) -> Result<Vec<R>> {
        let (where_clause, params) = filter.clause();
        let sql = format!(
            "SELECT * FROM {} {} {}",
            R::TABLE.name(),
            where_clause,
            order.clause()
        );

        let mut stmt = self.db.conn().prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(params), |row| R::from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Apply a partial update and return the merged record
    ///
    /// Returns `None` when no row has the id. An empty column set still
    /// refreshes `updated_at`.
    pub fn update<R: Record>(&self, id: i64, columns: Vec<Column>) -> Result<Option<R>> {
        let mut columns = columns;
        columns.push(("updated_at", Value::Text(Utc::now().to_rfc3339())));

        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, (name, _))| format!("{} = ?{}", name, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            R::TABLE.name(),
            assignments.join(", "),
            columns.len() + 1
        );

        let mut params: Vec<Value> = columns.into_iter().map(|(_, v)| v).collect();
        params.push(Value::Integer(id));

        let changed = self.db.conn().execute(&sql, params_from_iter(params))?;
        if changed == 0 {
            return Ok(None);
        }
        self.get(id)
    }

    /// Delete one row; `false` when it did not exist
    pub fn delete(&self, table: Table, id: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", table.name());
        let changed = self.db.conn().execute(&sql, [id])?;
        Ok(changed > 0)
    }

    /// Delete every row matching the filter, returning how many went
    pub fn delete_where(&self, table: Table, filter: Filter) -> Result<usize> {
        let (where_clause, params) = filter.clause();
        let sql = format!("DELETE FROM {} {}", table.name(), where_clause);
        let changed = self.db.conn().execute(&sql, params_from_iter(params))?;
        Ok(changed)
    }

    /// Check whether a row with the id exists
    pub fn exists(&self, table: Table, id: i64) -> Result<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", table.name());
        let found: bool = self.db.conn().query_row(&sql, [id], |row| row.get(0))?;
        Ok(found)
    }

    /// Count rows matching the filter
    pub fn count(&self, table: Table, filter: Filter) -> Result<usize> {
        let (where_clause, params) = filter.clause();
        let sql = format!("SELECT COUNT(*) FROM {} {}", table.name(), where_clause);
        let count: i64 = self
            .db
            .conn()
            .query_row(&sql, params_from_iter(params), |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Begin an explicit transaction on the shared connection
    ///
    /// Store calls made while the transaction is alive run inside it; it
    /// rolls back on drop unless committed.
    pub fn transaction(&self) -> Result<Transaction<'a>> {
        Ok(self.db.conn().unchecked_transaction()?)
    }
}

/// Read an RFC 3339 timestamp column
pub(crate) fn timestamp_column(row: &Row<'_>, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(row, column, e))
}

/// Read an optional `YYYY-MM-DD` date column
pub(crate) fn date_column(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(column)?;
    raw.map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT))
        .transpose()
        .map_err(|e| conversion_error(row, column, e))
}

/// Column-tagged conversion failure for a value that did not parse
pub(crate) fn conversion_error<E>(row: &Row<'_>, column: &str, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    let index = row.as_ref().column_index(column).unwrap_or(0);
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e))
}

/// Optional text value
pub(crate) fn text(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::Text)
}

/// Optional date value stored as `YYYY-MM-DD`
pub(crate) fn date(value: Option<NaiveDate>) -> Value {
    value.map_or(Value::Null, |d| Value::Text(d.format(DATE_FORMAT).to_string()))
}

/// Optional real value
pub(crate) fn real(value: Option<f64>) -> Value {
    value.map_or(Value::Null, Value::Real)
}
