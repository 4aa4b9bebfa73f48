//! Initiative CRUD operations

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::Serialize;
use tracing::info;

use super::EntityKind;
use crate::error::{Error, Result};
use crate::storage::{
    conversion_error, date, date_column, real, text, timestamp_column, Column, Database, Filter,
    Order, Record, Store, Table,
};
use crate::validate;

/// Initiative lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InitiativeStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Delayed,
    Cancelled,
}

impl InitiativeStatus {
    /// Every status, in lifecycle order
    pub const ALL: [InitiativeStatus; 5] = [
        InitiativeStatus::Planned,
        InitiativeStatus::InProgress,
        InitiativeStatus::Completed,
        InitiativeStatus::Delayed,
        InitiativeStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InitiativeStatus::Planned => "planned",
            InitiativeStatus::InProgress => "in_progress",
            InitiativeStatus::Completed => "completed",
            InitiativeStatus::Delayed => "delayed",
            InitiativeStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InitiativeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InitiativeStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        InitiativeStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| {
                let valid: Vec<&str> = InitiativeStatus::ALL.iter().map(|s| s.as_str()).collect();
                Error::validation(
                    "status",
                    format!("'{}' is not one of: {}", s, valid.join(", ")),
                )
            })
    }
}

/// Project or activity owned by an issue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Initiative {
    pub id: i64,
    pub issue_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: InitiativeStatus,
    pub budget: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Initiative {
    const TABLE: Table = Table::Initiatives;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let raw_status: String = row.get("status")?;
        let status = raw_status
            .parse::<InitiativeStatus>()
            .map_err(|e| conversion_error(row, "status", e))?;

        Ok(Initiative {
            id: row.get("id")?,
            issue_id: row.get("issue_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            status,
            budget: row.get("budget")?,
            start_date: date_column(row, "start_date")?,
            end_date: date_column(row, "end_date")?,
            created_at: timestamp_column(row, "created_at")?,
            updated_at: timestamp_column(row, "updated_at")?,
        })
    }
}

/// Fields for a new initiative
#[derive(Debug, Clone, Default)]
pub struct NewInitiative {
    pub issue_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<InitiativeStatus>,
    pub budget: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Partial initiative update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct InitiativeUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<InitiativeStatus>,
    pub budget: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Initiative manager
pub struct InitiativeManager<'a> {
    store: Store<'a>,
}

impl<'a> InitiativeManager<'a> {
    /// Create a new initiative manager with database reference
    pub fn new(db: &'a Database) -> Self {
        Self {
            store: Store::new(db),
        }
    }

    fn require_issue(&self, issue_id: i64) -> Result<()> {
        if !self.store.exists(Table::Issues, issue_id)? {
            return Err(Error::not_found(EntityKind::Issue, issue_id));
        }
        Ok(())
    }

    /// Create an initiative under an existing issue
    pub fn create(&self, initiative: NewInitiative) -> Result<Initiative> {
        self.require_issue(initiative.issue_id)?;
        let name = validate::name("name", &initiative.name)?;
        let budget = initiative
            .budget
            .map(|v| validate::non_negative("budget", v))
            .transpose()?;
        validate::date_range(initiative.start_date, initiative.end_date)?;
        let status = initiative.status.unwrap_or_default();

        let id = self.store.insert(
            Table::Initiatives,
            vec![
                ("issue_id", Value::Integer(initiative.issue_id)),
                ("name", Value::Text(name)),
                ("description", text(validate::optional_text(initiative.description.as_deref()))),
                ("status", Value::Text(status.as_str().to_string())),
                ("budget", real(budget)),
                ("start_date", date(initiative.start_date)),
                ("end_date", date(initiative.end_date)),
            ],
        )?;
        info!("Created initiative {} under issue {}", id, initiative.issue_id);
        self.show(id)
    }

    /// Initiatives of an issue in creation order
    pub fn list(&self, issue_id: i64) -> Result<Vec<Initiative>> {
        self.require_issue(issue_id)?;
        self.store.list(
            Filter::Eq("issue_id", Value::Integer(issue_id)),
            Order::Insertion,
        )
    }

    /// Initiatives in a given status across all plans
    pub fn list_by_status(&self, status: InitiativeStatus) -> Result<Vec<Initiative>> {
        self.store.list(
            Filter::Eq("status", Value::Text(status.as_str().to_string())),
            Order::Insertion,
        )
    }

    /// One initiative by id
    pub fn show(&self, id: i64) -> Result<Initiative> {
        self.store
            .get(id)?
            .ok_or_else(|| Error::not_found(EntityKind::Initiative, id))
    }

    /// Apply a partial update
    pub fn update(&self, id: i64, update: InitiativeUpdate) -> Result<Initiative> {
        let current = self.show(id)?;

        let mut columns: Vec<Column> = Vec::new();
        if let Some(name) = update.name.as_deref() {
            columns.push(("name", Value::Text(validate::name("name", name)?)));
        }
        if let Some(description) = update.description.as_deref() {
            columns.push(("description", text(validate::optional_text(Some(description)))));
        }
        if let Some(status) = update.status {
            columns.push(("status", Value::Text(status.as_str().to_string())));
        }
        if let Some(budget) = update.budget {
            columns.push(("budget", Value::Real(validate::non_negative("budget", budget)?)));
        }
        if update.start_date.is_some() {
            columns.push(("start_date", date(update.start_date)));
        }
        if update.end_date.is_some() {
            columns.push(("end_date", date(update.end_date)));
        }
        validate::date_range(
            update.start_date.or(current.start_date),
            update.end_date.or(current.end_date),
        )?;

        let initiative = self
            .store
            .update(id, columns)?
            .ok_or_else(|| Error::not_found(EntityKind::Initiative, id))?;
        info!("Updated initiative {}", id);
        Ok(initiative)
    }

    /// Delete an initiative (leaf entity, never needs confirmation)
    pub fn delete(&self, id: i64) -> Result<()> {
        if !self.store.delete(Table::Initiatives, id)? {
            return Err(Error::not_found(EntityKind::Initiative, id));
        }
        info!("Deleted initiative {}", id);
        Ok(())
    }
}
