//! Strategic plan CRUD operations

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::Serialize;
use tracing::info;

use super::issue::{self, Issue};
use super::EntityKind;
use crate::error::{Error, Result};
use crate::storage::{
    date, date_column, text, timestamp_column, Column, Database, Filter, Order, Record, Store,
    Table,
};
use crate::validate;

/// Top-level strategic plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Plan {
    const TABLE: Table = Table::Plans;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Plan {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            start_date: date_column(row, "start_date")?,
            end_date: date_column(row, "end_date")?,
            created_at: timestamp_column(row, "created_at")?,
            updated_at: timestamp_column(row, "updated_at")?,
        })
    }
}

/// Fields for a new plan
#[derive(Debug, Clone, Default)]
pub struct NewPlan {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Partial plan update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct PlanUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Plan manager
pub struct PlanManager<'a> {
    store: Store<'a>,
}

impl<'a> PlanManager<'a> {
    /// Create a new plan manager with database reference
    pub fn new(db: &'a Database) -> Self {
        Self {
            store: Store::new(db),
        }
    }

    /// Create a plan
    pub fn create(&self, plan: NewPlan) -> Result<Plan> {
        let name = validate::name("name", &plan.name)?;
        validate::date_range(plan.start_date, plan.end_date)?;

        let id = self.store.insert(
            Table::Plans,
            vec![
                ("name", Value::Text(name)),
                ("description", text(validate::optional_text(plan.description.as_deref()))),
                ("start_date", date(plan.start_date)),
                ("end_date", date(plan.end_date)),
            ],
        )?;
        info!("Created plan {}", id);
        self.show(id)
    }

    /// All plans in creation order
    pub fn list(&self) -> Result<Vec<Plan>> {
        self.store.list(Filter::All, Order::Insertion)
    }

    /// One plan by id
    pub fn show(&self, id: i64) -> Result<Plan> {
        self.store
            .get(id)?
            .ok_or_else(|| Error::not_found(EntityKind::Plan, id))
    }

    /// Apply a partial update
    pub fn update(&self, id: i64, update: PlanUpdate) -> Result<Plan> {
        let current = self.show(id)?;

        let mut columns: Vec<Column> = Vec::new();
        if let Some(name) = update.name.as_deref() {
            columns.push(("name", Value::Text(validate::name("name", name)?)));
        }
        if let Some(description) = update.description.as_deref() {
            columns.push(("description", text(validate::optional_text(Some(description)))));
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

        let plan = self
            .store
            .update(id, columns)?
            .ok_or_else(|| Error::not_found(EntityKind::Plan, id))?;
        info!("Updated plan {}", id);
        Ok(plan)
    }

    /// Number of issues, KPIs, and initiatives under a plan
    pub fn descendant_count(&self, id: i64) -> Result<usize> {
        let issues: Vec<Issue> = self
            .store
            .list(Filter::Eq("plan_id", Value::Integer(id)), Order::Insertion)?;
        let mut count = issues.len();
        for issue in &issues {
            count += issue::child_count(&self.store, issue.id)?;
        }
        Ok(count)
    }

    /// Delete a plan
    ///
    /// A plan that owns issues is only removed when `force` is set, in which
    /// case its issues and their KPIs and initiatives go first. Returns the
    /// number of descendants removed.
    pub fn delete(&self, id: i64, force: bool) -> Result<usize> {
        if !self.store.exists(Table::Plans, id)? {
            return Err(Error::not_found(EntityKind::Plan, id));
        }

        let children = self.descendant_count(id)?;
        if children > 0 && !force {
            return Err(Error::ConfirmationRequired {
                entity: EntityKind::Plan,
                id,
                children,
            });
        }

        let tx = self.store.transaction()?;
        let issues: Vec<Issue> = self
            .store
            .list(Filter::Eq("plan_id", Value::Integer(id)), Order::Insertion)?;
        let mut removed = 0;
        for issue in &issues {
            removed += issue::delete_children(&self.store, issue.id)?;
        }
        removed += self
            .store
            .delete_where(Table::Issues, Filter::Eq("plan_id", Value::Integer(id)))?;
        self.store.delete(Table::Plans, id)?;
        tx.commit()?;

        info!("Deleted plan {} with {} descendant(s)", id, removed);
        Ok(removed)
    }
}
