//! KPI CRUD operations

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::Serialize;
use tracing::info;

use super::EntityKind;
use crate::error::{Error, Result};
use crate::storage::{
    real, text, timestamp_column, Column, Database, Filter, Order, Record, Store, Table,
};
use crate::validate;

/// Key performance indicator owned by an issue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub id: i64,
    pub issue_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub unit: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Kpi {
    /// Current value as a percentage of target
    ///
    /// `None` when either value is unset or the target is zero.
    pub fn progress(&self) -> Option<f64> {
        match (self.current_value, self.target_value) {
            (Some(current), Some(target)) if target != 0.0 => Some(current / target * 100.0),
            _ => None,
        }
    }

    /// Whether the KPI has reached its target
    pub fn is_achieved(&self) -> bool {
        self.progress().is_some_and(|p| p >= 100.0)
    }
}

impl Record for Kpi {
    const TABLE: Table = Table::Kpis;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Kpi {
            id: row.get("id")?,
            issue_id: row.get("issue_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            target_value: row.get("target_value")?,
            current_value: row.get("current_value")?,
            unit: row.get("unit")?,
            created_at: timestamp_column(row, "created_at")?,
            updated_at: timestamp_column(row, "updated_at")?,
        })
    }
}

/// Fields for a new KPI
#[derive(Debug, Clone, Default)]
pub struct NewKpi {
    pub issue_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub unit: Option<String>,
}

/// Partial KPI update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct KpiUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub unit: Option<String>,
}

/// KPI with its computed progress
#[derive(Debug, Clone, Serialize)]
pub struct KpiProgress {
    pub kpi: Kpi,
    pub progress: Option<f64>,
    pub achieved: bool,
}

/// KPI manager
pub struct KpiManager<'a> {
    store: Store<'a>,
}

impl<'a> KpiManager<'a> {
    /// Create a new KPI manager with database reference
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

    /// Create a KPI under an existing issue
    pub fn create(&self, kpi: NewKpi) -> Result<Kpi> {
        self.require_issue(kpi.issue_id)?;
        let name = validate::name("name", &kpi.name)?;
        let target = kpi
            .target_value
            .map(|v| validate::finite("target_value", v))
            .transpose()?;
        let current = kpi
            .current_value
            .map(|v| validate::finite("current_value", v))
            .transpose()?;

        let id = self.store.insert(
            Table::Kpis,
            vec![
                ("issue_id", Value::Integer(kpi.issue_id)),
                ("name", Value::Text(name)),
                ("description", text(validate::optional_text(kpi.description.as_deref()))),
                ("target_value", real(target)),
                ("current_value", real(current)),
                ("unit", text(validate::optional_text(kpi.unit.as_deref()))),
            ],
        )?;
        info!("Created KPI {} under issue {}", id, kpi.issue_id);
        self.show(id)
    }

    /// KPIs of an issue in creation order
    pub fn list(&self, issue_id: i64) -> Result<Vec<Kpi>> {
        self.require_issue(issue_id)?;
        self.store.list(
            Filter::Eq("issue_id", Value::Integer(issue_id)),
            Order::Insertion,
        )
    }

    /// One KPI by id
    pub fn show(&self, id: i64) -> Result<Kpi> {
        self.store
            .get(id)?
            .ok_or_else(|| Error::not_found(EntityKind::Kpi, id))
    }

    /// Apply a partial update
    pub fn update(&self, id: i64, update: KpiUpdate) -> Result<Kpi> {
        if !self.store.exists(Table::Kpis, id)? {
            return Err(Error::not_found(EntityKind::Kpi, id));
        }

        let mut columns: Vec<Column> = Vec::new();
        if let Some(name) = update.name.as_deref() {
            columns.push(("name", Value::Text(validate::name("name", name)?)));
        }
        if let Some(description) = update.description.as_deref() {
            columns.push(("description", text(validate::optional_text(Some(description)))));
        }
        if let Some(target) = update.target_value {
            columns.push(("target_value", Value::Real(validate::finite("target_value", target)?)));
        }
        if let Some(current) = update.current_value {
            columns.push(("current_value", Value::Real(validate::finite("current_value", current)?)));
        }
        if let Some(unit) = update.unit.as_deref() {
            columns.push(("unit", text(validate::optional_text(Some(unit)))));
        }

        let kpi = self
            .store
            .update(id, columns)?
            .ok_or_else(|| Error::not_found(EntityKind::Kpi, id))?;
        info!("Updated KPI {}", id);
        Ok(kpi)
    }

    /// Delete a KPI (leaf entity, never needs confirmation)
    pub fn delete(&self, id: i64) -> Result<()> {
        if !self.store.delete(Table::Kpis, id)? {
            return Err(Error::not_found(EntityKind::Kpi, id));
        }
        info!("Deleted KPI {}", id);
        Ok(())
    }

    /// KPI with its progress percentage and achieved flag
    pub fn progress(&self, id: i64) -> Result<KpiProgress> {
        let kpi = self.show(id)?;
        Ok(KpiProgress {
            progress: kpi.progress(),
            achieved: kpi.is_achieved(),
            kpi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{KpiManager, KpiUpdate, NewKpi};
    use crate::entities::test_support::create_test_db;
    use crate::entities::{IssueManager, NewIssue, NewPlan, PlanManager};
    use crate::error::Error;
    use crate::storage::Database;

    fn create_issue(db: &Database) -> i64 {
        let plan = PlanManager::new(db)
            .create(NewPlan {
                name: "Plan".into(),
                ..Default::default()
            })
            .expect("Failed to create plan");
        IssueManager::new(db)
            .create(NewIssue {
                plan_id: plan.id,
                name: "Issue".into(),
                ..Default::default()
            })
            .expect("Failed to create issue")
            .id
    }

    #[test]
    fn test_create_under_missing_issue_is_not_found() {
        let (db, _temp) = create_test_db();
        let kpis = KpiManager::new(&db);

        let result = kpis.create(NewKpi {
            issue_id: 77,
            name: "Orphan".into(),
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::NotFound { id: 77, .. })));
    }

    #[test]
    fn test_progress_and_achievement() {
        let (db, _temp) = create_test_db();
        let issue_id = create_issue(&db);
        let kpis = KpiManager::new(&db);

        let kpi = kpis
            .create(NewKpi {
                issue_id,
                name: "Satisfaction".into(),
                target_value: Some(90.0),
                current_value: Some(75.0),
                unit: Some("%".into()),
                ..Default::default()
            })
            .unwrap();

        let progress = kpis.progress(kpi.id).unwrap();
        let pct = progress.progress.expect("progress is computable");
        assert!((pct - 83.333).abs() < 0.01);
        assert!(!progress.achieved);

        let kpi = kpis
            .update(
                kpi.id,
                KpiUpdate {
                    current_value: Some(95.0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(kpi.is_achieved());
        assert_eq!(kpi.target_value, Some(90.0));
        assert_eq!(kpi.unit.as_deref(), Some("%"));
    }

    #[test]
    fn test_progress_undefined_for_zero_or_missing_target() {
        let (db, _temp) = create_test_db();
        let issue_id = create_issue(&db);
        let kpis = KpiManager::new(&db);

        let zero = kpis
            .create(NewKpi {
                issue_id,
                name: "Zero".into(),
                target_value: Some(0.0),
                current_value: Some(3.0),
                ..Default::default()
            })
            .unwrap();
        let missing = kpis
            .create(NewKpi {
                issue_id,
                name: "Missing".into(),
                current_value: Some(3.0),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(zero.progress(), None);
        assert_eq!(missing.progress(), None);
        assert!(!missing.is_achieved());
    }

    #[test]
    fn test_list_and_delete() {
        let (db, _temp) = create_test_db();
        let issue_id = create_issue(&db);
        let kpis = KpiManager::new(&db);

        let first = kpis
            .create(NewKpi {
                issue_id,
                name: "First".into(),
                ..Default::default()
            })
            .unwrap();
        let second = kpis
            .create(NewKpi {
                issue_id,
                name: "Second".into(),
                ..Default::default()
            })
            .unwrap();

        let ids: Vec<i64> = kpis.list(issue_id).unwrap().iter().map(|k| k.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);

        kpis.delete(first.id).unwrap();
        assert!(matches!(kpis.delete(first.id), Err(Error::NotFound { .. })));
        assert_eq!(kpis.list(issue_id).unwrap().len(), 1);
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let (db, _temp) = create_test_db();
        let issue_id = create_issue(&db);
        let kpis = KpiManager::new(&db);

        let result = kpis.create(NewKpi {
            issue_id,
            name: "Broken".into(),
            target_value: Some(f64::INFINITY),
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::Validation { field: "target_value", .. })));
    }
}
