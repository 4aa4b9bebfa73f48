//! Strategic issue CRUD operations

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::Serialize;
use tracing::info;

use super::EntityKind;
use crate::error::{Error, Result};
use crate::storage::{
    text, timestamp_column, Column, Database, Filter, Order, Record, Store, Table,
};
use crate::validate;

/// Strategic issue owned by a plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub id: i64,
    pub plan_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Lower number = more important; unset sorts first
    pub priority: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Issue {
    const TABLE: Table = Table::Issues;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Issue {
            id: row.get("id")?,
            plan_id: row.get("plan_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            priority: row.get("priority")?,
            created_at: timestamp_column(row, "created_at")?,
            updated_at: timestamp_column(row, "updated_at")?,
        })
    }
}

/// Fields for a new issue
#[derive(Debug, Clone, Default)]
pub struct NewIssue {
    pub plan_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub priority: Option<i64>,
}

/// Partial issue update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct IssueUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i64>,
}

/// KPIs plus initiatives under an issue
pub(crate) fn child_count(store: &Store<'_>, issue_id: i64) -> Result<usize> {
    let kpis = store.count(Table::Kpis, Filter::Eq("issue_id", Value::Integer(issue_id)))?;
    let initiatives = store.count(
        Table::Initiatives,
        Filter::Eq("issue_id", Value::Integer(issue_id)),
    )?;
    Ok(kpis + initiatives)
}

/// Remove the KPIs and initiatives under an issue
pub(crate) fn delete_children(store: &Store<'_>, issue_id: i64) -> Result<usize> {
    let kpis = store.delete_where(Table::Kpis, Filter::Eq("issue_id", Value::Integer(issue_id)))?;
    let initiatives = store.delete_where(
        Table::Initiatives,
        Filter::Eq("issue_id", Value::Integer(issue_id)),
    )?;
    Ok(kpis + initiatives)
}

/// Issue manager
pub struct IssueManager<'a> {
    store: Store<'a>,
}

impl<'a> IssueManager<'a> {
    /// Create a new issue manager with database reference
    pub fn new(db: &'a Database) -> Self {
        Self {
            store: Store::new(db),
        }
    }

    fn require_plan(&self, plan_id: i64) -> Result<()> {
        if !self.store.exists(Table::Plans, plan_id)? {
            return Err(Error::not_found(EntityKind::Plan, plan_id));
        }
        Ok(())
    }

    /// Create an issue under an existing plan
    pub fn create(&self, issue: NewIssue) -> Result<Issue> {
        self.require_plan(issue.plan_id)?;
        let name = validate::name("name", &issue.name)?;
        let priority = issue.priority.map(validate::priority).transpose()?;

        let id = self.store.insert(
            Table::Issues,
            vec![
                ("plan_id", Value::Integer(issue.plan_id)),
                ("name", Value::Text(name)),
                ("description", text(validate::optional_text(issue.description.as_deref()))),
                ("priority", priority.map_or(Value::Null, Value::Integer)),
            ],
        )?;
        info!("Created issue {} under plan {}", id, issue.plan_id);
        self.show(id)
    }

    /// Issues of a plan in creation order
    pub fn list(&self, plan_id: i64) -> Result<Vec<Issue>> {
        self.require_plan(plan_id)?;
        self.store.list(
            Filter::Eq("plan_id", Value::Integer(plan_id)),
            Order::Insertion,
        )
    }

    /// Issues of a plan by priority, then creation order
    pub fn list_by_priority(&self, plan_id: i64) -> Result<Vec<Issue>> {
        self.require_plan(plan_id)?;
        self.store.list(
            Filter::Eq("plan_id", Value::Integer(plan_id)),
            Order::Priority,
        )
    }

    /// One issue by id
    pub fn show(&self, id: i64) -> Result<Issue> {
        self.store
            .get(id)?
            .ok_or_else(|| Error::not_found(EntityKind::Issue, id))
    }

    /// Apply a partial update
    pub fn update(&self, id: i64, update: IssueUpdate) -> Result<Issue> {
        if !self.store.exists(Table::Issues, id)? {
            return Err(Error::not_found(EntityKind::Issue, id));
        }

        let mut columns: Vec<Column> = Vec::new();
        if let Some(name) = update.name.as_deref() {
            columns.push(("name", Value::Text(validate::name("name", name)?)));
        }
        if let Some(description) = update.description.as_deref() {
            columns.push(("description", text(validate::optional_text(Some(description)))));
        }
        if let Some(priority) = update.priority {
            columns.push(("priority", Value::Integer(validate::priority(priority)?)));
        }

        let issue = self
            .store
            .update(id, columns)?
            .ok_or_else(|| Error::not_found(EntityKind::Issue, id))?;
        info!("Updated issue {}", id);
        Ok(issue)
    }

    /// Delete an issue
    ///
    /// An issue that owns KPIs or initiatives is only removed when `force`
    /// is set. Returns the number of descendants removed.
    pub fn delete(&self, id: i64, force: bool) -> Result<usize> {
        if !self.store.exists(Table::Issues, id)? {
            return Err(Error::not_found(EntityKind::Issue, id));
        }

        let children = child_count(&self.store, id)?;
        if children > 0 && !force {
            return Err(Error::ConfirmationRequired {
                entity: EntityKind::Issue,
                id,
                children,
            });
        }

        let tx = self.store.transaction()?;
        let removed = delete_children(&self.store, id)?;
        self.store.delete(Table::Issues, id)?;
        tx.commit()?;

        info!("Deleted issue {} with {} descendant(s)", id, removed);
        Ok(removed)
    }

    /// Assign priorities 1..n to the given issues, in order
    ///
    /// Issues of the plan not named keep their current priority.
    pub fn reorder(&self, plan_id: i64, issue_ids: &[i64]) -> Result<Vec<Issue>> {
        let owned: HashSet<i64> = self.list(plan_id)?.iter().map(|i| i.id).collect();

        let mut seen = HashSet::new();
        for id in issue_ids {
            if !owned.contains(id) {
                return Err(Error::validation(
                    "issue_ids",
                    format!("issue {} does not belong to plan {}", id, plan_id),
                ));
            }
            if !seen.insert(*id) {
                return Err(Error::validation(
                    "issue_ids",
                    format!("issue {} is listed more than once", id),
                ));
            }
        }

        let tx = self.store.transaction()?;
        for (position, id) in issue_ids.iter().enumerate() {
            self.store.update::<Issue>(
                *id,
                vec![("priority", Value::Integer(position as i64 + 1))],
            )?;
        }
        tx.commit()?;

        info!("Reordered {} issue(s) in plan {}", issue_ids.len(), plan_id);
        self.list_by_priority(plan_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{IssueManager, IssueUpdate, NewIssue};
    use crate::entities::test_support::create_test_db;
    use crate::entities::{
        InitiativeManager, KpiManager, NewInitiative, NewKpi, NewPlan, PlanManager,
    };
    use crate::error::Error;
    use crate::storage::Database;

    fn create_plan(db: &Database) -> i64 {
        PlanManager::new(db)
            .create(NewPlan {
                name: "Plan".into(),
                ..Default::default()
            })
            .expect("Failed to create plan")
            .id
    }

    fn new_issue(plan_id: i64, name: &str, priority: Option<i64>) -> NewIssue {
        NewIssue {
            plan_id,
            name: name.into(),
            description: None,
            priority,
        }
    }

    #[test]
    fn test_create_under_missing_plan_is_not_found() {
        let (db, _temp) = create_test_db();
        let issues = IssueManager::new(&db);

        let result = issues.create(new_issue(999, "Orphan", None));
        assert!(matches!(result, Err(Error::NotFound { id: 999, .. })));
    }

    #[test]
    fn test_create_validates_priority() {
        let (db, _temp) = create_test_db();
        let plan_id = create_plan(&db);
        let issues = IssueManager::new(&db);

        let result = issues.create(new_issue(plan_id, "Zero", Some(0)));
        assert!(matches!(result, Err(Error::Validation { field: "priority", .. })));
    }

    #[test]
    fn test_list_is_creation_order_and_priority_order_differs() {
        let (db, _temp) = create_test_db();
        let plan_id = create_plan(&db);
        let issues = IssueManager::new(&db);

        let unset = issues.create(new_issue(plan_id, "Unset", None)).unwrap();
        let second = issues.create(new_issue(plan_id, "Second", Some(2))).unwrap();
        let first = issues.create(new_issue(plan_id, "First", Some(1))).unwrap();
        let tied = issues.create(new_issue(plan_id, "Tied", Some(1))).unwrap();

        let listed: Vec<i64> = issues.list(plan_id).unwrap().iter().map(|i| i.id).collect();
        assert_eq!(listed, vec![unset.id, second.id, first.id, tied.id]);

        let ranked: Vec<i64> = issues
            .list_by_priority(plan_id)
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ranked, vec![unset.id, first.id, tied.id, second.id]);
    }

    #[test]
    fn test_list_of_missing_plan_is_not_found() {
        let (db, _temp) = create_test_db();
        let issues = IssueManager::new(&db);

        assert!(matches!(issues.list(5), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_update_priority_only() {
        let (db, _temp) = create_test_db();
        let plan_id = create_plan(&db);
        let issues = IssueManager::new(&db);

        let issue = issues
            .create(NewIssue {
                plan_id,
                name: "Retention".into(),
                description: Some("Keep customers".into()),
                priority: Some(3),
            })
            .unwrap();

        let updated = issues
            .update(
                issue.id,
                IssueUpdate {
                    priority: Some(1),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.priority, Some(1));
        assert_eq!(updated.name, "Retention");
        assert_eq!(updated.description.as_deref(), Some("Keep customers"));
        assert_eq!(updated.plan_id, plan_id);

        let result = issues.update(
            issue.id,
            IssueUpdate {
                name: Some("".into()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn test_delete_with_children_requires_force() {
        let (db, _temp) = create_test_db();
        let plan_id = create_plan(&db);
        let issues = IssueManager::new(&db);
        let kpis = KpiManager::new(&db);
        let initiatives = InitiativeManager::new(&db);

        let issue = issues.create(new_issue(plan_id, "Busy", None)).unwrap();
        let kpi = kpis
            .create(NewKpi {
                issue_id: issue.id,
                name: "Coverage".into(),
                ..Default::default()
            })
            .unwrap();
        let initiative = initiatives
            .create(NewInitiative {
                issue_id: issue.id,
                name: "Rollout".into(),
                ..Default::default()
            })
            .unwrap();

        assert!(matches!(
            issues.delete(issue.id, false),
            Err(Error::ConfirmationRequired { children: 2, .. })
        ));
        assert!(kpis.show(kpi.id).is_ok());

        assert_eq!(issues.delete(issue.id, true).unwrap(), 2);
        assert!(issues.show(issue.id).is_err());
        assert!(kpis.show(kpi.id).is_err());
        assert!(initiatives.show(initiative.id).is_err());
    }

    #[test]
    fn test_delete_childless_issue_without_force() {
        let (db, _temp) = create_test_db();
        let plan_id = create_plan(&db);
        let issues = IssueManager::new(&db);

        let issue = issues.create(new_issue(plan_id, "Lonely", None)).unwrap();
        assert_eq!(issues.delete(issue.id, false).unwrap(), 0);
        assert!(issues.list(plan_id).unwrap().is_empty());
    }

    #[test]
    fn test_reorder_assigns_sequential_priorities() {
        let (db, _temp) = create_test_db();
        let plan_id = create_plan(&db);
        let issues = IssueManager::new(&db);

        let a = issues.create(new_issue(plan_id, "A", Some(1))).unwrap();
        let b = issues.create(new_issue(plan_id, "B", Some(2))).unwrap();
        let c = issues.create(new_issue(plan_id, "C", None)).unwrap();

        let reordered = issues.reorder(plan_id, &[c.id, a.id, b.id]).unwrap();
        let order: Vec<(i64, Option<i64>)> =
            reordered.iter().map(|i| (i.id, i.priority)).collect();
        assert_eq!(order, vec![(c.id, Some(1)), (a.id, Some(2)), (b.id, Some(3))]);
    }

    #[test]
    fn test_reorder_rejects_foreign_and_duplicate_ids() {
        let (db, _temp) = create_test_db();
        let plan_id = create_plan(&db);
        let other_plan = create_plan(&db);
        let issues = IssueManager::new(&db);

        let mine = issues.create(new_issue(plan_id, "Mine", Some(1))).unwrap();
        let theirs = issues.create(new_issue(other_plan, "Theirs", None)).unwrap();

        assert!(matches!(
            issues.reorder(plan_id, &[mine.id, theirs.id]),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            issues.reorder(plan_id, &[mine.id, mine.id]),
            Err(Error::Validation { .. })
        ));
        assert_eq!(issues.show(mine.id).unwrap().priority, Some(1));
    }
}
