//! Plan summary reports
//!
//! The aggregator walks plan → issues → (KPIs, initiatives) through the
//! store and assembles a nested [`PlanReport`]. It never writes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entities::{EntityKind, Initiative, InitiativeStatus, Issue, Kpi, Plan};
use crate::error::{Error, Result};
use crate::storage::{Database, Filter, Order, Store};

mod render;

pub use render::render;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    #[default]
    Table,
    Json,
}

impl ReportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportFormat::Text => "text",
            ReportFormat::Table => "table",
            ReportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "table" => Ok(ReportFormat::Table),
            "json" => Ok(ReportFormat::Json),
            other => Err(Error::validation(
                "format",
                format!("'{}' is not one of: text, table, json", other),
            )),
        }
    }
}

/// Initiatives in one status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: InitiativeStatus,
    pub count: usize,
}

/// Per-issue aggregates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueStats {
    pub kpi_count: usize,
    pub kpi_achieved: usize,
    /// Mean progress of the KPIs whose progress is computable
    pub kpi_progress: Option<f64>,
    pub initiative_count: usize,
    pub initiative_status: Vec<StatusCount>,
    pub budget: f64,
}

/// One issue with its children
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueReport {
    pub issue: Issue,
    pub kpis: Vec<Kpi>,
    pub initiatives: Vec<Initiative>,
    pub stats: IssueStats,
}

/// Plan-wide aggregates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTotals {
    pub issue_count: usize,
    pub kpi_count: usize,
    pub kpi_achieved: usize,
    pub initiative_count: usize,
    pub initiative_status: Vec<StatusCount>,
    pub total_budget: f64,
}

/// Nested summary of a plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanReport {
    pub plan: Plan,
    pub issues: Vec<IssueReport>,
    pub totals: ReportTotals,
    pub generated_at: DateTime<Utc>,
}

fn status_counts<'i>(initiatives: impl Iterator<Item = &'i Initiative> + Clone) -> Vec<StatusCount> {
    InitiativeStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: initiatives.clone().filter(|i| i.status == status).count(),
        })
        .collect()
}

impl IssueStats {
    fn compute(kpis: &[Kpi], initiatives: &[Initiative]) -> Self {
        let progress: Vec<f64> = kpis.iter().filter_map(Kpi::progress).collect();
        let kpi_progress = if progress.is_empty() {
            None
        } else {
            Some(progress.iter().sum::<f64>() / progress.len() as f64)
        };

        IssueStats {
            kpi_count: kpis.len(),
            kpi_achieved: kpis.iter().filter(|k| k.is_achieved()).count(),
            kpi_progress,
            initiative_count: initiatives.len(),
            initiative_status: status_counts(initiatives.iter()),
            budget: initiatives.iter().filter_map(|i| i.budget).sum(),
        }
    }
}

/// Builds plan reports straight from the store
pub struct ReportAggregator<'a> {
    store: Store<'a>,
}

impl<'a> ReportAggregator<'a> {
    /// Create a new aggregator with database reference
    pub fn new(db: &'a Database) -> Self {
        Self {
            store: Store::new(db),
        }
    }

    /// Summarize a plan and everything under it
    ///
    /// Issues come ordered by priority (unset first), ties by creation order.
    pub fn plan_summary(&self, plan_id: i64) -> Result<PlanReport> {
        let plan: Plan = self
            .store
            .get(plan_id)?
            .ok_or_else(|| Error::not_found(EntityKind::Plan, plan_id))?;

        let issues: Vec<Issue> = self.store.list(
            Filter::Eq("plan_id", Value::Integer(plan_id)),
            Order::Priority,
        )?;

        let mut reports = Vec::with_capacity(issues.len());
        for issue in issues {
            let by_issue = Filter::Eq("issue_id", Value::Integer(issue.id));
            let kpis: Vec<Kpi> = self.store.list(by_issue.clone(), Order::Insertion)?;
            let initiatives: Vec<Initiative> = self.store.list(by_issue, Order::Insertion)?;
            let stats = IssueStats::compute(&kpis, &initiatives);
            reports.push(IssueReport {
                issue,
                kpis,
                initiatives,
                stats,
            });
        }

        let totals = ReportTotals {
            issue_count: reports.len(),
            kpi_count: reports.iter().map(|r| r.stats.kpi_count).sum(),
            kpi_achieved: reports.iter().map(|r| r.stats.kpi_achieved).sum(),
            initiative_count: reports.iter().map(|r| r.stats.initiative_count).sum(),
            initiative_status: status_counts(reports.iter().flat_map(|r| r.initiatives.iter())),
            total_budget: reports.iter().map(|r| r.stats.budget).sum(),
        };
        debug!(
            "Report for plan {}: {} issue(s), {} KPI(s), {} initiative(s)",
            plan_id, totals.issue_count, totals.kpi_count, totals.initiative_count
        );

        Ok(PlanReport {
            plan,
            issues: reports,
            totals,
            generated_at: Utc::now(),
        })
    }
}
