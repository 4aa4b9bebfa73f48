//! Planning entities and their managers
//!
//! The hierarchy is plan → issue → (KPI, initiative). Each manager checks
//! that a parent exists before writing, and refuses to delete an entity
//! that still owns children unless asked to cascade.

use std::fmt;

use serde::Serialize;

mod initiative;
mod issue;
mod kpi;
mod plan;

pub use initiative::{Initiative, InitiativeManager, InitiativeStatus, InitiativeUpdate, NewInitiative};
pub use issue::{Issue, IssueManager, IssueUpdate, NewIssue};
pub use kpi::{Kpi, KpiManager, KpiProgress, KpiUpdate, NewKpi};
pub use plan::{NewPlan, Plan, PlanManager, PlanUpdate};

/// The four entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Plan,
    Issue,
    Kpi,
    Initiative,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Plan => "plan",
            EntityKind::Issue => "issue",
            EntityKind::Kpi => "KPI",
            EntityKind::Initiative => "initiative",
        };
        f.write_str(label)
    }
}
