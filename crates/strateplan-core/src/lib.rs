//! Strateplan Core - storage, entity managers, and reports for strategic plans
//!
//! This crate provides everything behind the `strateplan` CLI:
//! - SQLite storage with versioned migrations
//! - Managers for plans, issues, KPIs, and initiatives
//! - Plan summary reports in text, table, and JSON form
//! - User configuration and filesystem paths

pub mod config;
pub mod entities;
pub mod error;
pub mod format;
pub mod paths;
pub mod report;
pub mod storage;
pub mod validate;

// Re-exports for convenience
pub use config::Config;
pub use entities::{
    EntityKind, Initiative, InitiativeManager, InitiativeStatus, InitiativeUpdate, Issue,
    IssueManager, IssueUpdate, Kpi, KpiManager, KpiProgress, KpiUpdate, NewInitiative, NewIssue,
    NewKpi, NewPlan, Plan, PlanManager, PlanUpdate,
};
pub use error::{Error, Result};
pub use report::{PlanReport, ReportAggregator, ReportFormat};
pub use storage::Database;
