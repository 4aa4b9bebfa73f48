//! `strateplan issue ...`

use anyhow::Result;
use clap::Subcommand;
use strateplan_core::format::{self, TextTable};
use strateplan_core::{
    Database, InitiativeManager, Issue, IssueManager, IssueUpdate, KpiManager, NewIssue,
    PlanManager,
};

use super::delete_confirmed;
use super::initiative::initiative_table;
use super::kpi::kpi_table;
use crate::output;

#[derive(Subcommand)]
pub enum IssueCommand {
    /// Create an issue within a plan
    Create {
        plan_id: i64,
        name: String,
        #[arg(long = "desc")]
        description: Option<String>,
        /// Priority, 1 is most important
        #[arg(long, allow_negative_numbers = true)]
        priority: Option<i64>,
    },

    /// List the issues of a plan by priority
    List { plan_id: i64 },

    /// Show one issue
    Show { issue_id: i64 },

    /// Update fields of an issue
    Update {
        issue_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "desc")]
        description: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        priority: Option<i64>,
    },

    /// Delete an issue
    Delete {
        issue_id: i64,
        /// Also delete its KPIs and initiatives without asking
        #[arg(long)]
        force: bool,
    },

    /// Set priorities 1..n in the order given
    Reorder {
        plan_id: i64,
        #[arg(required = true)]
        issue_ids: Vec<i64>,
    },
}

pub fn run(command: IssueCommand, db: &Database) -> Result<()> {
    let issues = IssueManager::new(db);

    match command {
        IssueCommand::Create {
            plan_id,
            name,
            description,
            priority,
        } => {
            let issue = issues.create(NewIssue {
                plan_id,
                name,
                description,
                priority,
            })?;
            output::success(&format!(
                "Created issue {} (ID: {}) in plan {}",
                issue.name, issue.id, issue.plan_id
            ));
        }
        IssueCommand::List { plan_id } => {
            output::table(&issue_table(&issues.list_by_priority(plan_id)?), "No issues found.");
        }
        IssueCommand::Show { issue_id } => {
            let issue = issues.show(issue_id)?;
            let plan = PlanManager::new(db).show(issue.plan_id)?;
            print_issue(&issue, &plan.name);

            println!();
            output::heading("KPIs");
            output::table(&kpi_table(&KpiManager::new(db).list(issue_id)?), "No KPIs found.");
            println!();
            output::heading("Initiatives");
            output::table(
                &initiative_table(&InitiativeManager::new(db).list(issue_id)?),
                "No initiatives found.",
            );
        }
        IssueCommand::Update {
            issue_id,
            name,
            description,
            priority,
        } => {
            let issue = issues.update(
                issue_id,
                IssueUpdate {
                    name,
                    description,
                    priority,
                },
            )?;
            output::success(&format!("Updated issue {} (ID: {})", issue.name, issue.id));
        }
        IssueCommand::Delete { issue_id, force } => {
            let removed = delete_confirmed(force, |force| issues.delete(issue_id, force))?;
            output::success(&format!(
                "Deleted issue {} and {} dependent record(s)",
                issue_id, removed
            ));
        }
        IssueCommand::Reorder { plan_id, issue_ids } => {
            let reordered = issues.reorder(plan_id, &issue_ids)?;
            output::success(&format!("Reordered {} issue(s)", issue_ids.len()));
            output::table(&issue_table(&reordered), "No issues found.");
        }
    }
    Ok(())
}

fn priority(issue: &Issue) -> String {
    issue
        .priority
        .map_or_else(|| "-".to_string(), |p| p.to_string())
}

pub(crate) fn issue_table(issues: &[Issue]) -> TextTable {
    let mut table = TextTable::new(["ID", "Priority", "Name", "Description"]);
    for issue in issues {
        table.row([
            issue.id.to_string(),
            priority(issue),
            issue.name.clone(),
            format::or_dash(issue.description.as_deref()),
        ]);
    }
    table
}

fn print_issue(issue: &Issue, plan_name: &str) {
    output::heading(&format!("Issue {}", issue.id));
    output::details(&[
        ("Plan", format!("{} (ID: {})", plan_name, issue.plan_id)),
        ("Name", issue.name.clone()),
        ("Description", format::or_dash(issue.description.as_deref())),
        ("Priority", priority(issue)),
        ("Created", output::timestamp(&issue.created_at)),
        ("Updated", output::timestamp(&issue.updated_at)),
    ]);
}
