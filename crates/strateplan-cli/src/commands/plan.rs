//! `strateplan plan ...`

use anyhow::Result;
use clap::Subcommand;
use strateplan_core::format::{self, TextTable};
use strateplan_core::{Database, IssueManager, NewPlan, Plan, PlanManager, PlanUpdate};

use super::issue::issue_table;
use super::{date_arg, delete_confirmed};
use crate::output;

#[derive(Subcommand)]
pub enum PlanCommand {
    /// Create a new plan
    Create {
        name: String,
        /// Description
        #[arg(long = "desc")]
        description: Option<String>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,
    },

    /// List all plans
    List,

    /// Show one plan
    Show { plan_id: i64 },

    /// Update fields of a plan
    Update {
        plan_id: i64,
        #[arg(long)]
        name: Option<String>,
        /// New description; an empty string clears it
        #[arg(long = "desc")]
        description: Option<String>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
    },

    /// Delete a plan
    Delete {
        plan_id: i64,
        /// Also delete its issues, KPIs, and initiatives without asking
        #[arg(long)]
        force: bool,
    },
}

pub fn run(command: PlanCommand, db: &Database) -> Result<()> {
    let plans = PlanManager::new(db);

    match command {
        PlanCommand::Create {
            name,
            description,
            start_date,
            end_date,
        } => {
            let plan = plans.create(NewPlan {
                name,
                description,
                start_date: date_arg("start_date", start_date.as_deref())?,
                end_date: date_arg("end_date", end_date.as_deref())?,
            })?;
            output::success(&format!("Created plan {} (ID: {})", plan.name, plan.id));
        }
        PlanCommand::List => {
            let mut table = TextTable::new(["ID", "Name", "Period", "Description"]);
            for plan in plans.list()? {
                table.row([
                    plan.id.to_string(),
                    plan.name,
                    format::date_range(plan.start_date, plan.end_date),
                    format::or_dash(plan.description.as_deref()),
                ]);
            }
            output::table(&table, "No plans found.");
        }
        PlanCommand::Show { plan_id } => {
            let plan = plans.show(plan_id)?;
            let descendants = plans.descendant_count(plan_id)?;
            print_plan(&plan, descendants);

            println!();
            output::heading("Issues");
            let issues = IssueManager::new(db).list_by_priority(plan_id)?;
            output::table(&issue_table(&issues), "No issues found.");
        }
        PlanCommand::Update {
            plan_id,
            name,
            description,
            start_date,
            end_date,
        } => {
            let plan = plans.update(
                plan_id,
                PlanUpdate {
                    name,
                    description,
                    start_date: date_arg("start_date", start_date.as_deref())?,
                    end_date: date_arg("end_date", end_date.as_deref())?,
                },
            )?;
            output::success(&format!("Updated plan {} (ID: {})", plan.name, plan.id));
        }
        PlanCommand::Delete { plan_id, force } => {
            let removed = delete_confirmed(force, |force| plans.delete(plan_id, force))?;
            output::success(&format!(
                "Deleted plan {} and {} dependent record(s)",
                plan_id, removed
            ));
        }
    }
    Ok(())
}

fn print_plan(plan: &Plan, descendants: usize) {
    output::heading(&format!("Plan {}", plan.id));
    output::details(&[
        ("Name", plan.name.clone()),
        ("Description", format::or_dash(plan.description.as_deref())),
        ("Period", format::date_range(plan.start_date, plan.end_date)),
        ("Records", format!("{} dependent record(s)", descendants)),
        ("Created", output::timestamp(&plan.created_at)),
        ("Updated", output::timestamp(&plan.updated_at)),
    ]);
}
