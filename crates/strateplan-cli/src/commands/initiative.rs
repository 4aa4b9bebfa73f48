//! `strateplan initiative ...`

use anyhow::Result;
use clap::Subcommand;
use strateplan_core::format::{self, TextTable};
use strateplan_core::{
    Database, Initiative, InitiativeManager, InitiativeStatus, InitiativeUpdate, NewInitiative,
};

use super::date_arg;
use crate::output;

#[derive(Subcommand)]
pub enum InitiativeCommand {
    /// Create an initiative for an issue
    Create {
        issue_id: i64,
        name: String,
        #[arg(long = "desc")]
        description: Option<String>,
        /// planned, in_progress, completed, delayed, or cancelled
        #[arg(long)]
        status: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        budget: Option<f64>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,
    },

    /// List the initiatives of an issue, or all initiatives in a status
    List {
        #[arg(required_unless_present = "status")]
        issue_id: Option<i64>,
        /// Only initiatives in this status
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one initiative
    Show { initiative_id: i64 },

    /// Update fields of an initiative
    Update {
        initiative_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "desc")]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        budget: Option<f64>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
    },

    /// Delete an initiative
    Delete {
        initiative_id: i64,
        /// Initiatives have no dependents, so this never changes the outcome
        #[arg(long)]
        force: bool,
    },
}

fn status_arg(value: Option<&str>) -> Result<Option<InitiativeStatus>> {
    Ok(value.map(str::parse::<InitiativeStatus>).transpose()?)
}

pub fn run(command: InitiativeCommand, db: &Database) -> Result<()> {
    let initiatives = InitiativeManager::new(db);

    match command {
        InitiativeCommand::Create {
            issue_id,
            name,
            description,
            status,
            budget,
            start_date,
            end_date,
        } => {
            let initiative = initiatives.create(NewInitiative {
                issue_id,
                name,
                description,
                status: status_arg(status.as_deref())?,
                budget,
                start_date: date_arg("start_date", start_date.as_deref())?,
                end_date: date_arg("end_date", end_date.as_deref())?,
            })?;
            output::success(&format!(
                "Created initiative {} (ID: {}) for issue {}",
                initiative.name, initiative.id, initiative.issue_id
            ));
        }
        InitiativeCommand::List { issue_id, status } => {
            let status = status_arg(status.as_deref())?;
            let listed = match (issue_id, status) {
                (Some(issue_id), status) => initiatives
                    .list(issue_id)?
                    .into_iter()
                    .filter(|i| status.map_or(true, |s| i.status == s))
                    .collect(),
                (None, Some(status)) => initiatives.list_by_status(status)?,
                (None, None) => Vec::new(),
            };
            output::table(&initiative_table(&listed), "No initiatives found.");
        }
        InitiativeCommand::Show { initiative_id } => {
            print_initiative(&initiatives.show(initiative_id)?)
        }
        InitiativeCommand::Update {
            initiative_id,
            name,
            description,
            status,
            budget,
            start_date,
            end_date,
        } => {
            let initiative = initiatives.update(
                initiative_id,
                InitiativeUpdate {
                    name,
                    description,
                    status: status_arg(status.as_deref())?,
                    budget,
                    start_date: date_arg("start_date", start_date.as_deref())?,
                    end_date: date_arg("end_date", end_date.as_deref())?,
                },
            )?;
            output::success(&format!(
                "Updated initiative {} (ID: {})",
                initiative.name, initiative.id
            ));
        }
        InitiativeCommand::Delete {
            initiative_id,
            force: _,
        } => {
            initiatives.delete(initiative_id)?;
            output::success(&format!("Deleted initiative {}", initiative_id));
        }
    }
    Ok(())
}

pub(crate) fn initiative_table(initiatives: &[Initiative]) -> TextTable {
    let mut table = TextTable::new(["ID", "Issue", "Name", "Status", "Budget", "Period"]);
    for initiative in initiatives {
        table.row([
            initiative.id.to_string(),
            initiative.issue_id.to_string(),
            initiative.name.clone(),
            initiative.status.to_string(),
            format::optional_budget(initiative.budget),
            format::date_range(initiative.start_date, initiative.end_date),
        ]);
    }
    table
}

fn print_initiative(initiative: &Initiative) {
    output::heading(&format!("Initiative {}", initiative.id));
    output::details(&[
        ("Issue", initiative.issue_id.to_string()),
        ("Name", initiative.name.clone()),
        ("Description", format::or_dash(initiative.description.as_deref())),
        ("Status", initiative.status.to_string()),
        ("Budget", format::optional_budget(initiative.budget)),
        (
            "Period",
            format::date_range(initiative.start_date, initiative.end_date),
        ),
        ("Created", output::timestamp(&initiative.created_at)),
        ("Updated", output::timestamp(&initiative.updated_at)),
    ]);
}
