//! `strateplan kpi ...`

use anyhow::Result;
use clap::Subcommand;
use strateplan_core::format::{self, TextTable};
use strateplan_core::{Database, Kpi, KpiManager, KpiProgress, KpiUpdate, NewKpi};

use crate::output;

const BAR_WIDTH: usize = 20;

#[derive(Subcommand)]
pub enum KpiCommand {
    /// Create a KPI for an issue
    Create {
        issue_id: i64,
        name: String,
        #[arg(long = "desc")]
        description: Option<String>,
        /// Target value
        #[arg(long = "target", allow_negative_numbers = true)]
        target_value: Option<f64>,
        /// Current value
        #[arg(long = "current", allow_negative_numbers = true)]
        current_value: Option<f64>,
        /// Unit of measure, e.g. "%" or "USD"
        #[arg(long)]
        unit: Option<String>,
    },

    /// List the KPIs of an issue
    List { issue_id: i64 },

    /// Show one KPI with its progress
    Show { kpi_id: i64 },

    /// Update fields of a KPI
    Update {
        kpi_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "desc")]
        description: Option<String>,
        #[arg(long = "target", allow_negative_numbers = true)]
        target_value: Option<f64>,
        #[arg(long = "current", allow_negative_numbers = true)]
        current_value: Option<f64>,
        #[arg(long)]
        unit: Option<String>,
    },

    /// Delete a KPI
    Delete {
        kpi_id: i64,
        /// KPIs have no dependents, so this never changes the outcome
        #[arg(long)]
        force: bool,
    },
}

pub fn run(command: KpiCommand, db: &Database) -> Result<()> {
    let kpis = KpiManager::new(db);

    match command {
        KpiCommand::Create {
            issue_id,
            name,
            description,
            target_value,
            current_value,
            unit,
        } => {
            let kpi = kpis.create(NewKpi {
                issue_id,
                name,
                description,
                target_value,
                current_value,
                unit,
            })?;
            output::success(&format!(
                "Created KPI {} (ID: {}) for issue {}",
                kpi.name, kpi.id, kpi.issue_id
            ));
        }
        KpiCommand::List { issue_id } => {
            output::table(&kpi_table(&kpis.list(issue_id)?), "No KPIs found.");
        }
        KpiCommand::Show { kpi_id } => print_kpi(&kpis.progress(kpi_id)?),
        KpiCommand::Update {
            kpi_id,
            name,
            description,
            target_value,
            current_value,
            unit,
        } => {
            let kpi = kpis.update(
                kpi_id,
                KpiUpdate {
                    name,
                    description,
                    target_value,
                    current_value,
                    unit,
                },
            )?;
            output::success(&format!("Updated KPI {} (ID: {})", kpi.name, kpi.id));
        }
        KpiCommand::Delete { kpi_id, force: _ } => {
            kpis.delete(kpi_id)?;
            output::success(&format!("Deleted KPI {}", kpi_id));
        }
    }
    Ok(())
}

pub(crate) fn kpi_table(kpis: &[Kpi]) -> TextTable {
    let mut table = TextTable::new(["ID", "Name", "Target", "Current", "Unit", "Progress"]);
    for kpi in kpis {
        table.row([
            kpi.id.to_string(),
            kpi.name.clone(),
            format::number(kpi.target_value),
            format::number(kpi.current_value),
            format::or_dash(kpi.unit.as_deref()),
            format::progress_bar(kpi.current_value, kpi.target_value, BAR_WIDTH),
        ]);
    }
    table
}

fn print_kpi(progress: &KpiProgress) {
    let kpi = &progress.kpi;
    let status = match progress.progress {
        Some(_) if progress.achieved => "achieved",
        Some(_) => "in progress",
        None => "not measurable",
    };

    output::heading(&format!("KPI {}", kpi.id));
    output::details(&[
        ("Issue", kpi.issue_id.to_string()),
        ("Name", kpi.name.clone()),
        ("Description", format::or_dash(kpi.description.as_deref())),
        ("Target", format::number(kpi.target_value)),
        ("Current", format::number(kpi.current_value)),
        ("Unit", format::or_dash(kpi.unit.as_deref())),
        (
            "Progress",
            format::progress_bar(kpi.current_value, kpi.target_value, BAR_WIDTH),
        ),
        ("Status", status.to_string()),
        ("Created", output::timestamp(&kpi.created_at)),
        ("Updated", output::timestamp(&kpi.updated_at)),
    ]);
}
