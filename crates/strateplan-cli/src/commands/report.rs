//! `strateplan report ...`

use anyhow::Result;
use clap::Subcommand;
use strateplan_core::report::{self, ReportAggregator, ReportFormat};
use strateplan_core::{Config, Database};

#[derive(Subcommand)]
pub enum ReportCommand {
    /// Summarize a plan with its issues, KPIs, and initiatives
    Plan {
        plan_id: i64,
        /// text, table, or json (defaults to the configured format)
        #[arg(long)]
        format: Option<String>,
    },
}

pub fn run(command: ReportCommand, db: &Database, config: &Config) -> Result<()> {
    match command {
        ReportCommand::Plan { plan_id, format } => {
            let format = match format.as_deref() {
                Some(name) => name.parse::<ReportFormat>()?,
                None => config.default_format,
            };
            let summary = ReportAggregator::new(db).plan_summary(plan_id)?;
            print!("{}", report::render(&summary, format)?);
            if format == ReportFormat::Json {
                println!();
            }
        }
    }
    Ok(())
}
