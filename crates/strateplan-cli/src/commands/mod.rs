//! Subcommand definitions and dispatch

use std::io::IsTerminal;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use strateplan_core::{validate, Config, Database, Error};

use crate::output;

pub mod config;
pub mod initiative;
pub mod issue;
pub mod kpi;
pub mod plan;
pub mod report;

#[derive(Subcommand)]
pub enum Commands {
    /// Manage strategic plans
    Plan {
        #[command(subcommand)]
        action: plan::PlanCommand,
    },

    /// Manage strategic issues within a plan
    Issue {
        #[command(subcommand)]
        action: issue::IssueCommand,
    },

    /// Manage KPIs of an issue
    Kpi {
        #[command(subcommand)]
        action: kpi::KpiCommand,
    },

    /// Manage initiatives of an issue
    Initiative {
        #[command(subcommand)]
        action: initiative::InitiativeCommand,
    },

    /// Generate reports
    Report {
        #[command(subcommand)]
        action: report::ReportCommand,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: config::ConfigCommand,
    },
}

/// Run a command
///
/// The config file is read and the database opened only by the commands
/// that need them; `config` subcommands handle the file themselves.
pub fn dispatch(command: Commands, db_flag: Option<&Path>, config_path: &Path) -> Result<()> {
    let load = || -> Result<Config> {
        Config::load_from_path(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))
    };
    let open = |config: &Config| -> Result<Database> {
        let path = config.resolve_db_path(db_flag);
        Database::new(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))
    };

    match command {
        Commands::Plan { action } => plan::run(action, &open(&load()?)?),
        Commands::Issue { action } => issue::run(action, &open(&load()?)?),
        Commands::Kpi { action } => kpi::run(action, &open(&load()?)?),
        Commands::Initiative { action } => initiative::run(action, &open(&load()?)?),
        Commands::Report { action } => {
            let config = load()?;
            report::run(action, &open(&config)?, &config)
        }
        Commands::Config { action } => config::run(action, config_path, db_flag),
    }
}

/// Parse an optional `YYYY-MM-DD` argument
pub(crate) fn date_arg(field: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    Ok(value.map(|v| validate::parse_date(field, v)).transpose()?)
}

/// Run a delete, asking before a cascade when stdin is a terminal
///
/// `delete` is called with the force flag; on a declined prompt the
/// original confirmation error is returned.
pub(crate) fn delete_confirmed<F>(force: bool, delete: F) -> Result<usize>
where
    F: Fn(bool) -> strateplan_core::Result<usize>,
{
    match delete(force) {
        Err(Error::ConfirmationRequired {
            entity,
            id,
            children,
        }) if std::io::stdin().is_terminal() => {
            let prompt = format!(
                "Delete {} {} and its {} dependent record(s)?",
                entity, id, children
            );
            if output::confirm(&prompt)? {
                Ok(delete(true)?)
            } else {
                output::warn("Aborted.");
                Err(Error::ConfirmationRequired {
                    entity,
                    id,
                    children,
                }
                .into())
            }
        }
        result => Ok(result?),
    }
}
