//! `strateplan config ...`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use strateplan_core::{paths, Config, ReportFormat};

use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the config file location and effective settings
    Show,

    /// Store the database path in the config file
    SetDb { path: PathBuf },

    /// Store the default report format (text, table, or json)
    SetFormat { format: String },
}

/// Current settings to update, or defaults when the file does not parse
///
/// Setting a value rewrites the whole file, which is how a broken file
/// gets repaired.
fn load_for_update(config_path: &Path) -> Config {
    match Config::load_from_path(config_path) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Ignoring unreadable config {:?}: {}", config_path, err);
            output::warn(&format!(
                "Could not read {} ({}); starting from defaults",
                config_path.display(),
                err
            ));
            Config::default()
        }
    }
}

pub fn run(command: ConfigCommand, config_path: &Path, db_flag: Option<&Path>) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let config = Config::load_from_path(config_path)
                .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
            output::heading("Configuration");
            output::details(&[
                ("Config file", config_path.display().to_string()),
                (
                    "Database",
                    config.resolve_db_path(db_flag).display().to_string(),
                ),
                ("Report format", config.default_format.to_string()),
                ("Log file", paths::log_file().display().to_string()),
            ]);
        }
        ConfigCommand::SetDb { path } => {
            // Stored absolute, resolved against the current directory
            let path = if path.is_relative() {
                std::env::current_dir()
                    .context("Failed to read the current directory")?
                    .join(path)
            } else {
                path
            };
            let updated = Config {
                db_path: Some(path.clone()),
                ..load_for_update(config_path)
            };
            updated.save_to_path(config_path)?;
            output::success(&format!("Database path set to {}", path.display()));
            if std::env::var_os(paths::DB_ENV).is_some() {
                output::warn(&format!(
                    "{} is set and takes precedence over the config file",
                    paths::DB_ENV
                ));
            }
        }
        ConfigCommand::SetFormat { format } => {
            let format = format.parse::<ReportFormat>()?;
            let updated = Config {
                default_format: format,
                ..load_for_update(config_path)
            };
            updated.save_to_path(config_path)?;
            output::success(&format!("Default report format set to {}", format));
        }
    }
    Ok(())
}
