//! Strateplan - strategic planning from the terminal
//!
//! Keeps a hierarchy of plans, strategic issues, KPIs, and initiatives in a
//! local SQLite file and summarizes a plan as a text, table, or JSON report.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser};
use strateplan_core::{paths, Error};

mod commands;
mod output;

use commands::Commands;

/// Strateplan - plans, issues, KPIs, and initiatives
#[derive(Parser)]
#[command(name = "strateplan", version)]
#[command(about = "Manage strategic plans, issues, KPIs, and initiatives", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database file (overrides STRATEPLAN_DB and the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log more detail to the log file (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

/// Exit code for errors that are not strateplan errors
const UNEXPECTED_FAILURE: u8 = 5;

fn init_logging(verbose: u8) {
    // Log to file so records and reports on stdout stay clean
    let log_path = paths::log_file();
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir).ok();
    }

    let writer: Box<dyn std::io::Write + Send> = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => Box::new(file),
        Err(_) => Box::new(std::io::sink()),
    };

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::sync::Mutex::new(writer))
        .with_ansi(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    commands::dispatch(cli.command, cli.db.as_deref(), &paths::config_file())
}

/// Map an error to the process exit code
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .and_then(|e| u8::try_from(e.exit_code()).ok())
        .unwrap_or(UNEXPECTED_FAILURE)
}

fn main() -> ExitCode {
    // Usage errors exit with status 2 from here
    let cli = Cli::parse();
    init_logging(cli.verbose);
    tracing::debug!("strateplan {} starting", env!("CARGO_PKG_VERSION"));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::warn!("Command failed: {:#}", err);
            output::error(&format!("{:#}", err));
            ExitCode::from(exit_code(&err))
        }
    }
}
