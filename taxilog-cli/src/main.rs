//! Taxilog CLI - Main entry point

mod commands;
mod config;
mod logger;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use config::Config;

#[derive(Parser, Debug)]
#[command(author, version, about = "Backup, export and restore for taxilog data directories")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Snapshot the data directory into a dated JSON backup
    Backup,
    /// Export the data directory as a spreadsheet workbook
    Export,
    /// Restore the data directory from a backup file or a spreadsheet
    Restore {
        /// Backup JSON file to restore from
        #[arg(long, value_name = "FILE", conflicts_with = "sheet")]
        file: Option<PathBuf>,

        /// Spreadsheet id to restore from
        #[arg(long, value_name = "ID")]
        sheet: Option<String>,
    },
    /// Show what a backup file contains without touching the store
    Inspect {
        /// Backup JSON file to inspect
        file: PathBuf,
    },
    /// Fill the data directory with a small demo data set
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_ref())?;

    let log_level = args.log_level.as_deref().unwrap_or(&config.log.level);
    logger::init(log_level);

    tracing::info!("taxilog v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Data directory: {}", config.storage.data_dir.display());

    match args.command {
        Command::Backup => commands::run_backup(&config).await,
        Command::Export => commands::run_export(&config).await,
        Command::Restore { file, sheet } => commands::run_restore(&config, file, sheet).await,
        Command::Inspect { file } => commands::run_inspect(&file).await,
        Command::Seed => commands::run_seed(&config).await,
    }
}
