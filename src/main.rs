//! linkbundle - command line link organizer
//!
//! Keeps links sorted into categories, bundles them up as share codes that
//! can be passed around and imported elsewhere, and tracks a small schedule
//! of activities that point at those links.

use clap::{CommandFactory, Parser};
use linkbundle::Config;
use linkbundle::cli::{self, Cli};
use std::error::Error;
use std::fs::{self, OpenOptions};
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "linkbundle.log";

/// Application entry point
/// Loads the config, applies command line overrides, sets up file logging
/// and runs the requested command.
fn main() -> Result<(), Box<dyn Error>> {
    color_eyre::install()?;

    let args = Cli::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(data_dir) = args.data_dir {
        config.data_dir = Some(data_dir);
    }

    init_logging(&config)?;

    let Some(command) = args.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    cli::execute(command, &config)?;
    Ok(())
}

/// Log to `<data dir>/logs/linkbundle.log`; RUST_LOG wins over the config
fn init_logging(config: &Config) -> Result<(), Box<dyn Error>> {
    let Some(logs_dir) = config.logs_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&logs_dir)?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(logs_dir.join(LOG_FILE_NAME))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();
    Ok(())
}
