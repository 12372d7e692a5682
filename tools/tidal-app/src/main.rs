//! `tidal` binary entry point.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tidal_app::app::App;
use tidal_app::cli::Cli;
use tidal_app::config::AppConfig;
use tidal_app::logger;
use tidal_log::{LogLevel, kerr, kinfo};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(LogLevel::Info);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            kerr!("Failed to load configuration, {err:#}");
            return ExitCode::FAILURE;
        }
    };
    if let Ok(level) = config.log_level() {
        tidal_log::set_max_level(level);
    }

    kinfo!("Initializing app...");
    let mut app = match App::init(&config) {
        Ok(app) => app,
        Err(err) => {
            kerr!("Failed to initialize app, {err:#}");
            return ExitCode::FAILURE;
        }
    };

    kinfo!("Running app...");
    let summary = match open_input(&cli).and_then(|input| app.run(input)) {
        Ok(summary) => summary,
        Err(err) => {
            kerr!("Failed to run app, {err:#}");
            return ExitCode::FAILURE;
        }
    };

    kinfo!(
        "App finished: {} records, {} bytes, {} evicted, {} pending, digest {:#010x}",
        summary.records,
        summary.bytes,
        summary.evicted,
        summary.pending,
        summary.digest
    );
    ExitCode::SUCCESS
}

/// File config, then CLI overrides, then validation.
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli(cli);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn open_input(cli: &Cli) -> Result<Box<dyn Read>> {
    match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}
