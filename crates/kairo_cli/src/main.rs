//! `kairo` command-line entry point.
//!
//! # Responsibility
//! - Resolve per-user paths, start file logging, and dispatch one command.
//! - Map every failure to `error: <message>` on stderr and exit code 1.

mod cli;
mod config;
mod render;

use clap::Parser;
use cli::Cli;
use config::Paths;
use kairo_core::{default_log_level, init_logging, LoggingConfig};
use log::{error, info};
use std::time::Instant;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let paths = Paths::resolve(cli.db)?;
    let level = cli
        .log_level
        .unwrap_or_else(|| default_log_level().to_string());
    // Commands still run without file logs.
    if let Err(err) = LoggingConfig::new(&level, &paths.log_dir)
        .and_then(|config| init_logging(&config))
    {
        eprintln!("warning: logging disabled: {err}");
    }

    let command = cli.command.name();
    let started_at = Instant::now();
    let result = cli::execute(cli.command, &paths);
    match &result {
        Ok(()) => info!(
            "event=cli_command module=cli status=ok command={} duration_ms={}",
            command,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=cli_command module=cli status=error command={} duration_ms={} error={}",
            command,
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}
