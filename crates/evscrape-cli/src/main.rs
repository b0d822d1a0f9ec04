mod cli;
mod config;
mod format;
mod settings;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use evscrape_core::bootstrap_and_run;

use crate::cli::Cli;
use crate::config::Config;
use crate::format::format_record;
use crate::settings::Settings;
use crate::util::write_output;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // stdout carries only the record
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    let settings = Settings::resolve(&cli, &config)?;

    let record = bootstrap_and_run(&settings.session, &settings.server, &settings.run)
        .await
        .context("Failed to read vehicle status")?;

    let content = format_record(&record, settings.format)?;
    write_output(settings.output.as_ref(), &content)?;

    Ok(())
}
