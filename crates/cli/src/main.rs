//! swcache entry point.
//!
//! Drives the cache proxy from the command line. Logging goes to stderr so
//! that stdout carries only command output.

use anyhow::Result;
use clap::Parser;
use swcache_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = cli::Cli::parse();
    let config = AppConfig::load()?;

    tracing::debug!(db_path = %config.db_path.display(), origin = %config.origin, "configuration loaded");

    commands::run(config, cli.command).await
}
