//! Shelfgrab CLI
//!
//! Dispatches to the `scrape` and `check-proxies` subcommands.

use anyhow::Result;
use clap::Parser;
use shelfgrab::cli::{Cli, Commands};
use shelfgrab::commands;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "shelfgrab=debug,info"
    } else {
        "shelfgrab=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Scrape(args) => commands::scrape::run(&cli, args).await?,
        Commands::CheckProxies(args) => commands::proxies::run(&cli, args).await?,
    }

    Ok(())
}
