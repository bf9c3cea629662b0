//! Command-line interface definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shelfgrab")]
#[command(about = "Scrape product listings and health-check SOCKS5 proxies with a real browser")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML config file (default: ./shelfgrab.toml if present)
    #[arg(short, long, global = true, env = "SHELFGRAB_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search a storefront for keywords and append product rows to a CSV file
    Scrape(ScrapeArgs),

    /// Test every proxy in a list file and drop the entries that fail
    CheckProxies(CheckProxiesArgs),
}

#[derive(Args, Debug)]
pub struct ScrapeArgs {
    /// Keyword to search for (repeat for multiple keywords)
    #[arg(short, long = "keyword")]
    pub keywords: Vec<String>,

    /// Output CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum result pages to traverse per keyword
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Cap on product links collected per keyword
    #[arg(long)]
    pub link_limit: Option<usize>,

    /// Run the browser with a visible window
    #[arg(long)]
    pub headed: bool,
}

#[derive(Args, Debug)]
pub struct CheckProxiesArgs {
    /// Proxy list file, one host:port per line
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// URL to load through each proxy
    #[arg(long)]
    pub test_url: Option<String>,

    /// Maximum concurrent browser instances
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub concurrency: Option<u32>,

    /// Per-proxy timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,
}
