//! Subcommand implementations

pub mod proxies;
pub mod scrape;
