//! `scrape` subcommand

use crate::browser::{BrowserSession, LaunchOptions};
use crate::cli::{Cli, ScrapeArgs};
use crate::config::Config;
use crate::error::{Result, ShelfgrabError};
use crate::scrape::Scraper;
use colored::Colorize;
use tracing::info;

pub async fn run(cli: &Cli, args: &ScrapeArgs) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;

    // CLI flags win over config file values.
    if !args.keywords.is_empty() {
        config.scrape.keywords = args.keywords.clone();
    }
    if let Some(output) = &args.output {
        config.scrape.output = output.clone();
    }
    if let Some(n) = args.max_pages {
        config.scrape.max_pages = n;
    }
    if let Some(n) = args.link_limit {
        config.scrape.link_limit = Some(n);
    }
    if args.headed {
        config.browser.headless = false;
    }

    if config.scrape.keywords.is_empty() {
        return Err(ShelfgrabError::Config(
            "no keywords given; pass --keyword or set scrape.keywords in the config file"
                .to_string(),
        ));
    }

    info!(
        "scraping {} keyword(s) into {}",
        config.scrape.keywords.len(),
        config.scrape.output.display()
    );

    let options = LaunchOptions {
        headless: config.browser.headless,
        socks5_proxy: None,
        extra_args: config.browser.chrome_args.clone(),
    };
    let session = BrowserSession::launch(&options).await?;

    // Always close the browser, even when the run errors out.
    let outcome = Scraper::new(&session, &config.scrape).run().await;
    session.close().await.ok();
    let report = outcome?;

    println!();
    println!("{}", "Scrape complete".bold());
    println!(
        "  {} {} products across {} keyword(s), {} result page(s)",
        "✓".green(),
        report.products,
        report.keywords,
        report.pages_visited
    );
    if report.skipped > 0 {
        println!("  {} {} product page(s) skipped", "!".yellow(), report.skipped);
    }
    println!("  rows appended to {}", config.scrape.output.display());

    Ok(())
}
