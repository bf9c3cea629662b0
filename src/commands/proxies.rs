//! `check-proxies` subcommand

use crate::cli::{CheckProxiesArgs, Cli};
use crate::config::Config;
use crate::error::Result;
use crate::proxy::{CheckerConfig, ProxyChecker, ProxyFile};
use colored::Colorize;
use tracing::info;

pub async fn run(cli: &Cli, args: &CheckProxiesArgs) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;

    // CLI flags win over config file values.
    if let Some(file) = &args.file {
        config.proxy.file = file.clone();
    }
    if let Some(url) = &args.test_url {
        config.proxy.test_url = url.clone();
    }
    if let Some(n) = args.concurrency {
        config.proxy.max_concurrent = n as usize;
    }
    if let Some(secs) = args.timeout {
        config.proxy.timeout_secs = secs;
    }

    info!("checking proxies from {}", config.proxy.file.display());

    let checker_config = CheckerConfig::builder()
        .test_url(&config.proxy.test_url)
        .max_concurrent(config.proxy.max_concurrent)
        .timeout(config.proxy.timeout())
        .build();

    let report = ProxyChecker::new(checker_config)
        .check_all(ProxyFile::new(&config.proxy.file))
        .await?;

    println!();
    println!("{}", "Proxy check complete".bold());
    println!(
        "  {} {}/{} proxies working",
        "✓".green(),
        report.working,
        report.total
    );
    if report.removed > 0 {
        println!(
            "  {} {} dropped from {}",
            "✗".red(),
            report.removed,
            config.proxy.file.display()
        );
    } else {
        println!(
            "  {} list unchanged: {}",
            "○".dimmed(),
            config.proxy.file.display()
        );
    }

    Ok(())
}
