//! Concurrent proxy health checking
//!
//! Launches one headless browser per proxy, bounded by a semaphore, and
//! rewrites the list file as verdicts come in: failed entries are removed
//! immediately, working entries are re-marked so a re-run over the surviving
//! file is a no-op when connectivity is unchanged.

use crate::browser::{BrowserSession, LaunchOptions};
use crate::error::Result;
use crate::proxy::list::{ProxyEntry, ProxyFile};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Checker configuration
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// URL loaded through each proxy
    pub test_url: String,
    /// Concurrent browser instances
    pub max_concurrent: usize,
    /// Per-proxy budget covering launch and navigation
    pub timeout: Duration,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            test_url: "https://www.google.com".to_string(),
            max_concurrent: 10,
            timeout: Duration::from_secs(15),
        }
    }
}

impl CheckerConfig {
    /// Create a new config builder
    pub fn builder() -> CheckerConfigBuilder {
        CheckerConfigBuilder::default()
    }
}

/// Builder for CheckerConfig
#[derive(Default)]
pub struct CheckerConfigBuilder {
    config: CheckerConfig,
}

impl CheckerConfigBuilder {
    /// Set the URL loaded through each proxy
    pub fn test_url(mut self, url: &str) -> Self {
        self.config.test_url = url.to_string();
        self
    }

    /// Set the concurrency bound; a bound below 1 is raised to 1
    pub fn max_concurrent(mut self, n: usize) -> Self {
        self.config.max_concurrent = n.max(1);
        self
    }

    /// Set the per-proxy timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the per-proxy timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout = Duration::from_secs(secs);
        self
    }

    /// Build the config
    pub fn build(self) -> CheckerConfig {
        self.config
    }
}

/// Outcome of a full run over a list file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub total: usize,
    pub working: usize,
    pub removed: usize,
}

/// Tests every entry of a proxy list file through a real browser.
pub struct ProxyChecker {
    config: CheckerConfig,
}

impl ProxyChecker {
    pub fn new(config: CheckerConfig) -> Self {
        Self { config }
    }

    /// Check all entries and rewrite the file in place.
    pub async fn check_all(&self, file: ProxyFile) -> Result<CheckReport> {
        let entries = file.load()?;
        if entries.is_empty() {
            warn!("no proxies found in {}", file.path().display());
            return Ok(CheckReport::default());
        }

        let total = entries.len();
        info!(
            "testing {} proxies against {} (max {} concurrent)",
            total, self.config.test_url, self.config.max_concurrent
        );

        let file = Arc::new(file);
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent));
        let working = Arc::new(AtomicUsize::new(0));

        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )
            .expect("static template")
            .progress_chars("##-"),
        );

        let mut tasks = Vec::with_capacity(total);
        for entry in entries {
            let semaphore = Arc::clone(&semaphore);
            let file = Arc::clone(&file);
            let working = Arc::clone(&working);
            let bar = bar.clone();
            let config = self.config.clone();

            tasks.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return false,
                };

                let ok = check_one(&entry, &config).await;
                if ok {
                    working.fetch_add(1, Ordering::Relaxed);
                    if let Err(e) = file.mark_good(&entry).await {
                        warn!("failed to update {} in list file: {}", entry, e);
                    }
                } else if let Err(e) = file.remove(&entry).await {
                    warn!("failed to drop {} from list file: {}", entry, e);
                }

                bar.set_message(format!("{} working", working.load(Ordering::Relaxed)));
                bar.inc(1);
                ok
            }));
        }

        let results = join_all(tasks).await;
        let working = results
            .iter()
            .filter(|outcome| matches!(outcome, Ok(true)))
            .count();
        bar.finish_with_message(format!("{}/{} working", working, total));

        Ok(CheckReport {
            total,
            working,
            removed: total - working,
        })
    }
}

/// One verdict: can a page be loaded through this proxy within the budget?
async fn check_one(entry: &ProxyEntry, config: &CheckerConfig) -> bool {
    match tokio::time::timeout(config.timeout, probe(entry, &config.test_url)).await {
        Ok(Ok(())) => {
            debug!("{} is reachable", entry);
            true
        }
        Ok(Err(e)) => {
            debug!("{} failed: {}", entry, e);
            false
        }
        Err(_) => {
            debug!("{} timed out after {:?}", entry, config.timeout);
            false
        }
    }
}

async fn probe(entry: &ProxyEntry, test_url: &str) -> Result<()> {
    let session = BrowserSession::launch(&LaunchOptions::for_proxy(entry.to_string())).await?;
    let outcome = session.goto(test_url).await;
    session.close().await.ok();
    outcome
}
