//! Product scraping: keyword search, listing traversal, field extraction

pub mod extract;
pub mod listing;
pub mod record;

pub use extract::extract_record;
pub use record::{CsvSink, ProductRecord, CSV_COLUMNS};

use crate::browser::BrowserSession;
use crate::config::ScrapeConfig;
use crate::error::{Result, ShelfgrabError};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

/// Outcome of a scraping run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    pub keywords: usize,
    pub pages_visited: usize,
    pub products: usize,
    pub skipped: usize,
}

/// Drives one browser session through every configured keyword.
pub struct Scraper<'a> {
    session: &'a BrowserSession,
    config: &'a ScrapeConfig,
}

impl<'a> Scraper<'a> {
    pub fn new(session: &'a BrowserSession, config: &'a ScrapeConfig) -> Self {
        Self { session, config }
    }

    /// Full run: landing page, cookie banner, then per keyword search →
    /// paginate → visit products → append rows.
    pub async fn run(&self) -> Result<ScrapeReport> {
        let base = Url::parse(&self.config.base_url)?;

        self.goto(&self.config.start_url).await?;
        self.pause().await;
        listing::accept_cookies(self.session).await;
        self.pause().await;

        let mut sink = CsvSink::open(&self.config.output)?;
        let mut report = ScrapeReport::default();

        for keyword in &self.config.keywords {
            info!("searching for {:?}", keyword);
            listing::search(self.session, keyword, self.config.nav_timeout()).await?;
            self.pause().await;

            let links = self.collect_across_pages(&base, &mut report).await?;
            info!("found {} unique product urls for {:?}", links.len(), keyword);

            for url in links {
                match self.scrape_product(&url, &mut sink).await {
                    Ok(()) => report.products += 1,
                    Err(e) => {
                        // One broken product page never stops the run.
                        warn!("skipping {}: {}", url, e);
                        report.skipped += 1;
                    }
                }
            }
            report.keywords += 1;
        }

        Ok(report)
    }

    /// Walk result pages for the current keyword, collecting product links.
    async fn collect_across_pages(
        &self,
        base: &Url,
        report: &mut ScrapeReport,
    ) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut collected = Vec::new();

        for page_no in 1..=self.config.max_pages {
            debug!("collecting links on result page {}", page_no);
            let remaining = self
                .config
                .link_limit
                .map(|limit| limit.saturating_sub(collected.len()));

            let links = listing::collect_links(
                self.session,
                base,
                self.config.max_scroll_rounds,
                remaining,
                self.config.page_delay(),
            )
            .await?;
            for link in links {
                if seen.insert(link.clone()) {
                    collected.push(link);
                }
            }
            report.pages_visited += 1;

            if let Some(limit) = self.config.link_limit {
                if collected.len() >= limit {
                    collected.truncate(limit);
                    break;
                }
            }

            let html = self.session.content().await?;
            match listing::find_next_page_url(&html, base) {
                Some(next) => {
                    self.goto(&next).await?;
                    self.pause().await;
                }
                None => {
                    info!("no next page found, stopping pagination");
                    break;
                }
            }
        }

        Ok(collected)
    }

    /// Visit one product URL, extract its fields, append the row.
    async fn scrape_product(&self, url: &str, sink: &mut CsvSink) -> Result<()> {
        self.goto(url).await?;
        self.pause().await;

        let html = self.session.content().await?;
        let record = extract_record(&html, url);
        info!(
            "product saved: {}",
            record.title.as_deref().unwrap_or("unknown")
        );
        sink.append(&record)?;
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        tokio::time::timeout(self.config.nav_timeout(), self.session.goto(url))
            .await
            .map_err(|_| ShelfgrabError::Timeout(self.config.nav_timeout()))?
    }

    async fn pause(&self) {
        tokio::time::sleep(self.config.page_delay()).await;
    }
}
