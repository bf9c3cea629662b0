//! Shelfgrab - product scraping and proxy health checking over a real browser
//!
//! Two utilities share one Chrome-DevTools session layer:
//! - `scrape` searches a storefront for keywords, walks the result pages,
//!   visits every product URL, and appends one CSV row per product.
//! - `check-proxies` loads a `host:port` list, tries a page load through
//!   each proxy with bounded concurrency, and rewrites the list file so
//!   only the working entries survive.

pub mod browser;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod proxy;
pub mod scrape;

pub use browser::{BrowserSession, LaunchOptions};
pub use config::Config;
pub use error::{Result, ShelfgrabError};
pub use proxy::{CheckReport, CheckerConfig, ProxyChecker, ProxyEntry, ProxyFile};
pub use scrape::{extract_record, CsvSink, ProductRecord, ScrapeReport, Scraper};
