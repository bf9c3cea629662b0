//! Layered configuration: defaults, then a TOML file, then environment variables

use crate::error::Result;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "shelfgrab.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scrape: ScrapeConfig,
    pub proxy: ProxyConfig,
    pub browser: BrowserSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Storefront origin, used to absolutize relative product links
    pub base_url: String,
    /// Page opened before the first keyword search
    pub start_url: String,
    /// Keywords to search for (can also come from --keyword flags)
    pub keywords: Vec<String>,
    /// Result pages traversed per keyword
    pub max_pages: usize,
    /// Scroll-and-recollect rounds per result page
    pub max_scroll_rounds: usize,
    /// Optional cap on product links per keyword
    pub link_limit: Option<usize>,
    /// CSV output file
    pub output: PathBuf,
    /// Fixed politeness delay between navigations, in milliseconds
    pub page_delay_ms: u64,
    /// Navigation timeout, in seconds
    pub nav_timeout_secs: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.amazon.nl".to_string(),
            start_url: "https://www.amazon.nl/gp/bestsellers/".to_string(),
            keywords: Vec::new(),
            max_pages: 5,
            max_scroll_rounds: 6,
            link_limit: None,
            output: PathBuf::from("products.csv"),
            page_delay_ms: 2500,
            nav_timeout_secs: 30,
        }
    }
}

impl ScrapeConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn nav_timeout(&self) -> Duration {
        Duration::from_secs(self.nav_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Proxy list file, one host:port per line, `#` comments allowed
    pub file: PathBuf,
    /// URL loaded through each proxy to decide health
    pub test_url: String,
    /// Concurrent browser instances
    pub max_concurrent: usize,
    /// Per-proxy timeout covering launch and navigation, in seconds
    pub timeout_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("socks5.txt"),
            test_url: "https://www.google.com".to_string(),
            max_concurrent: 10,
            timeout_secs: 15,
        }
    }
}

impl ProxyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run without a visible window
    pub headless: bool,
    /// Extra flags passed to the browser process
    pub chrome_args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_args: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration, layering an optional TOML file and `SHELFGRAB_`
    /// environment variables over the built-in defaults.
    ///
    /// An explicitly passed path must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(crate::error::ShelfgrabError::Config(format!(
                        "config file not found: {}",
                        p.display()
                    )));
                }
                figment = figment.merge(Toml::file(p));
            }
            None => {
                figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
            }
        }

        let config = figment
            .merge(Env::prefixed("SHELFGRAB_").split("__"))
            .extract()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert!(config.browser.headless);
        assert_eq!(config.proxy.max_concurrent, 10);
        assert_eq!(config.proxy.timeout(), Duration::from_secs(15));
        assert_eq!(config.scrape.max_pages, 5);
        assert!(config.scrape.keywords.is_empty());
    }

    #[test]
    fn toml_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                    [proxy]
                    file = "lists/mine.txt"
                    max_concurrent = 3

                    [scrape]
                    keywords = ["cup", "charger"]
                "#,
            )?;

            let config = Config::load(None).expect("config should load");
            assert_eq!(config.proxy.file, PathBuf::from("lists/mine.txt"));
            assert_eq!(config.proxy.max_concurrent, 3);
            assert_eq!(config.scrape.keywords, vec!["cup", "charger"]);
            // untouched values keep defaults
            assert_eq!(config.scrape.max_pages, 5);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                    [proxy]
                    max_concurrent = 3
                "#,
            )?;
            jail.set_env("SHELFGRAB_PROXY__MAX_CONCURRENT", "7");
            jail.set_env("SHELFGRAB_BROWSER__HEADLESS", "false");

            let config = Config::load(None).expect("config should load");
            assert_eq!(config.proxy.max_concurrent, 7);
            assert!(!config.browser.headless);
            Ok(())
        });
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let result = Config::load(Some(Path::new("/nonexistent/shelfgrab.toml")));
        assert!(result.is_err());
    }
}
