//! Browser session management
//!
//! One `BrowserSession` owns a launched browser process, the task draining
//! its CDP event stream, and a single active page. Both subcommands go
//! through this layer; the proxy checker launches one short-lived session
//! per proxy, the scraper keeps one session for the whole run.

use crate::error::{Result, ShelfgrabError};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// How a browser process should be launched.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run without a visible window
    pub headless: bool,
    /// Route all traffic through a SOCKS5 proxy, given as `host:port`
    pub socks5_proxy: Option<String>,
    /// Extra flags appended to the browser command line
    pub extra_args: Vec<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            socks5_proxy: None,
            extra_args: Vec::new(),
        }
    }
}

impl LaunchOptions {
    /// Options for a health-check launch through the given proxy.
    pub fn for_proxy(host_port: impl Into<String>) -> Self {
        Self {
            headless: true,
            socks5_proxy: Some(host_port.into()),
            extra_args: Vec::new(),
        }
    }
}

/// Chrome's `--proxy-server` flag for a SOCKS5 relay.
fn proxy_arg(host_port: &str) -> String {
    format!("--proxy-server=socks5://{}", host_port)
}

fn build_config(options: &LaunchOptions) -> std::result::Result<BrowserConfig, String> {
    let mut builder = BrowserConfig::builder()
        .no_sandbox()
        .arg("--disable-gpu")
        .arg("--disable-dev-shm-usage");

    if !options.headless {
        builder = builder.with_head();
    }

    if let Some(proxy) = &options.socks5_proxy {
        builder = builder.arg(proxy_arg(proxy));
    }

    for arg in &options.extra_args {
        builder = builder.arg(arg.clone());
    }

    builder.build()
}

/// A launched browser with one active page.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch a browser process and open a blank page.
    pub async fn launch(options: &LaunchOptions) -> Result<Self> {
        let config = build_config(options).map_err(ShelfgrabError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ShelfgrabError::BrowserLaunch(e.to_string()))?;

        // Drain CDP events until the browser goes away.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        debug!(headless = options.headless, proxy = ?options.socks5_proxy, "browser launched");

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    /// Navigate the active page and wait for the load to settle.
    pub async fn goto(&self, url: &str) -> Result<()> {
        debug!("navigating to {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| ShelfgrabError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| ShelfgrabError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// Full HTML of the active page.
    pub async fn content(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    /// Current URL of the active page, if any.
    pub async fn url(&self) -> Result<Option<String>> {
        Ok(self.page.url().await?)
    }

    /// Click the first element matching `selector`.
    pub async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| ShelfgrabError::ElementNotFound(selector.to_string()))?;
        element.click().await?;
        trace!("clicked {}", selector);
        Ok(())
    }

    /// Focus the element matching `selector`, clear it, and type `text`.
    pub async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| ShelfgrabError::ElementNotFound(selector.to_string()))?;
        element.click().await?;

        // Clear any previous value so repeated searches don't concatenate.
        let js_selector = serde_json::to_string(selector).unwrap_or_default();
        self.evaluate(format!(
            "(() => {{ const el = document.querySelector({js_selector}); if (el) el.value = ''; }})()"
        ))
        .await?;

        element.type_str(text).await?;
        trace!("typed {:?} into {}", text, selector);
        Ok(())
    }

    /// Send a key press to the element matching `selector`.
    pub async fn press_key(&self, selector: &str, key: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| ShelfgrabError::ElementNotFound(selector.to_string()))?;
        element.press_key(key).await?;
        Ok(())
    }

    /// Evaluate JavaScript on the active page.
    ///
    /// An `undefined` result comes back as `Value::Null`.
    pub async fn evaluate(&self, js: impl Into<String>) -> Result<serde_json::Value> {
        let result = self.page.evaluate(js.into()).await?;
        Ok(result
            .into_value::<serde_json::Value>()
            .unwrap_or(serde_json::Value::Null))
    }

    /// Poll until an element matching `selector` exists, or time out.
    pub async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(ShelfgrabError::Timeout(timeout));
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    /// Close the browser and wait for the process to exit.
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await.ok();
        self.browser.wait().await.ok();
        self.handler_task.await.ok();
        debug!("browser closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_arg_formats_socks5_scheme() {
        assert_eq!(
            proxy_arg("127.0.0.1:1080"),
            "--proxy-server=socks5://127.0.0.1:1080"
        );
    }

    #[test]
    fn default_options_are_headless_without_proxy() {
        let options = LaunchOptions::default();
        assert!(options.headless);
        assert!(options.socks5_proxy.is_none());
        assert!(options.extra_args.is_empty());
    }

    #[test]
    fn for_proxy_sets_the_relay() {
        let options = LaunchOptions::for_proxy("10.0.0.1:9050");
        assert_eq!(options.socks5_proxy.as_deref(), Some("10.0.0.1:9050"));
        assert!(options.headless);
    }

    #[tokio::test]
    #[ignore] // Requires a local Chrome installation
    async fn launch_and_navigate() {
        let session = BrowserSession::launch(&LaunchOptions::default())
            .await
            .expect("browser should launch");
        session.goto("about:blank").await.expect("navigation");
        let content = session.content().await.expect("content");
        assert!(content.contains("<html"));
        session.close().await.expect("close");
    }
}
