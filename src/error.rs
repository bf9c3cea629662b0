//! Error types for shelfgrab

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShelfgrabError {
    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("Browser operation failed: {0}")]
    BrowserOperation(String),

    #[error("Navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Proxy file error for {path}: {source}")]
    ProxyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid proxy entry on line {line}: {content:?}")]
    InvalidProxyEntry { line: usize, content: String },

    #[error("CSV output error: {0}")]
    CsvOutput(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ShelfgrabError>;

impl From<figment::Error> for ShelfgrabError {
    fn from(e: figment::Error) -> Self {
        ShelfgrabError::Config(e.to_string())
    }
}

impl From<chromiumoxide::error::CdpError> for ShelfgrabError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        ShelfgrabError::BrowserOperation(e.to_string())
    }
}
