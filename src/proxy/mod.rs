//! Proxy list file handling and concurrent health checking

pub mod checker;
pub mod list;

pub use checker::{CheckReport, CheckerConfig, ProxyChecker};
pub use list::{ProxyEntry, ProxyFile};
