//! Shared browser-session layer over the Chrome DevTools Protocol

pub mod session;

pub use session::{BrowserSession, LaunchOptions};
