//! Browser automation engine for the clipper crawler.
//!
//! Provides a capability trait over browsing contexts plus a Chrome-backed
//! implementation with a randomized fingerprint and per-domain pacing.

pub mod actions;
pub mod cookies;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod page;

pub use actions::{BrowserActions, ContextProvider};
pub use cookies::BrowserCookie;
pub use engine::BrowserEngine;
pub use error::{BrowserError, Result};
pub use page::BrowserPage;
