//! Clipper Core - Foundation crate for the clipper crawler.
//!
//! This crate provides the configuration model, error types and shared domain
//! types that every other clipper crate depends on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and environment overrides
//! - [`types`] - Shared newtypes and enums (`SearchTerm`, `Category`)
//!
//! # Example
//!
//! ```rust
//! use clipper_core::{AppConfig, Category};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.terms.set_key, "fb_channels");
//! assert_eq!(Category::PRIORITY[0], Category::Page);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AccountConfig, AppConfig, BrowserConfig, CrawlConfig, DeliveryConfig, Marker, SessionConfig,
    SiteConfig, TermsConfig,
};
pub use error::{ClipperError, ConfigError, ConfigResult};
pub use types::{Category, SearchTerm};
