//! Error types for extraction.

use clipper_browser::BrowserError;
use clipper_core::Category;
use thiserror::Error;

/// Errors raised while extracting records.
///
/// These never leave [`CategoryExtractor::extract`](crate::CategoryExtractor::extract);
/// they are logged at that boundary and turned into an empty result.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Browser operation failed
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),

    /// A rule carries a selector that does not parse
    #[error("invalid selector for {category} ({selector}): {reason}")]
    InvalidSelector {
        /// Category whose rules are broken
        category: Category,
        /// The offending selector
        selector: String,
        /// Parser message
        reason: String,
    },

    /// A rule table is structurally unusable
    #[error("invalid rules for {category}: {reason}")]
    InvalidRules {
        /// Category whose rules are broken
        category: Category,
        /// What is wrong
        reason: String,
    },

    /// Rule file could not be parsed
    #[error("failed to parse rules file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Rule file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for extraction.
pub type Result<T> = std::result::Result<T, ExtractError>;
