//! Shared types used across the clipper crawler.
//!
//! This module defines common newtypes and enums that provide type safety
//! and clear domain modeling.

use crate::error::ClipperError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An identifier-like prefix such as `channel:`. Free text with spaces or
/// punctuation before a colon is not a namespace.
static NAMESPACE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][\w-]*:").expect("valid namespace regex"));

/// A search term as stored in the term queue.
///
/// Stored values may carry a `namespace:` prefix (e.g. `channel:zeezoo`); the
/// query sent to the site is the part after it. Any other colon is part of
/// the query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Create a new `SearchTerm`, trimming surrounding whitespace.
    ///
    /// # Errors
    /// Returns error if the term is empty after trimming, or if it has a
    /// namespace prefix but nothing after it.
    pub fn new(term: impl Into<String>) -> Result<Self, ClipperError> {
        let term = term.into();
        let trimmed = term.trim();

        if trimmed.is_empty() {
            return Err(ClipperError::Validation(
                "search term cannot be empty".to_string(),
            ));
        }

        let term = Self(trimmed.to_string());
        if term.query().is_empty() {
            return Err(ClipperError::Validation(format!(
                "search term '{trimmed}' has an empty query after its namespace"
            )));
        }

        Ok(term)
    }

    /// Parse a comma-separated list, skipping blank entries.
    #[must_use]
    pub fn parse_list(list: &str) -> Vec<Self> {
        list.split(',').filter_map(|t| Self::new(t).ok()).collect()
    }

    /// Get the stored value, including any namespace prefix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The text to search for.
    #[must_use]
    pub fn query(&self) -> &str {
        match NAMESPACE_PREFIX.find(&self.0) {
            Some(prefix) => self.0[prefix.end()..].trim(),
            None => &self.0,
        }
    }

    /// The query percent-encoded for use in a URL.
    #[must_use]
    pub fn encoded_query(&self) -> String {
        urlencoding::encode(self.query()).into_owned()
    }
}

impl TryFrom<String> for SearchTerm {
    type Error = ClipperError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SearchTerm> for String {
    fn from(term: SearchTerm) -> Self {
        term.0
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Categories of extracted content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Pages (profiles, businesses, groups)
    Page,
    /// Videos
    Video,
    /// Text posts
    Post,
}

impl Category {
    /// Crawl order within a term. Cheaper selectors run first.
    pub const PRIORITY: [Category; 3] = [Category::Page, Category::Video, Category::Post];

    /// Lowercase name used in payloads and logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Video => "video",
            Self::Post => "post",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
