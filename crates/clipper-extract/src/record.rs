//! Extracted records.
//!
//! Serializing a [`Record`] yields the delivery payload directly:
//! `{"type": "video", "data": {"title": ..., "postUrl": ...}}`.

use std::collections::HashMap;

use clipper_core::Category;
use serde::{Deserialize, Serialize};

/// Title used when a video has none.
pub const UNTITLED: &str = "Untitled";
/// Duration used when a video shows none.
pub const UNKNOWN_DURATION: &str = "Unknown";
/// Uploader used when a video shows none.
pub const UNKNOWN_UPLOADER: &str = "Unknown";
/// Post text used when a post has none.
pub const NO_CONTENT: &str = "No content available";
/// Page name used when a page shows none.
pub const UNKNOWN_PAGE: &str = "Unknown Page";

/// A video search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    /// Headline shown on the result card
    pub title: String,
    /// Preview image URL
    pub image: String,
    /// Thumbnail URL
    pub thumbnail: String,
    /// Display duration, e.g. "3:41"
    pub duration: String,
    /// Absolute URL of the video post
    pub post_url: String,
    /// Uploader display name
    pub uploader: String,
    /// View count
    pub views: u64,
}

/// A post search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Absolute URL of the post
    pub post_url: String,
    /// Post text
    pub content: String,
}

/// A page search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Absolute URL of the page
    pub page_url: String,
    /// Page display name
    pub name: String,
}

/// One unit of extracted output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Record {
    /// A video result
    Video(Video),
    /// A post result
    Post(Post),
    /// A page result
    Page(Page),
}

impl Record {
    /// Category this record belongs to
    #[must_use]
    pub fn category(&self) -> Category {
        match self {
            Self::Video(_) => Category::Video,
            Self::Post(_) => Category::Post,
            Self::Page(_) => Category::Page,
        }
    }

    /// The identifying URL
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Video(v) => &v.post_url,
            Self::Post(p) => &p.post_url,
            Self::Page(p) => &p.page_url,
        }
    }

    /// Build a record from extracted field values.
    ///
    /// Returns `None` when the identifying URL is missing; every other field
    /// falls back to its sentinel.
    #[must_use]
    pub fn from_fields(category: Category, fields: &FieldValues) -> Option<Self> {
        let text = |name: &str, default: &str| {
            fields
                .text(name)
                .map_or_else(|| default.to_string(), str::to_string)
        };

        match category {
            Category::Video => {
                let post_url = fields.text("postUrl")?.to_string();
                let thumbnail = text("thumbnail", "");
                Some(Self::Video(Video {
                    title: text("title", UNTITLED),
                    image: fields
                        .text("image")
                        .map_or_else(|| thumbnail.clone(), str::to_string),
                    thumbnail,
                    duration: text("duration", UNKNOWN_DURATION),
                    post_url,
                    uploader: text("uploader", UNKNOWN_UPLOADER),
                    views: fields.count("views").unwrap_or(0),
                }))
            }
            Category::Post => Some(Self::Post(Post {
                post_url: fields.text("postUrl")?.to_string(),
                content: text("content", NO_CONTENT),
            })),
            Category::Page => Some(Self::Page(Page {
                page_url: fields.text("pageUrl")?.to_string(),
                name: text("name", UNKNOWN_PAGE),
            })),
        }
    }
}

/// A single extracted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Text or URL
    Text(String),
    /// Parsed number
    Count(u64),
}

/// Field name to value, as produced by one result node.
#[derive(Debug, Clone, Default)]
pub struct FieldValues {
    values: HashMap<String, FieldValue>,
}

impl FieldValues {
    /// Empty set of values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value, replacing any previous one
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.values.insert(name.into(), value);
    }

    /// Text value of a field; empty strings count as absent
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(FieldValue::Text(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// Numeric value of a field
    #[must_use]
    pub fn count(&self, name: &str) -> Option<u64> {
        match self.values.get(name) {
            Some(FieldValue::Count(n)) => Some(*n),
            _ => None,
        }
    }
}
