//! Per-category extraction rule tables.
//!
//! A rule table says where to search, which marker means "results are
//! present", which nodes are results, and how each field is read from a
//! node. Markup changes are handled by editing a table, either the built-in
//! one or an override loaded from TOML:
//!
//! ```toml
//! [post]
//! search_url = "{origin}/search/posts/?q={query}"
//! results_marker = "div[role='feed']"
//! item_selector = "div[role='article']"
//!
//! [[post.fields]]
//! name = "postUrl"
//! from = "attr"
//! selector = "a"
//! attr = "href"
//! kind = "url"
//! required = true
//! ```

use std::path::Path;

use clipper_core::{Category, SearchTerm};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ExtractError, Result};
use crate::record::{NO_CONTENT, UNKNOWN_DURATION, UNKNOWN_PAGE, UNKNOWN_UPLOADER, UNTITLED};

const VIDEO_SEARCH_URL: &str = "{origin}/search/videos/?q={query}&filters=eyJ2aWRlb3Nfc29ydF9ieTowIjoie1wibmFtZVwiOlwidmlkZW9zX3NvcnRfYnlcIixcImFyZ3NcIjpcIk1vc3QgUmVjZW50XCJ9In0%3D";
const POST_SEARCH_URL: &str = "{origin}/search/posts/?q={query}&filters=eyJyZWNlbnRfcG9zdHM6MCI6IntcIm5hbWVcIjpcInJlY2VudF9wb3N0c1wiLFwiYXJnc1wiOlwiXCJ9In0%3D";
const PAGE_SEARCH_URL: &str = "{origin}/search/pages/?q={query}";

/// How a field's raw value is located inside a result node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum Selection {
    /// Attribute of the first element matching `selector`
    Attr {
        /// CSS selector, relative to the node
        selector: String,
        /// Attribute name, e.g. `href`
        attr: String,
    },
    /// Trimmed text of the first element matching `selector`
    Text {
        /// CSS selector, relative to the node
        selector: String,
    },
    /// Text of the innermost element matching `selector` whose text
    /// contains `needle`
    TextContaining {
        /// CSS selector, relative to the node
        selector: String,
        /// Substring the element's text must contain
        needle: String,
    },
}

impl Selection {
    /// The CSS selector this selection uses
    #[must_use]
    pub fn selector(&self) -> &str {
        match self {
            Self::Attr { selector, .. }
            | Self::Text { selector }
            | Self::TextContaining { selector, .. } => selector,
        }
    }
}

/// How a raw value is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Used as-is
    #[default]
    Text,
    /// Root-relative values are made absolute against the site origin
    Url,
    /// First number in the text, thousands separators removed
    Count,
}

/// One field of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Record field name (camelCase, as delivered)
    pub name: String,

    /// Where the value comes from
    #[serde(flatten)]
    pub selection: Selection,

    /// How to interpret it
    #[serde(default)]
    pub kind: FieldKind,

    /// Drop the node when this field is absent
    #[serde(default)]
    pub required: bool,

    /// Value used when the field is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl FieldRule {
    fn new(name: &str, selection: Selection, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            selection,
            kind,
            required: false,
            default: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn or(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }
}

fn attr(selector: &str, attr: &str) -> Selection {
    Selection::Attr {
        selector: selector.to_string(),
        attr: attr.to_string(),
    }
}

fn text(selector: &str) -> Selection {
    Selection::Text {
        selector: selector.to_string(),
    }
}

/// Rules for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRules {
    /// Search URL template with `{origin}` and `{query}` placeholders
    pub search_url: String,

    /// Selector whose presence means results have rendered
    pub results_marker: String,

    /// Selector matching each result node
    pub item_selector: String,

    /// Field rules applied to every result node
    pub fields: Vec<FieldRule>,
}

impl CategoryRules {
    /// Built-in rules for videos, sorted by most recent.
    #[must_use]
    pub fn videos() -> Self {
        Self {
            search_url: VIDEO_SEARCH_URL.to_string(),
            results_marker: "div.x1yztbdb".to_string(),
            item_selector: "div.x1yztbdb".to_string(),
            fields: vec![
                FieldRule::new("postUrl", attr(r#"a[href*="/watch/"]"#, "href"), FieldKind::Url)
                    .required(),
                FieldRule::new("thumbnail", attr("img.xz74otr", "src"), FieldKind::Url),
                FieldRule::new("image", attr("img.xz74otr", "src"), FieldKind::Url),
                FieldRule::new("duration", text("span.video-duration"), FieldKind::Text)
                    .or(UNKNOWN_DURATION),
                FieldRule::new("title", text("h2 a, div[role='link']"), FieldKind::Text)
                    .or(UNTITLED),
                FieldRule::new(
                    "views",
                    Selection::TextContaining {
                        selector: "div".to_string(),
                        needle: "views".to_string(),
                    },
                    FieldKind::Count,
                )
                .or("0"),
                FieldRule::new(
                    "uploader",
                    text("a[href*='/profile.php?id='], a[href^='/']"),
                    FieldKind::Text,
                )
                .or(UNKNOWN_UPLOADER),
            ],
        }
    }

    /// Built-in rules for recent posts.
    #[must_use]
    pub fn posts() -> Self {
        Self {
            search_url: POST_SEARCH_URL.to_string(),
            results_marker: "div.post-selector".to_string(),
            item_selector: "div.post-selector".to_string(),
            fields: vec![
                FieldRule::new("postUrl", attr("a", "href"), FieldKind::Url).required(),
                FieldRule::new("content", text("p"), FieldKind::Text).or(NO_CONTENT),
            ],
        }
    }

    /// Built-in rules for pages.
    #[must_use]
    pub fn pages() -> Self {
        Self {
            search_url: PAGE_SEARCH_URL.to_string(),
            results_marker: "div.page-selector".to_string(),
            item_selector: "div.page-selector".to_string(),
            fields: vec![
                FieldRule::new("pageUrl", attr("a", "href"), FieldKind::Url).required(),
                FieldRule::new("name", text("h2"), FieldKind::Text).or(UNKNOWN_PAGE),
            ],
        }
    }

    /// Built-in rules for a category
    #[must_use]
    pub fn builtin(category: Category) -> Self {
        match category {
            Category::Video => Self::videos(),
            Category::Post => Self::posts(),
            Category::Page => Self::pages(),
        }
    }

    /// Search URL for `term` on the site at `origin`.
    #[must_use]
    pub fn search_url_for(&self, origin: &str, term: &SearchTerm) -> String {
        self.search_url
            .replace("{origin}", origin.trim_end_matches('/'))
            .replace("{query}", &term.encoded_query())
    }

    /// Check that every selector parses and the identifying field is read.
    pub fn validate(&self, category: Category) -> Result<()> {
        if !self.search_url.contains("{query}") {
            return Err(ExtractError::InvalidRules {
                category,
                reason: "search_url must contain {query}".to_string(),
            });
        }

        let identifying = identifying_field(category);
        if !self.fields.iter().any(|f| f.name == identifying) {
            return Err(ExtractError::InvalidRules {
                category,
                reason: format!("no rule for identifying field '{identifying}'"),
            });
        }

        parse_selector(category, &self.results_marker)?;
        parse_selector(category, &self.item_selector)?;
        for field in &self.fields {
            parse_selector(category, field.selection.selector())?;
        }

        Ok(())
    }
}

/// Name of the field that identifies a record of `category`.
#[must_use]
pub fn identifying_field(category: Category) -> &'static str {
    match category {
        Category::Video | Category::Post => "postUrl",
        Category::Page => "pageUrl",
    }
}

pub(crate) fn parse_selector(category: Category, selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        category,
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Rule tables for every category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Page rules
    pub page: CategoryRules,
    /// Video rules
    pub video: CategoryRules,
    /// Post rules
    pub post: CategoryRules,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            page: CategoryRules::pages(),
            video: CategoryRules::videos(),
            post: CategoryRules::posts(),
        }
    }
}

impl RuleSet {
    /// Load rules from a TOML file. Categories the file omits keep their
    /// built-in rules.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let rules = Self::from_toml(&contents)?;
        info!(path = %path.display(), "Loaded extraction rules");
        Ok(rules)
    }

    /// Parse and validate rules from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let rules: Self = toml::from_str(contents)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Built-in rules, or the file at `path` when given
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate every category
    pub fn validate(&self) -> Result<()> {
        for category in Category::PRIORITY {
            self.get(category).validate(category)?;
        }
        Ok(())
    }

    /// Rules for one category
    #[must_use]
    pub fn get(&self, category: Category) -> &CategoryRules {
        match category {
            Category::Page => &self.page,
            Category::Video => &self.video,
            Category::Post => &self.post,
        }
    }
}
