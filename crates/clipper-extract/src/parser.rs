//! Rule-driven parsing of a settled results document.

use clipper_core::Category;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::Result;
use crate::record::{FieldValue, FieldValues, Record};
use crate::rules::{parse_selector, CategoryRules, FieldKind, FieldRule, Selection};

static COUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:,\d+)*)").expect("valid count pattern"));

/// Applies one category's rules to an HTML document.
pub struct ResultParser<'a> {
    category: Category,
    rules: &'a CategoryRules,
    origin: String,
}

impl<'a> ResultParser<'a> {
    /// Parser for `category` resolving relative URLs against `origin`
    pub fn new(category: Category, rules: &'a CategoryRules, origin: impl Into<String>) -> Self {
        Self {
            category,
            rules,
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    /// Extract every record the document holds.
    ///
    /// Nodes without the identifying URL are skipped; missing cosmetic
    /// fields take their defaults.
    pub fn parse(&self, html: &str) -> Result<Vec<Record>> {
        let document = Html::parse_document(html);
        let item_selector = parse_selector(self.category, &self.rules.item_selector)?;

        let fields = self
            .rules
            .fields
            .iter()
            .map(|rule| {
                parse_selector(self.category, rule.selection.selector()).map(|sel| (rule, sel))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for item in document.select(&item_selector) {
            match self.parse_item(item, &fields) {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!(
                category = %self.category,
                skipped,
                "Skipped result nodes without an identifying URL"
            );
        }

        Ok(records)
    }

    fn parse_item(&self, item: ElementRef<'_>, fields: &[(&FieldRule, Selector)]) -> Option<Record> {
        let mut values = FieldValues::new();

        for (rule, selector) in fields {
            let value = read_raw(item, &rule.selection, selector)
                .and_then(|raw| self.interpret(rule.kind, &raw));

            match value {
                Some(value) => values.insert(rule.name.as_str(), value),
                None if rule.required => return None,
                None => {
                    if let Some(value) = rule
                        .default
                        .as_deref()
                        .and_then(|d| self.interpret(rule.kind, d))
                    {
                        values.insert(rule.name.as_str(), value);
                    }
                }
            }
        }

        Record::from_fields(self.category, &values)
    }

    fn interpret(&self, kind: FieldKind, raw: &str) -> Option<FieldValue> {
        match kind {
            FieldKind::Text => Some(FieldValue::Text(raw.to_string())),
            FieldKind::Url => Some(FieldValue::Text(absolutize(&self.origin, raw))),
            FieldKind::Count => parse_count(raw).map(FieldValue::Count),
        }
    }
}

fn read_raw(item: ElementRef<'_>, selection: &Selection, selector: &Selector) -> Option<String> {
    let raw = match selection {
        Selection::Attr { attr, .. } => item
            .select(selector)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(str::to_string),
        Selection::Text { .. } => item.select(selector).next().map(|el| text_of(&el)),
        Selection::TextContaining { needle, .. } => {
            innermost_containing(item, selector, needle).map(|el| text_of(&el))
        }
    }?;

    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn text_of(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Deepest element matching `selector` whose text contains `needle`.
fn innermost_containing<'a>(
    item: ElementRef<'a>,
    selector: &Selector,
    needle: &str,
) -> Option<ElementRef<'a>> {
    let holds = |el: &ElementRef<'_>| selector.matches(el) && text_of(el).contains(needle);

    item.select(selector)
        .filter(|el| text_of(el).contains(needle))
        .find(|el| {
            !el.descendants()
                .skip(1)
                .filter_map(ElementRef::wrap)
                .any(|child| holds(&child))
        })
}

/// Prefix root-relative URLs with the site origin.
#[must_use]
pub fn absolutize(origin: &str, href: &str) -> String {
    if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("{}{}", origin.trim_end_matches('/'), href)
    } else {
        href.to_string()
    }
}

/// First number in `text`, ignoring thousands separators.
#[must_use]
pub fn parse_count(text: &str) -> Option<u64> {
    COUNT_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
}
