//! Per-category extraction over a live browsing context.

use std::time::Duration;

use clipper_browser::{BrowserActions, BrowserError};
use clipper_core::{Category, CrawlConfig, SearchTerm};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::parser::ResultParser;
use crate::record::Record;
use crate::rules::{CategoryRules, RuleSet};
use crate::settler::PageSettler;

/// Extracts one category of records for a search term.
#[derive(Debug, Clone)]
pub struct CategoryExtractor {
    category: Category,
    rules: CategoryRules,
    origin: String,
    settler: PageSettler,
    post_navigation_delay: Duration,
    results_timeout_ms: u64,
}

impl CategoryExtractor {
    /// Build an extractor from its rule table and the crawl settings.
    #[must_use]
    pub fn new(
        category: Category,
        rules: CategoryRules,
        origin: impl Into<String>,
        config: &CrawlConfig,
    ) -> Self {
        Self {
            category,
            rules,
            origin: origin.into(),
            settler: PageSettler::from_config(config),
            post_navigation_delay: Duration::from_millis(config.post_navigation_delay_ms),
            results_timeout_ms: config.results_timeout_ms,
        }
    }

    /// Category this extractor produces
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Records for `term`. Never fails: a missing results marker is a
    /// normal "no results" outcome, and any other error is logged and
    /// yields an empty list.
    pub async fn extract(&self, term: &SearchTerm, context: &dyn BrowserActions) -> Vec<Record> {
        match self.try_extract(term, context).await {
            Ok(records) => {
                info!(
                    term = %term,
                    category = %self.category,
                    count = records.len(),
                    "Extracted records"
                );
                records
            }
            Err(e) => {
                warn!(
                    term = %term,
                    category = %self.category,
                    error = %e,
                    "Extraction failed"
                );
                Vec::new()
            }
        }
    }

    async fn try_extract(
        &self,
        term: &SearchTerm,
        context: &dyn BrowserActions,
    ) -> Result<Vec<Record>> {
        let url = self.rules.search_url_for(&self.origin, term);
        debug!(term = %term, category = %self.category, url = %url, "Opening search results");
        context.navigate(&url).await?;

        tokio::time::sleep(self.post_navigation_delay).await;

        match context
            .wait_for_selector(&self.rules.results_marker, self.results_timeout_ms)
            .await
        {
            Ok(()) => {}
            Err(BrowserError::SelectorNotFound(_) | BrowserError::Timeout(_)) => {
                info!(term = %term, category = %self.category, "No results");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        }

        let scrolls = self.settler.settle(context).await;
        debug!(term = %term, category = %self.category, scrolls, "Results settled");

        let html = context.content().await?;
        ResultParser::new(self.category, &self.rules, self.origin.as_str()).parse(&html)
    }
}

/// One extractor per category, in crawl priority order.
#[must_use]
pub fn extractors_for(
    rules: &RuleSet,
    origin: &str,
    config: &CrawlConfig,
) -> Vec<CategoryExtractor> {
    Category::PRIORITY
        .iter()
        .map(|&category| {
            CategoryExtractor::new(category, rules.get(category).clone(), origin, config)
        })
        .collect()
}
