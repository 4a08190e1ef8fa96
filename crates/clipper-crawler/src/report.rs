//! Per-run counts.

use std::fmt;

use clipper_core::SearchTerm;

/// Counts for one term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermReport {
    /// The term crawled
    pub term: SearchTerm,
    /// Records extracted across all categories
    pub extracted: usize,
    /// Records the sink accounted for
    pub delivered: usize,
    /// Records the sink gave up on
    pub failed: usize,
    /// Set when no browsing context could be opened for the term
    pub context_error: Option<String>,
}

impl TermReport {
    pub(crate) fn new(term: SearchTerm) -> Self {
        Self {
            term,
            extracted: 0,
            delivered: 0,
            failed: 0,
            context_error: None,
        }
    }
}

/// Outcome of one crawl run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One entry per term, in crawl order
    pub terms: Vec<TermReport>,
}

impl RunReport {
    /// Total records extracted
    #[must_use]
    pub fn extracted(&self) -> usize {
        self.terms.iter().map(|t| t.extracted).sum()
    }

    /// Total records delivered
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.terms.iter().map(|t| t.delivered).sum()
    }

    /// Total records lost
    #[must_use]
    pub fn failed(&self) -> usize {
        self.terms.iter().map(|t| t.failed).sum()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} terms, {} records extracted, {} delivered, {} failed",
            self.terms.len(),
            self.extracted(),
            self.delivered(),
            self.failed()
        )
    }
}
