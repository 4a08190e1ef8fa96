//! Term provisioning and rotated retrieval.

use std::collections::HashSet;

use clipper_core::SearchTerm;
use rand::Rng;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::store::TermStore;

/// The crawl's work list.
pub struct TermQueue {
    store: Box<dyn TermStore>,
}

impl TermQueue {
    /// Wrap a store
    #[must_use]
    pub fn new(store: Box<dyn TermStore>) -> Self {
        Self { store }
    }

    /// Replace the stored set with `terms`.
    ///
    /// Terms already present after the reset are skipped, so duplicates in
    /// the input collapse. Returns how many terms were written.
    pub async fn provision(&self, terms: &[SearchTerm]) -> Result<usize> {
        self.store.clear().await?;

        let mut added = 0;
        for term in terms {
            if self.store.contains(term.as_str()).await? {
                debug!(term = %term, "Term already queued, skipping");
                continue;
            }
            if self.store.add(term.as_str()).await? {
                added += 1;
            }
        }

        info!(added, "Provisioned search terms");
        Ok(added)
    }

    /// Every stored term once, in cyclic order from a random start.
    ///
    /// A store failure is logged and yields an empty list.
    pub async fn fetch_rotated(&self) -> Vec<SearchTerm> {
        let terms = self.load_terms().await;
        if terms.is_empty() {
            return terms;
        }
        let offset = rand::thread_rng().gen_range(0..terms.len());
        debug!(count = terms.len(), offset, "Rotating search terms");
        rotate(terms, offset)
    }

    /// Same as [`fetch_rotated`](Self::fetch_rotated) with a caller-supplied
    /// source of randomness.
    pub async fn fetch_rotated_with<R: Rng + Send>(&self, rng: &mut R) -> Vec<SearchTerm> {
        let terms = self.load_terms().await;
        if terms.is_empty() {
            return terms;
        }
        let offset = rng.gen_range(0..terms.len());
        rotate(terms, offset)
    }

    /// Stored members, deduplicated and validated, in store order.
    async fn load_terms(&self) -> Vec<SearchTerm> {
        let members = match self.store.members().await {
            Ok(members) => members,
            Err(e) => {
                error!(error = %e, "Failed to read search terms");
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        let mut terms = Vec::with_capacity(members.len());
        for raw in members {
            match SearchTerm::new(&raw) {
                Ok(term) => {
                    if seen.insert(term.as_str().to_string()) {
                        terms.push(term);
                    }
                }
                Err(e) => warn!(raw = %raw, error = %e, "Ignoring unusable stored term"),
            }
        }
        terms
    }
}

/// Cyclic shift: element `offset` comes first, the ones before it wrap to the end.
#[must_use]
pub fn rotate<T>(mut items: Vec<T>, offset: usize) -> Vec<T> {
    if !items.is_empty() {
        let len = items.len();
        items.rotate_left(offset % len);
    }
    items
}
