//! Term store abstraction.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;
use tokio::sync::RwLock;

/// A named set of strings in durable storage.
#[async_trait]
pub trait TermStore: Send + Sync {
    /// Remove every member
    async fn clear(&self) -> Result<()>;

    /// Whether `term` is a member
    async fn contains(&self, term: &str) -> Result<bool>;

    /// Insert `term`; returns whether it was newly added
    async fn add(&self, term: &str) -> Result<bool>;

    /// Every member, in no particular order
    async fn members(&self) -> Result<Vec<String>>;
}

/// In-process store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryTermStore {
    terms: RwLock<BTreeSet<String>>,
}

impl MemoryTermStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TermStore for MemoryTermStore {
    async fn clear(&self) -> Result<()> {
        self.terms.write().await.clear();
        Ok(())
    }

    async fn contains(&self, term: &str) -> Result<bool> {
        Ok(self.terms.read().await.contains(term))
    }

    async fn add(&self, term: &str) -> Result<bool> {
        Ok(self.terms.write().await.insert(term.to_string()))
    }

    async fn members(&self) -> Result<Vec<String>> {
        Ok(self.terms.read().await.iter().cloned().collect())
    }
}
