use clipper_session::AuthError;
use thiserror::Error;

/// Errors that end a crawl run.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Could not establish an authenticated session
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
}

impl CrawlError {
    /// Whether the site refused the configured credentials
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        match self {
            Self::Auth(e) => e.is_fatal(),
        }
    }
}

/// Result type for crawl runs.
pub type Result<T> = std::result::Result<T, CrawlError>;
