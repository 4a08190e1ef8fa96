//! Error types for the session subsystem.

use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// The site rejected the configured credentials. Fatal for the run.
    #[error("credentials rejected by the site")]
    Rejected,

    /// The login form is not on the page (the site already considers us logged in)
    #[error("login controls not found")]
    MissingControls,

    /// Browser failure while probing or logging in
    #[error("browser error: {0}")]
    Browser(#[from] clipper_browser::BrowserError),

    /// Credential file could not be read or written
    #[error("credential store error: {0}")]
    Store(String),

    /// The human signal source failed
    #[error("challenge signal failed: {0}")]
    Signal(#[from] std::io::Error),
}

impl AuthError {
    /// Whether this error must end the run
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_rejection_is_fatal() {
        assert!(AuthError::Rejected.is_fatal());
        assert!(!AuthError::MissingControls.is_fatal());
        assert!(!AuthError::Store("disk full".to_string()).is_fatal());
    }
}
