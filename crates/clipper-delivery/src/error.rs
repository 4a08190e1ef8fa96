//! Error types for delivery.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors from a single delivery attempt or from building the sink.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Endpoint URL is unusable
    #[error("invalid delivery endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The configured endpoint
        endpoint: String,
        /// Why it was refused
        reason: String,
    },

    /// Request never got a response
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("endpoint returned {0}")]
    Status(StatusCode),
}

impl DeliveryError {
    /// Whether another attempt might succeed.
    ///
    /// Server errors, 408 and 429 are transient; other client errors mean
    /// the payload itself was refused.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::InvalidEndpoint { .. } => false,
            Self::Http(e) => !e.is_builder(),
            Self::Status(status) => {
                status.is_server_error()
                    || *status == StatusCode::REQUEST_TIMEOUT
                    || *status == StatusCode::TOO_MANY_REQUESTS
            }
        }
    }
}

/// Result type for delivery.
pub type Result<T> = std::result::Result<T, DeliveryError>;
