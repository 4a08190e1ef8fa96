//! Record sinks.

use std::time::Duration;

use async_trait::async_trait;
use clipper_core::DeliveryConfig;
use clipper_extract::Record;
use reqwest::{Client, Url};
use tracing::{debug, error, info, warn};

use crate::error::{DeliveryError, Result};

/// What happened to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Endpoint accepted the record
    Delivered {
        /// Attempts used, including the successful one
        attempts: u32,
    },
    /// Logged instead of sent
    DryRun,
    /// Endpoint refused the payload; not retried
    Rejected {
        /// Status the endpoint returned
        status: u16,
    },
    /// Every attempt failed
    Failed {
        /// Attempts made
        attempts: u32,
    },
}

impl DeliveryOutcome {
    /// Whether the record is accounted for downstream (or would be, in dry-run mode)
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. } | Self::DryRun)
    }
}

/// Destination for extracted records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Deliver one record. Failures are reported in the outcome, never raised.
    async fn deliver(&self, record: &Record) -> DeliveryOutcome;
}

/// Delay before retry number `retry` (1-based): `base * 2^(retry-1)`, capped at `max`.
#[must_use]
pub fn backoff_delay(retry: u32, base: Duration, max: Duration) -> Duration {
    let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
    base.saturating_mul(factor).min(max)
}

/// HTTP sink posting JSON records to the ingestion endpoint.
pub struct DeliverySink {
    client: Client,
    endpoint: Option<Url>,
    max_attempts: u32,
    base_backoff: Duration,
    max_backoff: Duration,
    dry_run: bool,
}

impl DeliverySink {
    /// Build a sink from the delivery section.
    ///
    /// The endpoint must be an absolute http(s) URL unless running dry.
    pub fn new(config: &DeliveryConfig) -> Result<Self> {
        let endpoint = if config.dry_run && config.endpoint.trim().is_empty() {
            None
        } else {
            Some(parse_endpoint(&config.endpoint)?)
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("clipper/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            max_attempts: config.max_attempts.max(1),
            base_backoff: Duration::from_millis(config.base_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            dry_run: config.dry_run,
        })
    }

    async fn post_once(&self, endpoint: &Url, record: &Record) -> Result<()> {
        let response = self
            .client
            .post(endpoint.clone())
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DeliveryError::Status(status))
        }
    }
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| DeliveryError::InvalidEndpoint {
        endpoint: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(DeliveryError::InvalidEndpoint {
            endpoint: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(url)
}

#[async_trait]
impl RecordSink for DeliverySink {
    async fn deliver(&self, record: &Record) -> DeliveryOutcome {
        let category = record.category();

        let endpoint = match (&self.endpoint, self.dry_run) {
            (Some(endpoint), false) => endpoint,
            _ => {
                let payload = serde_json::to_string(record).unwrap_or_default();
                info!(category = %category, payload = %payload, "Dry run, not delivering");
                return DeliveryOutcome::DryRun;
            }
        };

        for attempt in 1..=self.max_attempts {
            match self.post_once(endpoint, record).await {
                Ok(()) => {
                    info!(category = %category, url = %record.url(), attempt, "Delivered record");
                    return DeliveryOutcome::Delivered { attempts: attempt };
                }
                Err(e) if !e.is_retryable() => {
                    if let DeliveryError::Status(status) = &e {
                        error!(
                            category = %category,
                            url = %record.url(),
                            status = status.as_u16(),
                            "Endpoint rejected record"
                        );
                        return DeliveryOutcome::Rejected {
                            status: status.as_u16(),
                        };
                    }
                    error!(category = %category, url = %record.url(), error = %e, "Delivery failed");
                    return DeliveryOutcome::Failed { attempts: attempt };
                }
                Err(e) => {
                    if attempt < self.max_attempts {
                        let delay = backoff_delay(attempt, self.base_backoff, self.max_backoff);
                        warn!(
                            category = %category,
                            error = %e,
                            "Delivery attempt {}/{} failed, retrying in {:?}",
                            attempt,
                            self.max_attempts,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                    } else {
                        debug!(category = %category, error = %e, "Last delivery attempt failed");
                    }
                }
            }
        }

        error!(
            category = %category,
            url = %record.url(),
            attempts = self.max_attempts,
            "Giving up on record"
        );
        DeliveryOutcome::Failed {
            attempts: self.max_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_then_caps() {
        let base = Duration::from_millis(1000);
        let max = Duration::from_millis(30_000);
        assert_eq!(backoff_delay(1, base, max), Duration::from_millis(1000));
        assert_eq!(backoff_delay(2, base, max), Duration::from_millis(2000));
        assert_eq!(backoff_delay(3, base, max), Duration::from_millis(4000));
        assert_eq!(backoff_delay(6, base, max), Duration::from_millis(30_000));
        assert_eq!(backoff_delay(40, base, max), Duration::from_millis(30_000));
    }

    #[test]
    fn test_endpoint_must_be_http() {
        assert!(parse_endpoint("https://ingest.example.com/records").is_ok());
        assert!(parse_endpoint("ftp://ingest.example.com").is_err());
        assert!(parse_endpoint("").is_err());
    }

    #[test]
    fn test_dry_run_needs_no_endpoint() {
        let config = DeliveryConfig {
            dry_run: true,
            ..DeliveryConfig::default()
        };
        assert!(DeliverySink::new(&config).is_ok());
    }

    #[test]
    fn test_live_sink_needs_endpoint() {
        let config = DeliveryConfig::default();
        assert!(matches!(
            DeliverySink::new(&config),
            Err(DeliveryError::InvalidEndpoint { .. })
        ));
    }
}
