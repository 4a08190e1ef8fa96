//! Infinite-scroll settling.

use std::time::Duration;

use clipper_browser::BrowserActions;
use clipper_core::CrawlConfig;
use tracing::{debug, warn};

/// Scrolls a results page until its height stops growing or the round
/// budget runs out.
#[derive(Debug, Clone)]
pub struct PageSettler {
    max_rounds: u32,
    dwell: Duration,
}

impl PageSettler {
    /// Settler with an explicit round budget and per-round dwell
    #[must_use]
    pub fn new(max_rounds: u32, dwell: Duration) -> Self {
        Self { max_rounds, dwell }
    }

    /// Settler using the crawl section's settings
    #[must_use]
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(
            config.settle_rounds,
            Duration::from_millis(config.settle_dwell_ms),
        )
    }

    /// Scroll until stable. Best effort: browser errors end settling early
    /// and are only logged. Returns the number of scrolls performed.
    pub async fn settle(&self, context: &dyn BrowserActions) -> u32 {
        let mut previous_height = 0;
        let mut scrolls = 0;

        for round in 0..self.max_rounds {
            let height = match context.scroll_height().await {
                Ok(height) => height,
                Err(e) => {
                    warn!(error = %e, round, "Could not measure page height, stopping scroll");
                    break;
                }
            };

            if height == previous_height {
                debug!(round, height, "Page height stable");
                break;
            }
            previous_height = height;

            if let Err(e) = context.scroll_to_bottom().await {
                warn!(error = %e, round, "Scroll failed, stopping");
                break;
            }
            scrolls += 1;

            tokio::time::sleep(self.dwell).await;
        }

        scrolls
    }
}
