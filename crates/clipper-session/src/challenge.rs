//! Human-in-the-loop challenge resolution.

use crate::error::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Source of the "challenge solved" signal.
#[async_trait]
pub trait ChallengeSignal: Send + Sync {
    /// Block until a human reports the challenge as solved. No timeout.
    async fn wait_for_resolution(&self) -> Result<()>;
}

/// Waits for Enter on standard input.
pub struct ConsoleSignal;

#[async_trait]
impl ChallengeSignal for ConsoleSignal {
    async fn wait_for_resolution(&self) -> Result<()> {
        tracing::warn!("Verification challenge detected. Solve it in the browser window and press Enter.");

        let mut line = String::new();
        let read = BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        if read == 0 {
            tracing::warn!("Standard input is closed; continuing without confirmation");
        }
        Ok(())
    }
}
