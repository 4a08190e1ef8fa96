//! Process exit codes.

use std::process::ExitCode;

use clipper_core::ConfigError;
use clipper_crawler::CrawlError;
use clipper_delivery::DeliveryError;
use clipper_extract::ExtractError;

/// Run finished, or there was nothing to crawl
pub const OK: u8 = 0;
/// The site refused the account credentials
pub const REJECTED: u8 = 1;
/// Configuration is missing or invalid
pub const CONFIG: u8 = 2;
/// Anything else that stopped the run, e.g. the browser failed to start
pub const STARTUP: u8 = 3;

/// Exit code for a failed run.
#[must_use]
pub fn code_for(error: &anyhow::Error) -> u8 {
    if error
        .downcast_ref::<CrawlError>()
        .is_some_and(CrawlError::is_rejected)
    {
        REJECTED
    } else if error.downcast_ref::<ConfigError>().is_some()
        || error.downcast_ref::<ExtractError>().is_some()
        || matches!(
            error.downcast_ref::<DeliveryError>(),
            Some(DeliveryError::InvalidEndpoint { .. })
        )
    {
        CONFIG
    } else {
        STARTUP
    }
}

/// [`ExitCode`] for a failed run
#[must_use]
pub fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    ExitCode::from(code_for(error))
}
