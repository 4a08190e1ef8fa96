//! Clipper - crawls social search results for a rotating set of terms and
//! forwards every record to an ingestion endpoint.
//!
//! One invocation is one unattended batch run: authenticate, crawl every
//! queued term, exit.

#![warn(clippy::all)]

pub mod exit;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clipper_browser::{BrowserEngine, ContextProvider};
use clipper_core::{AppConfig, SearchTerm};
use clipper_crawler::{CrawlDriver, RunReport};
use clipper_delivery::DeliverySink;
use clipper_extract::{extractors_for, RuleSet};
use clipper_queue::{RedisTermStore, TermQueue};
use clipper_session::{ConsoleSignal, Credentials, FileCredentialStore, SessionManager};
use tracing::{debug, error, info, warn};

/// Initialize tracing subscriber for logging
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,clipper=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

/// Run one crawl and report how it went as a process exit code.
pub async fn run() -> ExitCode {
    // Before tracing so RUST_LOG may come from .env
    let env_file = dotenvy::dotenv();
    init_tracing();

    info!("Starting clipper v{}", env!("CARGO_PKG_VERSION"));
    match env_file {
        Ok(path) => debug!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Could not read .env file"),
    }

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return exit::exit_code_for(&e);
        }
    };

    match crawl(config).await {
        Ok(report) => {
            info!(summary = %report, "Run complete");
            ExitCode::from(exit::OK)
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            exit::exit_code_for(&e)
        }
    }
}

fn load_config() -> anyhow::Result<AppConfig> {
    let config = AppConfig::load_with_env().context("loading configuration")?;
    config.validate().context("validating configuration")?;
    Ok(config)
}

/// Wire the components together and run one crawl.
///
/// The term store is connected before the browser launches. If it is down the
/// run ends early with an empty report, so credentials are not checked on that
/// run and a rejection only surfaces once the store is reachable again.
async fn crawl(config: AppConfig) -> anyhow::Result<RunReport> {
    let rules = RuleSet::load_or_builtin(config.crawl.rules_path.as_deref())
        .context("loading extraction rules")?;
    let sink = DeliverySink::new(&config.delivery).context("building delivery sink")?;
    if config.delivery.dry_run {
        warn!("Dry run: records will be logged, not delivered");
    }

    let store = match RedisTermStore::connect(&config.terms.redis_url, config.terms.set_key.clone())
        .await
    {
        Ok(store) => store,
        Err(e) => {
            // The next scheduled run retries; nothing to crawl without terms
            error!(error = %e, "Term store unavailable, skipping run");
            return Ok(RunReport::default());
        }
    };
    let queue = TermQueue::new(Box::new(store));
    provision(&queue, &config.terms.initial).await;

    let credential_path: PathBuf = config
        .session
        .resolved_credential_path()
        .context("resolving session file path")?;
    let session = SessionManager::new(
        config.site.clone(),
        config.session.clone(),
        Credentials::from(&config.account),
        Box::new(FileCredentialStore::new(credential_path)),
        Box::new(ConsoleSignal),
    );

    let engine = BrowserEngine::launch(&config.browser)
        .await
        .context("launching browser")?;
    let main = match engine.open_context().await {
        Ok(main) => main,
        Err(e) => {
            if let Err(close_err) = engine.shutdown().await {
                warn!(error = %close_err, "Browser did not shut down cleanly");
            }
            return Err(e).context("opening main browsing context");
        }
    };

    let extractors = extractors_for(&rules, &config.site.origin, &config.crawl);
    let driver = CrawlDriver::new(engine, session, queue, extractors, Box::new(sink))
        .with_term_delay(Duration::from_millis(config.crawl.delay_between_terms_ms));

    let result = driver.run(&main).await;

    if let Err(e) = driver.into_provider().shutdown().await {
        warn!(error = %e, "Browser did not shut down cleanly");
    }

    Ok(result?)
}

/// Reset the queue to the configured terms, if any are configured.
async fn provision(queue: &TermQueue, initial: &[String]) {
    let terms: Vec<SearchTerm> = initial
        .iter()
        .filter_map(|raw| match SearchTerm::new(raw.as_str()) {
            Ok(term) => Some(term),
            Err(e) => {
                warn!(term = %raw, error = %e, "Ignoring configured term");
                None
            }
        })
        .collect();

    if terms.is_empty() {
        debug!("No initial terms configured, using stored queue");
        return;
    }

    if let Err(e) = queue.provision(&terms).await {
        error!(error = %e, "Failed to provision search terms");
    }
}
