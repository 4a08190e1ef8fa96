//! The crawl loop.

use std::time::Duration;

use clipper_browser::{BrowserActions, ContextProvider};
use clipper_core::{Category, SearchTerm};
use clipper_delivery::RecordSink;
use clipper_extract::CategoryExtractor;
use clipper_queue::TermQueue;
use clipper_session::SessionManager;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::report::{RunReport, TermReport};

/// Runs one crawl over every queued term.
///
/// All collaborators are handed in at construction; the driver owns them
/// for its lifetime and processes terms strictly one at a time.
pub struct CrawlDriver<P: ContextProvider> {
    provider: P,
    session: SessionManager,
    queue: TermQueue,
    extractors: Vec<CategoryExtractor>,
    sink: Box<dyn RecordSink>,
    term_delay: Duration,
}

impl<P: ContextProvider> CrawlDriver<P> {
    /// Assemble a driver. Extractors run in [`Category::PRIORITY`] order
    /// whatever order they are given in.
    pub fn new(
        provider: P,
        session: SessionManager,
        queue: TermQueue,
        mut extractors: Vec<CategoryExtractor>,
        sink: Box<dyn RecordSink>,
    ) -> Self {
        extractors.sort_by_key(|e| priority(e.category()));
        Self {
            provider,
            session,
            queue,
            extractors,
            sink,
            term_delay: Duration::ZERO,
        }
    }

    /// Pause between consecutive terms
    #[must_use]
    pub fn with_term_delay(mut self, delay: Duration) -> Self {
        self.term_delay = delay;
        self
    }

    /// Give back the context provider, e.g. to shut the browser down
    pub fn into_provider(self) -> P {
        self.provider
    }

    /// Authenticate on `main`, then crawl every queued term.
    ///
    /// `main` is closed before returning, on success and on failure. The
    /// only error is an authentication failure; an empty queue is an
    /// empty report.
    pub async fn run(&self, main: &dyn BrowserActions) -> Result<RunReport> {
        let result = self.crawl(main).await;

        if let Err(e) = main.close().await {
            warn!(error = %e, "Failed to close main browsing context");
        }

        result
    }

    async fn crawl(&self, main: &dyn BrowserActions) -> Result<RunReport> {
        info!("Ensuring authenticated session");
        self.session.ensure_authenticated(main).await?;

        let terms = self.queue.fetch_rotated().await;
        if terms.is_empty() {
            info!("No search terms queued, nothing to crawl");
            return Ok(RunReport::default());
        }
        info!(count = terms.len(), "Starting crawl");

        let mut report = RunReport::default();
        for (index, term) in terms.iter().enumerate() {
            if index > 0 && !self.term_delay.is_zero() {
                tokio::time::sleep(self.term_delay).await;
            }
            report.terms.push(self.crawl_term(term).await);
        }

        info!(summary = %report, "Crawl finished");
        Ok(report)
    }

    async fn crawl_term(&self, term: &SearchTerm) -> TermReport {
        let mut report = TermReport::new(term.clone());

        info!(term = %term, "Crawling term");
        let context = match self.provider.open_context().await {
            Ok(context) => context,
            Err(e) => {
                warn!(term = %term, error = %e, "Could not open browsing context, skipping term");
                report.context_error = Some(e.to_string());
                return report;
            }
        };

        for extractor in &self.extractors {
            let records = extractor.extract(term, &context).await;
            report.extracted += records.len();

            for record in &records {
                if self.sink.deliver(record).await.is_delivered() {
                    report.delivered += 1;
                } else {
                    report.failed += 1;
                }
            }
        }

        if let Err(e) = context.close().await {
            warn!(term = %term, error = %e, "Failed to close browsing context");
        }

        debug!(
            term = %term,
            extracted = report.extracted,
            delivered = report.delivered,
            failed = report.failed,
            "Term done"
        );
        report
    }
}

fn priority(category: Category) -> usize {
    Category::PRIORITY
        .iter()
        .position(|c| *c == category)
        .unwrap_or(usize::MAX)
}
