use crate::actions::ContextProvider;
use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use crate::page::BrowserPage;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use clipper_core::BrowserConfig;
use futures_util::stream::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Per-domain navigation pacing
#[derive(Debug)]
pub(crate) struct RateLimiter {
    last_access: HashMap<String, Instant>,
    min_delay: Duration,
}

impl RateLimiter {
    pub(crate) fn new(min_delay_ms: u64) -> Self {
        Self {
            last_access: HashMap::new(),
            min_delay: Duration::from_millis(min_delay_ms),
        }
    }

    /// Sleep until `domain` may be hit again, then record the access.
    /// Returns how long the caller waited.
    pub(crate) async fn wait_turn(&mut self, domain: &str) -> Duration {
        let mut waited = Duration::ZERO;
        if let Some(last) = self.last_access.get(domain) {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                waited = self.min_delay - elapsed;
                tracing::debug!("Pacing navigation to {} for {:?}", domain, waited);
                tokio::time::sleep(waited).await;
            }
        }
        self.last_access.insert(domain.to_string(), Instant::now());
        waited
    }
}

/// Browser automation engine
pub struct BrowserEngine {
    browser: Mutex<Browser>,
    handler_task: JoinHandle<()>,
    fingerprint: FingerprintConfig,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    navigation_timeout: Duration,
}

impl BrowserEngine {
    /// Launch Chrome with the given settings
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let fingerprint = FingerprintConfig::with_viewport(config.window_width, config.window_height);

        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height)
            .request_timeout(Duration::from_secs(config.navigation_timeout_secs))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");

        // with_head means NOT headless
        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(dir) = &config.user_data_dir {
            builder = builder.user_data_dir(dir);
        }

        let chrome_config = builder.build().map_err(BrowserError::ChromiumError)?;

        tracing::info!("Launching browser (headless={})", config.headless);
        let (browser, mut handler) = Browser::launch(chrome_config).await?;

        // Spawn browser handler
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser: Mutex::new(browser),
            handler_task,
            fingerprint,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(config.min_navigation_delay_ms))),
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
        })
    }

    /// Open a new tab carrying the engine's fingerprint
    pub async fn new_context(&self) -> Result<BrowserPage> {
        let page = self.browser.lock().await.new_page("about:blank").await?;
        page.execute(SetUserAgentOverrideParams::new(
            self.fingerprint.user_agent.clone(),
        ))
        .await?;

        Ok(BrowserPage::new(
            page,
            Arc::clone(&self.rate_limiter),
            self.navigation_timeout,
        ))
    }

    /// Close the browser and stop its event handler
    pub async fn shutdown(self) -> Result<()> {
        let mut browser = self.browser.into_inner();
        let closed = browser.close().await;
        match browser.wait().await {
            Ok(status) => tracing::debug!("Browser process exited: {:?}", status),
            Err(e) => tracing::debug!("Could not reap browser process: {}", e),
        }
        self.handler_task.abort();
        closed.map(|_| ()).map_err(Into::into)
    }
}

#[async_trait::async_trait]
impl ContextProvider for BrowserEngine {
    type Context = BrowserPage;

    async fn open_context(&self) -> Result<BrowserPage> {
        self.new_context().await
    }
}
