//! Chrome tab implementing [`BrowserActions`].

use crate::actions::{extract_domain, BrowserActions};
use crate::cookies::BrowserCookie;
use crate::engine::RateLimiter;
use crate::error::{BrowserError, Result};
use chromiumoxide::Page;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One browser tab.
pub struct BrowserPage {
    page: Page,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    navigation_timeout: Duration,
}

impl BrowserPage {
    pub(crate) fn new(
        page: Page,
        rate_limiter: Arc<Mutex<RateLimiter>>,
        navigation_timeout: Duration,
    ) -> Self {
        Self {
            page,
            rate_limiter,
            navigation_timeout,
        }
    }

    async fn evaluate<T: serde::de::DeserializeOwned>(&self, script: &str) -> Result<T> {
        self.page
            .evaluate(script.to_string())
            .await
            .map_err(|e| BrowserError::ScriptError(e.to_string()))?
            .into_value()
            .map_err(|e| BrowserError::ScriptError(e.to_string()))
    }
}

#[async_trait::async_trait]
impl BrowserActions for BrowserPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        let domain = extract_domain(url)?;
        self.rate_limiter.lock().await.wait_turn(&domain).await;

        tracing::debug!("Navigating to {}", url);
        match tokio::time::timeout(self.navigation_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::NavigationError(format!("{url}: {e}"))),
            Err(_) => Err(BrowserError::Timeout(format!("navigating to {url}"))),
        }
    }

    async fn wait_for_navigation(&self) -> Result<()> {
        match tokio::time::timeout(self.navigation_timeout, self.page.wait_for_navigation()).await
        {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::NavigationError(e.to_string())),
            Err(_) => Err(BrowserError::Timeout("waiting for navigation".to_string())),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<()> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::SelectorNotFound(selector.to_string()));
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        // No match comes back as an empty list; an error is a browser failure
        let elements = self.page.find_elements(selector).await?;
        Ok(!elements.is_empty())
    }

    async fn type_text(
        &self,
        selector: &str,
        value: &str,
        keystroke_delay: Duration,
    ) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;
        element.click().await?;

        for ch in value.chars() {
            element.type_str(ch.to_string()).await?;
            tokio::time::sleep(keystroke_delay).await;
        }
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?
            .click()
            .await?;
        Ok(())
    }

    async fn body_text(&self) -> Result<String> {
        self.evaluate("document.body ? document.body.innerText : ''")
            .await
    }

    async fn content(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    async fn scroll_height(&self) -> Result<u64> {
        let height: f64 = self
            .evaluate("document.body ? document.body.scrollHeight : 0")
            .await?;
        Ok(height.max(0.0) as u64)
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight)".to_string())
            .await
            .map_err(|e| BrowserError::ScriptError(e.to_string()))?;
        Ok(())
    }

    async fn cookies(&self) -> Result<Vec<BrowserCookie>> {
        let cookies = self.page.get_cookies().await?;
        Ok(cookies.iter().map(BrowserCookie::from).collect())
    }

    async fn set_cookies(&self, cookies: &[BrowserCookie]) -> Result<()> {
        let mut params = Vec::with_capacity(cookies.len());
        for cookie in cookies {
            match cookie.to_param() {
                Ok(param) => params.push(param),
                Err(e) => tracing::warn!("Skipping cookie {}: {}", cookie.name, e),
            }
        }
        self.page.set_cookies(params).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.page.clone().close().await?;
        Ok(())
    }
}
