use crate::cookies::BrowserCookie;
use crate::error::{BrowserError, Result};
use std::time::Duration;

/// Operations on one browsing context (a tab).
#[async_trait::async_trait]
pub trait BrowserActions: Send + Sync {
    /// Navigate to a URL and wait for the load event
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Wait for an in-flight navigation (e.g. after a form submit) to finish
    async fn wait_for_navigation(&self) -> Result<()>;

    /// Wait for a selector to appear
    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<()>;

    /// Whether the selector currently matches anything
    async fn exists(&self, selector: &str) -> Result<bool>;

    /// Type into a field one keystroke at a time
    async fn type_text(&self, selector: &str, value: &str, keystroke_delay: Duration)
        -> Result<()>;

    /// Click an element by selector
    async fn click(&self, selector: &str) -> Result<()>;

    /// Visible text of the document body
    async fn body_text(&self) -> Result<String>;

    /// Serialized HTML of the current document
    async fn content(&self) -> Result<String>;

    /// Total rendered height of the document
    async fn scroll_height(&self) -> Result<u64>;

    /// Scroll the window to the bottom of the document
    async fn scroll_to_bottom(&self) -> Result<()>;

    /// Cookies visible to this context
    async fn cookies(&self) -> Result<Vec<BrowserCookie>>;

    /// Install cookies into this context
    async fn set_cookies(&self, cookies: &[BrowserCookie]) -> Result<()>;

    /// Close the context
    async fn close(&self) -> Result<()>;
}

/// Opens fresh browsing contexts.
#[async_trait::async_trait]
pub trait ContextProvider: Send + Sync {
    /// Context type handed out
    type Context: BrowserActions;

    /// Open a new context sharing the provider's session state
    async fn open_context(&self) -> Result<Self::Context>;
}

/// Helper to extract domain from URL
pub fn extract_domain(url: &str) -> Result<String> {
    let url = url::Url::parse(url)
        .map_err(|e| BrowserError::NavigationError(format!("Invalid URL: {}", e)))?;

    url.host_str()
        .ok_or_else(|| BrowserError::NavigationError("No host in URL".to_string()))
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            extract_domain("https://www.facebook.com/search/videos/?q=x").unwrap(),
            "www.facebook.com"
        );
        assert_eq!(
            extract_domain("http://subdomain.example.com:8080/path").unwrap(),
            "subdomain.example.com"
        );
    }

    #[test]
    fn test_extract_domain_invalid() {
        assert!(extract_domain("not-a-url").is_err());
    }
}
