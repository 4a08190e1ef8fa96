//! Configuration management for clipper.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use crate::types::SearchTerm;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "CLIPPER_CONFIG";

/// Main application configuration.
///
/// This is loaded from `~/.config/clipper/config.toml` (or platform equivalent),
/// or from the file named by `CLIPPER_CONFIG`. If the file doesn't exist,
/// default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Target site surfaces
    pub site: SiteConfig,
    /// Account credentials
    pub account: AccountConfig,
    /// Session and login settings
    pub session: SessionConfig,
    /// Term store settings
    pub terms: TermsConfig,
    /// Crawl pacing and extraction settings
    pub crawl: CrawlConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Downstream delivery settings
    pub delivery: DeliveryConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => Self::config_path()?,
        };
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file, falling back to defaults if absent.
    pub fn load_from(config_path: &Path) -> ConfigResult<Self> {
        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `CLIPPER_ACCOUNT_EMAIL` / `CLIPPER_ACCOUNT_PASSWORD`: account credentials
    /// - `CLIPPER_SEARCH_TERMS`: comma-separated initial term list
    /// - `CLIPPER_REDIS_URL`: term store URL
    /// - `CLIPPER_HEADLESS`: browser headless mode (true/false)
    /// - `CLIPPER_DELIVERY_ENDPOINT`: ingestion endpoint URL
    /// - `CLIPPER_DRY_RUN`: log payloads instead of sending them (true/false)
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(email) = lookup("CLIPPER_ACCOUNT_EMAIL") {
            self.account.email = email;
            tracing::debug!("Override account.email from env");
        }

        if let Some(password) = lookup("CLIPPER_ACCOUNT_PASSWORD") {
            self.account.password = password;
            tracing::debug!("Override account.password from env");
        }

        if let Some(terms) = lookup("CLIPPER_SEARCH_TERMS") {
            self.terms.initial = SearchTerm::parse_list(&terms)
                .into_iter()
                .map(String::from)
                .collect();
            tracing::debug!(
                "Override terms.initial from env: {} terms",
                self.terms.initial.len()
            );
        }

        if let Some(url) = lookup("CLIPPER_REDIS_URL") {
            tracing::debug!("Override terms.redis_url from env: {}", url);
            self.terms.redis_url = url;
        }

        if let Some(val) = lookup("CLIPPER_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Some(endpoint) = lookup("CLIPPER_DELIVERY_ENDPOINT") {
            tracing::debug!("Override delivery.endpoint from env: {}", endpoint);
            self.delivery.endpoint = endpoint;
        }

        if let Some(val) = lookup("CLIPPER_DRY_RUN") {
            if let Ok(dry_run) = val.parse() {
                self.delivery.dry_run = dry_run;
                tracing::debug!("Override delivery.dry_run from env: {}", dry_run);
            }
        }
    }

    /// Check that everything an unattended run needs is present.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.account.email.trim().is_empty() {
            return Err(ConfigError::Missing("account.email".to_string()));
        }
        if self.account.password.is_empty() {
            return Err(ConfigError::Missing("account.password".to_string()));
        }
        if !self.delivery.dry_run && self.delivery.endpoint.trim().is_empty() {
            return Err(ConfigError::Missing("delivery.endpoint".to_string()));
        }
        if self.crawl.settle_rounds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "crawl.settle_rounds".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.delivery.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "delivery.max_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.site.origin.starts_with("http") {
            return Err(ConfigError::InvalidValue {
                field: "site.origin".to_string(),
                reason: format!("expected an http(s) origin, got '{}'", self.site.origin),
            });
        }
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/clipper/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "clipper", "clipper").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/clipper`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "clipper", "clipper").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

/// Target site surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Origin prefixed to root-relative links
    pub origin: String,
    /// Home surface used to probe an existing session
    pub home_url: String,
    /// Login surface
    pub login_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: "https://www.facebook.com".to_string(),
            home_url: "https://www.facebook.com/".to_string(),
            login_url: "https://www.facebook.com/login".to_string(),
        }
    }
}

/// Account credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Login email
    pub email: String,
    /// Login password (never written back to disk)
    #[serde(skip_serializing)]
    pub password: String,
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A DOM signal probed on the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Marker {
    /// Present when the CSS selector matches at least one element
    Selector(String),
    /// Present when the visible body text contains the string
    Text(String),
}

/// Session and login settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Cookie file; defaults to `session.json` in the data directory
    pub credential_path: Option<PathBuf>,
    /// Only present when logged in
    pub logged_in_marker: Marker,
    /// Anti-automation challenge
    pub challenge_marker: Marker,
    /// Shown when credentials are rejected
    pub rejected_marker: Marker,
    /// Email input
    pub email_selector: String,
    /// Password input
    pub password_selector: String,
    /// Login button
    pub submit_selector: String,
    /// Bound on waiting for the login button
    pub submit_timeout_ms: u64,
    /// Delay between keystrokes when typing credentials
    pub typing_delay_ms: u64,
    /// Pause after submitting before probing for a challenge
    pub challenge_probe_delay_ms: u64,
}

impl SessionConfig {
    /// Resolve the credential file location.
    pub fn resolved_credential_path(&self) -> ConfigResult<PathBuf> {
        match &self.credential_path {
            Some(path) => Ok(path.clone()),
            None => Ok(AppConfig::data_dir()?.join("session.json")),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            credential_path: None,
            logged_in_marker: Marker::Text("Find Friends".to_string()),
            challenge_marker: Marker::Selector(r#"img[alt="captcha"]"#.to_string()),
            rejected_marker: Marker::Text("Find your account".to_string()),
            email_selector: r#"input[id="email"], input[name="email"]"#.to_string(),
            password_selector: r#"input[id="pass"], input[name="pass"]"#.to_string(),
            submit_selector: r#"button[name="login"], button[type="submit"]"#.to_string(),
            submit_timeout_ms: 5000,
            typing_delay_ms: 100,
            challenge_probe_delay_ms: 5000,
        }
    }
}

/// Term store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TermsConfig {
    /// Redis connection URL
    pub redis_url: String,
    /// Key of the persisted term set
    pub set_key: String,
    /// Terms to provision before the run; empty keeps the persisted set as-is
    pub initial: Vec<String>,
}

impl Default for TermsConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            set_key: "fb_channels".to_string(),
            initial: Vec::new(),
        }
    }
}

/// Crawl pacing and extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum scroll rounds while settling a result list
    pub settle_rounds: u32,
    /// Dwell after each scroll
    pub settle_dwell_ms: u64,
    /// Fixed wait after navigating to a search surface
    pub post_navigation_delay_ms: u64,
    /// Bound on waiting for the results container
    pub results_timeout_ms: u64,
    /// Pause between terms
    pub delay_between_terms_ms: u64,
    /// TOML file replacing the built-in extraction rules
    pub rules_path: Option<PathBuf>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            settle_rounds: 3,
            settle_dwell_ms: 5000,
            post_navigation_delay_ms: 5000,
            results_timeout_ms: 10_000,
            delay_between_terms_ms: 2000,
            rules_path: None,
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode. Off by default so a human can answer challenges.
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Persistent browser profile directory
    pub user_data_dir: Option<PathBuf>,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
    /// Minimum delay between navigations to the same domain
    pub min_navigation_delay_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            window_width: 1920,
            window_height: 1080,
            user_data_dir: None,
            navigation_timeout_secs: 30,
            min_navigation_delay_ms: 1000,
        }
    }
}

/// Downstream delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Ingestion endpoint receiving one record per POST
    pub endpoint: String,
    /// Attempts per record, including the first
    pub max_attempts: u32,
    /// First retry delay; doubles on each further attempt
    pub base_backoff_ms: u64,
    /// Cap on a single retry delay
    pub max_backoff_ms: u64,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Log payloads instead of sending them
    pub dry_run: bool,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            max_attempts: 3,
            base_backoff_ms: 1000,
            max_backoff_ms: 30_000,
            timeout_secs: 30,
            dry_run: false,
        }
    }
}
