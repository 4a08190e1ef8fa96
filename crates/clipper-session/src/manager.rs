//! Session manager and its authentication state machine.

use crate::challenge::ChallengeSignal;
use crate::credential::{CredentialStore, Credentials, SessionCredential};
use crate::error::{AuthError, Result};
use chrono::Utc;
use clipper_browser::BrowserActions;
use clipper_core::{Marker, SessionConfig, SiteConfig};
use std::sync::Mutex;
use std::time::Duration;

/// Where the manager is in establishing a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Nothing attempted yet
    Unauthenticated,
    /// Stored cookies applied, probing the home surface
    ProbingSession,
    /// Filling and submitting the login form
    LoggingIn,
    /// Suspended until a human solves a verification challenge
    AwaitingHuman,
    /// Submitted, checking whether the site accepted the credentials
    Verifying,
    /// Logged in
    Authenticated,
    /// Credentials refused
    Rejected,
}

/// Establishes and verifies the authenticated session.
pub struct SessionManager {
    site: SiteConfig,
    config: SessionConfig,
    credentials: Credentials,
    store: Box<dyn CredentialStore>,
    signal: Box<dyn ChallengeSignal>,
    state: Mutex<AuthState>,
}

impl SessionManager {
    /// Create a session manager.
    pub fn new(
        site: SiteConfig,
        config: SessionConfig,
        credentials: Credentials,
        store: Box<dyn CredentialStore>,
        signal: Box<dyn ChallengeSignal>,
    ) -> Self {
        Self {
            site,
            config,
            credentials,
            store,
            signal,
            state: Mutex::new(AuthState::Unauthenticated),
        }
    }

    /// Current state
    pub fn state(&self) -> AuthState {
        *self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn transition(&self, next: AuthState) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        tracing::debug!("Auth state {:?} -> {:?}", *state, next);
        *state = next;
    }

    /// Make sure `context` is logged in, reusing stored cookies when they still work.
    ///
    /// Returns [`AuthError::Rejected`] when the site refuses the credentials;
    /// that error must end the run.
    pub async fn ensure_authenticated(&self, context: &dyn BrowserActions) -> Result<()> {
        tracing::info!("Checking session");

        match self.resume_stored_session(context).await {
            Ok(true) => {
                tracing::info!("Already logged in");
                self.transition(AuthState::Authenticated);
                return Ok(());
            }
            Ok(false) => {}
            Err(e) => tracing::warn!("Stored session unusable, logging in again: {}", e),
        }

        match self.login(context).await {
            Ok(()) => {
                self.transition(AuthState::Authenticated);
                tracing::info!("Logged in and session saved");
                Ok(())
            }
            Err(AuthError::MissingControls) => {
                tracing::info!("Already logged in (login form not found)");
                self.transition(AuthState::Authenticated);
                Ok(())
            }
            Err(AuthError::Rejected) => {
                self.transition(AuthState::Rejected);
                tracing::error!("Login failed: credentials rejected");
                Err(AuthError::Rejected)
            }
            Err(e) => {
                self.transition(AuthState::Unauthenticated);
                Err(e)
            }
        }
    }

    /// Apply stored cookies and probe the home surface. `Ok(false)` means a login is needed.
    async fn resume_stored_session(&self, context: &dyn BrowserActions) -> Result<bool> {
        let Some(credential) = self.store.load().await? else {
            tracing::debug!("No stored session");
            return Ok(false);
        };

        #[allow(clippy::cast_precision_loss)]
        let now = Utc::now().timestamp() as f64;
        let cookies: Vec<_> = credential
            .cookies
            .into_iter()
            .filter(|c| !c.is_expired_at(now))
            .collect();
        if cookies.is_empty() {
            tracing::debug!("Stored session has no live cookies");
            return Ok(false);
        }

        self.transition(AuthState::ProbingSession);
        context.set_cookies(&cookies).await?;
        context.navigate(&self.site.home_url).await?;

        probe(context, &self.config.logged_in_marker).await
    }

    async fn login(&self, context: &dyn BrowserActions) -> Result<()> {
        self.transition(AuthState::LoggingIn);
        tracing::info!("Logging in as {}", self.credentials.email);
        context.navigate(&self.site.login_url).await?;

        if !context.exists(&self.config.email_selector).await? {
            return Err(AuthError::MissingControls);
        }

        let keystroke = Duration::from_millis(self.config.typing_delay_ms);
        context
            .type_text(&self.config.email_selector, &self.credentials.email, keystroke)
            .await?;
        context
            .type_text(
                &self.config.password_selector,
                self.credentials.password(),
                keystroke,
            )
            .await?;

        context
            .wait_for_selector(&self.config.submit_selector, self.config.submit_timeout_ms)
            .await?;
        context.click(&self.config.submit_selector).await?;

        tokio::time::sleep(Duration::from_millis(self.config.challenge_probe_delay_ms)).await;
        if probe(context, &self.config.challenge_marker).await? {
            self.transition(AuthState::AwaitingHuman);
            self.signal.wait_for_resolution().await?;
            tracing::info!("Challenge resolved, continuing");
        }

        self.transition(AuthState::Verifying);
        // The page may already have finished navigating while we waited
        if let Err(e) = context.wait_for_navigation().await {
            tracing::debug!("No navigation after login submit: {}", e);
        }

        if probe(context, &self.config.rejected_marker).await? {
            return Err(AuthError::Rejected);
        }

        // Persisting is best-effort: the live session is already usable
        match context.cookies().await {
            Ok(cookies) => {
                if let Err(e) = self.store.save(&SessionCredential::new(cookies)).await {
                    tracing::warn!("Failed to persist session: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to read session cookies: {}", e),
        }

        Ok(())
    }
}

/// Whether `marker` is currently present on the page.
async fn probe(context: &dyn BrowserActions, marker: &Marker) -> Result<bool> {
    match marker {
        Marker::Selector(selector) => Ok(context.exists(selector).await?),
        Marker::Text(text) => Ok(context.body_text().await?.contains(text.as_str())),
    }
}
