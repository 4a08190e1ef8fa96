//! Clipper Session Layer
//!
//! Keeps the crawler logged in across runs.
//!
//! # Lifecycle
//!
//! 1. **Reuse**: persisted cookies are applied and the home surface is probed
//!    for the logged-in marker
//! 2. **Login**: credentials are typed into the login form with keystroke pacing
//! 3. **Challenge**: if a verification challenge appears the session suspends
//!    until a human signals it has been solved
//! 4. **Verify**: a rejection marker ends the run; otherwise the fresh cookies
//!    replace the stored credential

pub mod challenge;
pub mod credential;
pub mod error;
pub mod manager;

pub use challenge::{ChallengeSignal, ConsoleSignal};
pub use credential::{CredentialStore, Credentials, FileCredentialStore, SessionCredential};
pub use error::{AuthError, Result};
pub use manager::{AuthState, SessionManager};
