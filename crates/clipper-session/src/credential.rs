//! Persisted session credential and account credentials.

use crate::error::{AuthError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clipper_browser::BrowserCookie;
use clipper_core::AccountConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Cookies of one authenticated account.
///
/// Validity is never read from the bundle itself; it is decided by probing
/// the site with the cookies applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCredential {
    pub cookies: Vec<BrowserCookie>,
    pub saved_at: DateTime<Utc>,
}

impl SessionCredential {
    /// Bundle cookies captured right now
    #[must_use]
    pub fn new(cookies: Vec<BrowserCookie>) -> Self {
        Self {
            cookies,
            saved_at: Utc::now(),
        }
    }
}

/// On-disk layouts accepted when loading. A bare cookie array is what browser
/// cookie exports produce.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCredential {
    Bundle(SessionCredential),
    Cookies(Vec<BrowserCookie>),
}

/// Durable home of the session credential.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the stored credential, `None` if there is none yet
    async fn load(&self) -> Result<Option<SessionCredential>>;

    /// Replace the stored credential
    async fn save(&self, credential: &SessionCredential) -> Result<()>;
}

/// JSON file credential store.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<SessionCredential>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AuthError::Store(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };

        let stored: StoredCredential = serde_json::from_str(&contents).map_err(|e| {
            AuthError::Store(format!("failed to parse {}: {e}", self.path.display()))
        })?;

        Ok(Some(match stored {
            StoredCredential::Bundle(credential) => credential,
            StoredCredential::Cookies(cookies) => SessionCredential::new(cookies),
        }))
    }

    async fn save(&self, credential: &SessionCredential) -> Result<()> {
        let json = serde_json::to_string_pretty(credential)
            .map_err(|e| AuthError::Store(format!("failed to serialize credential: {e}")))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AuthError::Store(e.to_string()))?;
        }

        // Write then rename so a crash never leaves a truncated file behind
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        tracing::info!(
            "Saved {} cookies to {}",
            credential.cookies.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Login credentials, configured out-of-band.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    password: Zeroizing<String>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl From<&AccountConfig> for Credentials {
    fn from(account: &AccountConfig) -> Self {
        Self::new(account.email.clone(), account.password.clone())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cookie(name: &str) -> BrowserCookie {
        BrowserCookie {
            name: name.to_string(),
            value: "v".to_string(),
            domain: ".facebook.com".to_string(),
            path: "/".to_string(),
            expires: None,
            secure: true,
            http_only: true,
        }
    }

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let tmp = TempDir::new().expect("create temp dir");
        let store = FileCredentialStore::new(tmp.path().join("session.json"));
        assert!(store.load().await.expect("load").is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_credential() {
        let tmp = TempDir::new().expect("create temp dir");
        let store = FileCredentialStore::new(tmp.path().join("nested/session.json"));

        store
            .save(&SessionCredential::new(vec![cookie("old")]))
            .await
            .expect("save first credential");
        store
            .save(&SessionCredential::new(vec![cookie("c_user"), cookie("xs")]))
            .await
            .expect("save second credential");

        let loaded = store.load().await.expect("load").expect("credential present");
        let names: Vec<_> = loaded.cookies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["c_user", "xs"]);
        assert!(!tmp.path().join("nested/session.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_load_bare_cookie_array() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("session.json");
        tokio::fs::write(
            &path,
            r#"[{"name":"c_user","value":"1","domain":".facebook.com","path":"/","expires":-1,"httpOnly":false,"secure":true}]"#,
        )
        .await
        .expect("write cookie export");

        let loaded = FileCredentialStore::new(path)
            .load()
            .await
            .expect("load")
            .expect("credential present");
        assert_eq!(loaded.cookies.len(), 1);
        assert_eq!(loaded.cookies[0].name, "c_user");
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_store_error() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("session.json");
        tokio::fs::write(&path, "{not json").await.expect("write");

        let result = FileCredentialStore::new(path).load().await;
        assert!(matches!(result, Err(AuthError::Store(_))));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("me@example.com", "hunter2");
        assert_eq!(creds.password(), "hunter2");
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
