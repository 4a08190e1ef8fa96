//! Cookie model shared between the browser and the persisted session credential.

use crate::error::{BrowserError, Result};
use chromiumoxide::cdp::browser_protocol::network::{Cookie, CookieParam, TimeSinceEpoch};
use serde::{Deserialize, Serialize};

/// Cookie extracted from or injected into a browsing context.
///
/// Serialized with the same field names browsers export (`httpOnly`, `expires`
/// in seconds since the epoch), so existing cookie dumps can be loaded directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// Absent for session cookies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
}

fn default_path() -> String {
    "/".to_string()
}

impl BrowserCookie {
    /// Whether the cookie has an expiry at or before `now` (seconds since the epoch).
    #[must_use]
    pub fn is_expired_at(&self, now: f64) -> bool {
        self.expiry().is_some_and(|exp| exp <= now)
    }

    /// Expiry, treating the non-positive values exports use for session cookies as none.
    #[must_use]
    pub fn expiry(&self) -> Option<f64> {
        self.expires.filter(|exp| *exp > 0.0)
    }

    pub(crate) fn to_param(&self) -> Result<CookieParam> {
        if self.name.is_empty() || self.domain.is_empty() {
            return Err(BrowserError::CookieError(format!(
                "cookie '{}' needs a name and a domain",
                self.name
            )));
        }

        let mut builder = CookieParam::builder()
            .name(self.name.clone())
            .value(self.value.clone())
            .domain(self.domain.clone())
            .path(self.path.clone())
            .secure(self.secure)
            .http_only(self.http_only);

        if let Some(expires) = self.expiry() {
            builder = builder.expires(TimeSinceEpoch::new(expires));
        }

        builder.build().map_err(BrowserError::CookieError)
    }
}

impl From<&Cookie> for BrowserCookie {
    fn from(c: &Cookie) -> Self {
        Self {
            name: c.name.clone(),
            value: c.value.clone(),
            domain: c.domain.clone(),
            path: c.path.clone(),
            // CDP reports -1 for session cookies
            expires: (!c.session && c.expires > 0.0).then_some(c.expires),
            secure: c.secure,
            http_only: c.http_only,
        }
    }
}
