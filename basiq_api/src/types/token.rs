use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

/// Body of a `POST /token` response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Bearer credential attached to every authenticated request.
///
/// Built by copying the needed fields out of a [`TokenResponse`], never by
/// decoding onto client state.
#[derive(Clone)]
pub struct AccessToken {
    value: String,
    token_type: String,
    issued_at: DateTime<Utc>,
    lifetime: Option<TimeDelta>,
}

impl AccessToken {
    /// A bearer token with no known expiry.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            token_type: "Bearer".to_string(),
            issued_at: Utc::now(),
            lifetime: None,
        }
    }

    pub fn from_response(resp: TokenResponse, issued_at: DateTime<Utc>) -> Self {
        Self {
            value: resp.access_token,
            token_type: resp.token_type.unwrap_or_else(|| "Bearer".to_string()),
            issued_at,
            lifetime: resp.expires_in.and_then(TimeDelta::try_seconds),
        }
    }

    pub fn secret(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.lifetime.map(|lifetime| self.issued_at + lifetime)
    }

    /// The token is never refreshed; this only feeds diagnostics.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| now >= at)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at())
            .finish()
    }
}
