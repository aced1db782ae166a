//! OAuth credential records.
//!
//! # File Format
//!
//! ```json
//! {
//!   "access_token": "ya29...",
//!   "refresh_token": "1//...",
//!   "token_type": "Bearer",
//!   "expires_in": 3599,
//!   "expires_at": 1735000000000
//! }
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Seconds before expiry at which a token is already treated as expired.
pub const EXPIRY_SKEW_SECS: i64 = 60;

/// Cached bearer credentials for one backend identity.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Bearer token.
    pub access_token: String,
    /// Token used to obtain a new access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Token type, usually `Bearer`.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds as reported by the token endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// Absolute expiry in epoch milliseconds. Absent means never expiring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Credentials {
    /// Creates never-expiring credentials with only an access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            token_type: default_token_type(),
            expires_in: None,
            expires_at: None,
        }
    }

    /// Builds credentials from a token endpoint response issued at `now`.
    ///
    /// `expires_at` is derived as `now + expires_in` seconds.
    pub fn issued_at(
        now: DateTime<Utc>,
        access_token: String,
        refresh_token: Option<String>,
        token_type: Option<String>,
        expires_in: Option<i64>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: token_type.unwrap_or_else(default_token_type),
            expires_in,
            expires_at: expires_in
                .map(|secs| now.timestamp_millis().saturating_add(secs.saturating_mul(1000))),
        }
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    /// Sets the absolute expiry.
    #[must_use]
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at.timestamp_millis());
        self
    }

    /// Returns the expiry as a timestamp.
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    /// Checks whether the token is expired, or within the skew of expiring.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Checks expiry against an explicit instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                expires_at <= now.timestamp_millis() + EXPIRY_SKEW_SECS * 1000
            }
            None => false,
        }
    }

    /// Returns true if a refresh token is present.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Formats the `Authorization` header value.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_no_expiry_never_expires() {
        let creds = Credentials::new("token");
        assert!(!creds.is_expired());
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let creds = Credentials::new("token").with_expiry(Utc::now() - Duration::hours(1));
        assert!(creds.is_expired());
    }

    #[test]
    fn test_within_skew_is_expired() {
        let creds = Credentials::new("token").with_expiry(Utc::now() + Duration::seconds(30));
        assert!(creds.is_expired());
    }

    #[test]
    fn test_future_expiry_is_valid() {
        let creds = Credentials::new("token").with_expiry(Utc::now() + Duration::hours(1));
        assert!(!creds.is_expired());
    }

    #[test]
    fn test_issued_at_computes_expiry() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let creds = Credentials::issued_at(
            now,
            "access".to_string(),
            Some("refresh".to_string()),
            None,
            Some(3600),
        );
        assert_eq!(creds.expires_at, Some(1_700_003_600_000));
        assert_eq!(creds.token_type, "Bearer");
        assert!(creds.can_refresh());
    }

    #[test]
    fn test_issued_at_saturates_huge_lifetime() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let creds = Credentials::issued_at(now, "access".to_string(), None, None, Some(i64::MAX));

        assert_eq!(creds.expires_at, Some(i64::MAX));
        assert!(!creds.is_expired_at(now));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let creds = Credentials::new("secret-access").with_refresh_token("secret-refresh");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
    }

    #[test]
    fn test_empty_refresh_token_cannot_refresh() {
        let creds = Credentials::new("token").with_refresh_token("");
        assert!(!creds.can_refresh());
    }
}
