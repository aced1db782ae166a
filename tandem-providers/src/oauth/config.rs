//! OAuth client configuration.

/// Immutable OAuth settings for one backend identity.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret, for confidential clients.
    pub client_secret: Option<String>,
    /// Authorization endpoint.
    pub auth_url: String,
    /// Token endpoint.
    pub token_url: String,
    /// User-info endpoint.
    pub userinfo_url: String,
    /// Requested scopes.
    pub scopes: Vec<String>,
    /// Extra authorization query parameters, such as `access_type=offline`.
    pub extra_auth_params: Vec<(String, String)>,
    /// Where the browser is sent after a successful callback.
    pub success_url: Option<String>,
    /// Where the browser is sent after a failed callback.
    pub failure_url: Option<String>,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("userinfo_url", &self.userinfo_url)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

impl OAuthConfig {
    /// Creates a configuration with the three endpoints.
    pub fn new(
        client_id: impl Into<String>,
        auth_url: impl Into<String>,
        token_url: impl Into<String>,
        userinfo_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            auth_url: auth_url.into(),
            token_url: token_url.into(),
            userinfo_url: userinfo_url.into(),
            scopes: Vec::new(),
            extra_auth_params: Vec::new(),
            success_url: None,
            failure_url: None,
        }
    }

    /// Sets the client secret.
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Sets the requested scopes.
    #[must_use]
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Adds an extra authorization query parameter.
    #[must_use]
    pub fn with_auth_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_auth_params.push((key.into(), value.into()));
        self
    }

    /// Sets the browser redirect targets used after the callback.
    #[must_use]
    pub fn with_redirects(mut self, success: Option<String>, failure: Option<String>) -> Self {
        self.success_url = success;
        self.failure_url = failure;
        self
    }

    /// Returns the space-separated scope string.
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let config = OAuthConfig::new("id", "https://a", "https://t", "https://u")
            .with_client_secret("hunter2");
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_scope_string() {
        let config = OAuthConfig::new("id", "a", "t", "u").with_scopes(["openid", "email"]);
        assert_eq!(config.scope_string(), "openid email");
    }
}
