//! `OAuth2` credential types

use std::fmt;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Token payload returned by the authorization server's token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Bearer token for API calls.
    pub access_token: String,
    /// Token used to mint a new access token.
    pub refresh_token: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: u64,
    /// Token type (usually "Bearer").
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Space-delimited granted permissions.
    #[serde(default)]
    pub scope: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// The credential record as it is persisted.
///
/// A fresh record comes from [`StoredCredentials::issue`], which derives
/// `expires_at` from `expires_in`. A record read back from storage keeps the
/// stored `expires_at` through [`StoredCredentials::from_stored`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    access_token: String,
    refresh_token: String,
    expires_in: u64,
    expires_at: i64,
    scope: String,
}

impl StoredCredentials {
    /// Derives the persisted record from a token response issued at `issued_at_ms`.
    #[must_use]
    pub fn issue(response: &TokenResponse, issued_at_ms: i64) -> Self {
        let lifetime_ms = i64::try_from(response.expires_in.saturating_mul(1000)).unwrap_or(i64::MAX);
        Self {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone(),
            expires_in: response.expires_in,
            expires_at: issued_at_ms.saturating_add(lifetime_ms),
            scope: response.scope.clone(),
        }
    }

    /// Rebuilds a record from its five persisted values.
    #[must_use]
    pub const fn from_stored(
        access_token: String,
        refresh_token: String,
        expires_in: u64,
        expires_at: i64,
        scope: String,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_in,
            expires_at,
            scope,
        }
    }

    /// Bearer token for API calls.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Token used to mint a new access token.
    #[must_use]
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// Lifetime declared by the server, in seconds.
    #[must_use]
    pub const fn expires_in(&self) -> u64 {
        self.expires_in
    }

    /// Expiry instant in epoch milliseconds.
    #[must_use]
    pub const fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Space-delimited granted permissions.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Exactly-at-expiry counts as expired.
    #[must_use]
    pub const fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }

    /// Scopes granted to this token.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.split_whitespace()
    }
}

/// Client id and secret used as Basic-Auth transport credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    client_id: String,
    client_secret: String,
}

impl ClientCredentials {
    /// Creates client credentials, rejecting empty fields.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyClientCredential`] if either value is empty.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> DomainResult<Self> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();
        if client_id.is_empty() {
            return Err(DomainError::EmptyClientCredential("client_id"));
        }
        if client_secret.is_empty() {
            return Err(DomainError::EmptyClientCredential("client_secret"));
        }
        Ok(Self {
            client_id,
            client_secret,
        })
    }

    /// The client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the `Authorization` header value: `Basic base64(id:secret)`.
    #[must_use]
    pub fn basic_authorization(&self) -> String {
        let pair = format!("{}:{}", self.client_id, self.client_secret);
        let encoded = base64::engine::general_purpose::STANDARD.encode(pair.as_bytes());
        format!("Basic {encoded}")
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// One-time code delivered by the redirect callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationCode(String);

impl AuthorizationCode {
    /// Wraps a code received from the authorization server.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyAuthorizationCode`] for empty or blank input.
    pub fn new(code: impl Into<String>) -> DomainResult<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(DomainError::EmptyAuthorizationCode);
        }
        Ok(Self(code))
    }

    /// The raw code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorizationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two token request shapes sent to the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantRequest {
    /// Exchange an authorization code for a credential record.
    AuthorizationCode {
        /// The code to exchange.
        code: AuthorizationCode,
    },
    /// Mint a new access token from a refresh token.
    RefreshToken {
        /// The refresh token.
        refresh_token: String,
    },
}

impl GrantRequest {
    /// The `grant_type` form value.
    #[must_use]
    pub const fn grant_type(&self) -> &'static str {
        match self {
            Self::AuthorizationCode { .. } => "authorization_code",
            Self::RefreshToken { .. } => "refresh_token",
        }
    }

    /// Form fields in the order they are sent.
    #[must_use]
    pub fn form_params(&self) -> Vec<(&'static str, String)> {
        let grant_type = ("grant_type", self.grant_type().to_string());
        match self {
            Self::AuthorizationCode { code } => vec![grant_type, ("code", code.as_str().to_string())],
            Self::RefreshToken { refresh_token } => {
                vec![grant_type, ("refresh_token", refresh_token.clone())]
            }
        }
    }
}
