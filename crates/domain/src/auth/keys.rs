//! Persisted storage keys

use std::fmt;

/// Keys under which session values are persisted in the key-value store.
///
/// Every value is a string; numeric fields are stored in their decimal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Bearer access token.
    AccessToken,
    /// Refresh token.
    RefreshToken,
    /// Expiry instant in epoch milliseconds.
    TokenExpiresAt,
    /// Declared token lifetime in seconds.
    TokenExpiresIn,
    /// Granted scope string.
    TokenScope,
    /// Pending authorization code from the redirect callback.
    AuthorizationCode,
    /// `OAuth2` client id.
    ClientId,
    /// `OAuth2` client secret.
    ClientSecret,
}

impl StorageKey {
    /// The five keys forming one credential record.
    pub const CREDENTIAL_RECORD: [Self; 5] = [
        Self::AccessToken,
        Self::RefreshToken,
        Self::TokenExpiresAt,
        Self::TokenExpiresIn,
        Self::TokenScope,
    ];

    /// Every key this client writes.
    pub const ALL: [Self; 8] = [
        Self::AccessToken,
        Self::RefreshToken,
        Self::TokenExpiresAt,
        Self::TokenExpiresIn,
        Self::TokenScope,
        Self::AuthorizationCode,
        Self::ClientId,
        Self::ClientSecret,
    ];

    /// Physical key name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "bling_access_token",
            Self::RefreshToken => "bling_refresh_token",
            Self::TokenExpiresAt => "bling_token_expires_at",
            Self::TokenExpiresIn => "bling_token_expires_in",
            Self::TokenScope => "bling_token_scope",
            Self::AuthorizationCode => "bling_authorization_code",
            Self::ClientId => "bling_client_id",
            Self::ClientSecret => "bling_client_secret",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
