//! Session error types

use std::fmt;

use bling_domain::DomainError;
use thiserror::Error;

use crate::ports::StoreError;

/// Why a caller was found to be unauthenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthenticatedReason {
    /// An authorization code is stored but was never exchanged.
    PendingCodeExchange,
    /// No access token is stored.
    MissingToken,
    /// The stored access token is past its expiry.
    Expired,
    /// No refresh token is stored.
    MissingRefreshToken,
    /// No authorization code is stored.
    MissingAuthorizationCode,
}

impl fmt::Display for UnauthenticatedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::PendingCodeExchange => {
                "authorization code found but no access token; exchange the code first"
            }
            Self::MissingToken => "no access token; log in and exchange the code for a token",
            Self::Expired => "access token expired; refresh the token",
            Self::MissingRefreshToken => "no refresh token stored",
            Self::MissingAuthorizationCode => "no authorization code stored",
        };
        f.write_str(text)
    }
}

/// Errors surfaced by the session layer.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No client id/secret was supplied or resolvable from the store.
    #[error("client credentials not found; provide the client id and client secret")]
    MissingCredentials,

    /// The token endpoint answered with a non-2xx status.
    #[error("token request rejected ({status}): {message}")]
    TokenExchangeRejected {
        /// HTTP status code.
        status: u16,
        /// Server message from `error_description` or `error`.
        message: String,
    },

    /// No response was received from the token endpoint.
    #[error("connection error while requesting a token; check that the server is reachable at {target_url}")]
    TransportUnavailable {
        /// The URL that could not be reached.
        target_url: String,
    },

    /// The token endpoint answered 2xx with an unusable body.
    #[error("invalid token response: {message}")]
    InvalidTokenResponse {
        /// Error description.
        message: String,
    },

    /// A REST call answered with a non-2xx status.
    #[error("API request failed: {message}")]
    ApiRequestFailed {
        /// HTTP status code.
        status: u16,
        /// Formatted failure message.
        message: String,
    },

    /// A REST call was refused for lack of scope.
    #[error(
        "insufficient permissions; the current token has the scopes \"{granted_scope}\". Request the required scopes at login (e.g. \"contatos produtos pedidos\")"
    )]
    InsufficientScope {
        /// Scope string currently granted.
        granted_scope: String,
    },

    /// No valid token at call time.
    #[error("not authenticated: {reason}")]
    Unauthenticated {
        /// What is missing.
        reason: UnauthenticatedReason,
    },

    /// The key-value store failed.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
}

impl SessionError {
    /// Shorthand for [`SessionError::Unauthenticated`].
    #[must_use]
    pub const fn unauthenticated(reason: UnauthenticatedReason) -> Self {
        Self::Unauthenticated { reason }
    }
}

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
