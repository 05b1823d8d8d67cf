//! HTTP transport ports
//!
//! The token endpoint and the REST API are reached through these traits so
//! the session layer stays independent of a concrete HTTP library.

use async_trait::async_trait;
use bling_domain::{GrantRequest, TokenResponse};

/// Errors returned by the HTTP transports.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status} {reason}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase (may be empty).
        reason: String,
        /// Response body; JSON when parseable, otherwise a JSON string.
        body: serde_json::Value,
    },

    /// No response was received.
    #[error("could not reach {url}: {message}")]
    Unreachable {
        /// Target URL.
        url: String,
        /// Underlying error description.
        message: String,
    },

    /// A 2xx response body could not be decoded.
    #[error("failed to decode response: {message}")]
    Decode {
        /// Error description.
        message: String,
    },
}

/// Port for the `OAuth2` token endpoint.
#[async_trait]
pub trait TokenTransport: Send + Sync {
    /// Posts a form-encoded grant request.
    ///
    /// # Arguments
    /// * `grant` - The grant to send
    /// * `authorization` - Full `Authorization` header value (`Basic ...`)
    ///
    /// # Errors
    /// Returns [`TransportError::Status`] for non-2xx answers and
    /// [`TransportError::Unreachable`] when no response arrives.
    async fn request_token(
        &self,
        grant: &GrantRequest,
        authorization: &str,
    ) -> Result<TokenResponse, TransportError>;

    /// Absolute URL of the token endpoint.
    fn token_url(&self) -> String;
}

/// Port for bearer-authenticated JSON REST calls.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Performs a GET on `path` (relative to the configured base URL).
    ///
    /// # Errors
    /// Same taxonomy as [`TokenTransport::request_token`].
    async fn get_json(
        &self,
        path: &str,
        bearer_token: &str,
    ) -> Result<serde_json::Value, TransportError>;
}
