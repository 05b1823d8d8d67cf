//! Bling HTTP client implementation using reqwest.
//!
//! This adapter implements both the `TokenTransport` and `ApiTransport`
//! ports. Token requests are form-encoded POSTs authenticated with Basic
//! auth; REST calls are JSON GETs authenticated with a bearer token.

use async_trait::async_trait;
use bling_application::ports::{ApiTransport, TokenTransport, TransportError};
use bling_domain::{GrantRequest, TokenResponse};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde_json::Value;

use crate::config::{BlingConfig, ConfigError};

/// Content-Type for form-urlencoded data.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Content-Type and Accept for REST calls.
const JSON_CONTENT_TYPE: &str = "application/json";

/// Accept header the token endpoint expects.
const TOKEN_ACCEPT: &str = "1.0";

/// Header carrying the REST API revision.
const API_REVISION_HEADER: &str = "x-api-revision";

/// HTTP client for the Bling token endpoint and REST API.
#[derive(Debug, Clone)]
pub struct ReqwestBlingClient {
    client: Client,
    config: BlingConfig,
}

impl ReqwestBlingClient {
    /// Creates a client from configuration.
    ///
    /// Redirects are not followed and every request is bounded by the
    /// configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(config: BlingConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .user_agent(concat!("bling-connect/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self { client, config })
    }

    /// Creates a client with a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, config: BlingConfig) -> Self {
        Self { client, config }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &BlingConfig {
        &self.config
    }

    fn unreachable(url: &str, error: &reqwest::Error) -> TransportError {
        TransportError::Unreachable {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    /// Turns a non-2xx response into `TransportError::Status`.
    async fn status_error(response: Response) -> TransportError {
        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(status = status.as_u16(), error = %e, "failed to read error response body");
                String::new()
            }
        };
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        TransportError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        }
    }
}

#[async_trait]
impl TokenTransport for ReqwestBlingClient {
    async fn request_token(
        &self,
        grant: &GrantRequest,
        authorization: &str,
    ) -> Result<TokenResponse, TransportError> {
        let url = self.token_url();
        let body = serde_urlencoded::to_string(grant.form_params()).map_err(|e| {
            TransportError::Unreachable {
                url: url.clone(),
                message: format!("Failed to encode form: {e}"),
            }
        })?;

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(ACCEPT, TOKEN_ACCEPT)
            .header(AUTHORIZATION, authorization)
            .body(body)
            .send()
            .await
            .map_err(|e| Self::unreachable(&url, &e))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| TransportError::Decode {
                message: format!("Failed to parse token response: {e}"),
            })
    }

    fn token_url(&self) -> String {
        self.config.token_url()
    }
}

#[async_trait]
impl ApiTransport for ReqwestBlingClient {
    async fn get_json(&self, path: &str, bearer_token: &str) -> Result<Value, TransportError> {
        let url = self.config.endpoint(path);

        let response = self
            .client
            .get(&url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .header(API_REVISION_HEADER, &self.config.api_revision)
            .header(AUTHORIZATION, format!("Bearer {bearer_token}"))
            .send()
            .await
            .map_err(|e| Self::unreachable(&url, &e))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        response.json::<Value>().await.map_err(|e| TransportError::Decode {
            message: e.to_string(),
        })
    }
}
