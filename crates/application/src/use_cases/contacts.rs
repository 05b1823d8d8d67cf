//! Contacts REST use cases.
//!
//! Reads the contacts listing with the current bearer token and reports
//! failures the way the connection-check screen presents them.

use std::sync::Arc;

use bling_domain::StorageKey;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::auth::TokenManager;
use crate::error::{SessionError, SessionResult, UnauthenticatedReason};
use crate::ports::{ApiTransport, TransportError};

/// Path of the contacts listing endpoint.
pub const CONTACTS_PATH: &str = "/Api/v3/contatos";

/// Placeholder shown when no scope is stored.
const NO_SCOPE: &str = "none";

/// Result of a connection check.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionReport {
    /// Whether the API answered successfully.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Response or error body, when one was received.
    pub data: Option<Value>,
}

/// Bearer-authenticated access to the contacts endpoint.
#[derive(Clone)]
pub struct ContactsService {
    tokens: TokenManager,
    api: Arc<dyn ApiTransport>,
}

impl ContactsService {
    /// Creates the service.
    #[must_use]
    pub fn new(tokens: TokenManager, api: Arc<dyn ApiTransport>) -> Self {
        Self { tokens, api }
    }

    /// Fetches the contacts listing.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Unauthenticated`] when no valid token is stored
    /// - [`SessionError::InsufficientScope`] when the token lacks the scope
    /// - [`SessionError::ApiRequestFailed`] for other non-2xx answers
    /// - [`SessionError::TransportUnavailable`] when no response arrives
    pub async fn list_contacts(&self) -> SessionResult<Value> {
        let Some(token) = self.tokens.valid_access_token().await? else {
            let has_token = self
                .tokens
                .store()
                .get_key(StorageKey::AccessToken)
                .await?
                .is_some_and(|v| !v.is_empty());
            let reason = if has_token {
                UnauthenticatedReason::Expired
            } else {
                UnauthenticatedReason::MissingToken
            };
            return Err(SessionError::unauthenticated(reason));
        };
        self.fetch(&token).await.map_err(|(err, _)| err)
    }

    /// Checks the stored session and the API in one go.
    ///
    /// Missing or unusable credentials are errors; a failing API call is a
    /// report with `success: false`.
    ///
    /// # Errors
    ///
    /// [`SessionError::Unauthenticated`] from the precondition checks, or a
    /// store failure.
    pub async fn test_connection(&self) -> SessionResult<ConnectionReport> {
        let store = self.tokens.store();
        let has_code = store
            .get_key(StorageKey::AuthorizationCode)
            .await?
            .is_some_and(|v| !v.is_empty());
        let has_token = store
            .get_key(StorageKey::AccessToken)
            .await?
            .is_some_and(|v| !v.is_empty());

        if has_code && !has_token {
            return Err(SessionError::unauthenticated(
                UnauthenticatedReason::PendingCodeExchange,
            ));
        }

        let Some(token) = self.tokens.valid_access_token().await? else {
            let reason = if has_token {
                UnauthenticatedReason::Expired
            } else {
                UnauthenticatedReason::MissingToken
            };
            return Err(SessionError::unauthenticated(reason));
        };

        match self.fetch(&token).await {
            Ok(data) => Ok(ConnectionReport {
                success: true,
                message: "API connection succeeded".to_string(),
                data: Some(data),
            }),
            Err((err, data)) => Ok(ConnectionReport {
                success: false,
                message: failure_message(&err),
                data,
            }),
        }
    }

    async fn fetch(&self, token: &str) -> Result<Value, (SessionError, Option<Value>)> {
        debug!(path = CONTACTS_PATH, "requesting contacts");
        match self.api.get_json(CONTACTS_PATH, token).await {
            Ok(data) => Ok(data),
            Err(TransportError::Status {
                status,
                reason,
                body,
            }) => {
                if status == 401 {
                    warn!("access token rejected as invalid or expired");
                }
                if is_insufficient_scope(&body) {
                    let granted_scope = match self.tokens.granted_scope().await {
                        Ok(scope) => scope.unwrap_or_else(|| NO_SCOPE.to_string()),
                        Err(err) => return Err((err, Some(body))),
                    };
                    warn!(%granted_scope, "token lacks the scope for contacts");
                    return Err((SessionError::InsufficientScope { granted_scope }, Some(body)));
                }
                let message = api_error_message(status, &reason, &body);
                warn!(status, %message, "contacts request failed");
                Err((SessionError::ApiRequestFailed { status, message }, Some(body)))
            }
            Err(TransportError::Unreachable { url, message }) => {
                error!(%url, %message, "API unreachable");
                Err((SessionError::TransportUnavailable { target_url: url }, None))
            }
            Err(TransportError::Decode { message }) => {
                let message = format!("failed to decode response: {message}");
                Err((SessionError::ApiRequestFailed { status: 200, message }, None))
            }
        }
    }
}

fn failure_message(err: &SessionError) -> String {
    match err {
        SessionError::ApiRequestFailed { message, .. } => format!("Connection error: {message}"),
        SessionError::TransportUnavailable { .. } => {
            "Connection error while accessing the API".to_string()
        }
        other => other.to_string(),
    }
}

fn is_insufficient_scope(body: &Value) -> bool {
    let is_marker = |v: Option<&Value>| v.and_then(Value::as_str) == Some("insufficient_scope");
    is_marker(body.get("error").and_then(|e| e.get("type"))) || is_marker(body.get("type"))
}

/// `"<status> <reason>[ - <error.message|error>][ - <description>]"`
fn api_error_message(status: u16, reason: &str, body: &Value) -> String {
    let mut message = format!("{status} {reason}");

    let error_text = body.get("error").and_then(|error| {
        error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| match error {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
    });
    if let Some(text) = error_text {
        message.push_str(" - ");
        message.push_str(&text);
    }

    if let Some(description) = body.get("description").and_then(Value::as_str) {
        message.push_str(" - ");
        message.push_str(description);
    }

    message
}
