//! Token lifecycle management.
//!
//! [`TokenManager`] obtains, persists, validates and refreshes the `OAuth2`
//! credential pair. State lives entirely in the injected [`KeyValueStore`];
//! the manager itself holds no cache, so several handles over the same store
//! always agree.

use std::sync::Arc;

use bling_domain::{
    AuthorizationCode, ClientCredentials, GrantRequest, SessionState, StorageKey,
    StoredCredentials, TokenResponse,
};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::{SessionError, SessionResult, UnauthenticatedReason};
use crate::ports::{Clock, KeyValueStore, TokenTransport, TransportError};

/// Obtains and tracks the access/refresh token pair.
#[derive(Clone)]
pub struct TokenManager {
    store: Arc<dyn KeyValueStore>,
    transport: Arc<dyn TokenTransport>,
    clock: Arc<dyn Clock>,
}

impl TokenManager {
    /// Creates a manager over the given store, token endpoint and clock.
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn TokenTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            transport,
            clock,
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Exchanges an authorization code for a credential record.
    ///
    /// Nothing is persisted; call [`TokenManager::persist`] with the result.
    ///
    /// # Errors
    ///
    /// [`SessionError::MissingCredentials`] before any network call when no
    /// client credentials can be resolved, otherwise the token request errors.
    pub async fn exchange_authorization_code(
        &self,
        code: &AuthorizationCode,
        credentials: Option<&ClientCredentials>,
    ) -> SessionResult<TokenResponse> {
        let credentials = self.resolve_client_credentials(credentials).await?;
        let grant = GrantRequest::AuthorizationCode { code: code.clone() };
        self.request_token(&grant, &credentials).await
    }

    /// Mints a new access token from a refresh token.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`TokenManager::exchange_authorization_code`].
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
        credentials: Option<&ClientCredentials>,
    ) -> SessionResult<TokenResponse> {
        if refresh_token.is_empty() {
            return Err(SessionError::unauthenticated(
                UnauthenticatedReason::MissingRefreshToken,
            ));
        }
        let credentials = self.resolve_client_credentials(credentials).await?;
        let grant = GrantRequest::RefreshToken {
            refresh_token: refresh_token.to_string(),
        };
        self.request_token(&grant, &credentials).await
    }

    /// Writes the credential record and consumes any pending authorization code.
    ///
    /// `expires_at` is computed here from the clock and `expires_in`.
    ///
    /// # Errors
    ///
    /// Only store failures.
    pub async fn persist(&self, response: &TokenResponse) -> SessionResult<()> {
        let record = StoredCredentials::issue(response, self.clock.now_millis());

        self.store
            .set_key(StorageKey::AccessToken, record.access_token())
            .await?;
        self.store
            .set_key(StorageKey::RefreshToken, record.refresh_token())
            .await?;
        self.store
            .set_key(StorageKey::TokenExpiresIn, &record.expires_in().to_string())
            .await?;
        self.store
            .set_key(StorageKey::TokenScope, record.scope())
            .await?;
        self.store
            .set_key(StorageKey::TokenExpiresAt, &record.expires_at().to_string())
            .await?;
        self.store.remove_key(StorageKey::AuthorizationCode).await?;

        debug!(expires_at = record.expires_at(), scope = %record.scope(), "credentials persisted");
        Ok(())
    }

    /// True when no expiry is stored or `now >= expires_at`.
    ///
    /// # Errors
    ///
    /// Only store failures.
    pub async fn is_expired(&self) -> SessionResult<bool> {
        let now = self.clock.now_millis();
        Ok(self.expires_at().await?.is_none_or(|at| now >= at))
    }

    /// Returns the stored access token if it has not expired.
    ///
    /// Never refreshes; that is up to the caller.
    ///
    /// # Errors
    ///
    /// Only store failures.
    pub async fn valid_access_token(&self) -> SessionResult<Option<String>> {
        if self.is_expired().await? {
            return Ok(None);
        }
        self.get_non_empty(StorageKey::AccessToken).await
    }

    /// Whether navigation into protected views should be allowed.
    ///
    /// A stored but expired token purges the whole credential record and
    /// yields `false`. A bare authorization code counts as authenticated so
    /// the views that perform the exchange stay reachable.
    ///
    /// # Errors
    ///
    /// Only store failures.
    pub async fn is_authenticated(&self) -> SessionResult<bool> {
        let access_token = self.get_non_empty(StorageKey::AccessToken).await?;
        let expires_at = self.expires_at().await?;

        if let (Some(_), Some(expires_at)) = (access_token, expires_at) {
            if self.clock.now_millis() >= expires_at {
                info!(expires_at, "access token expired, clearing stored credentials");
                self.clear_credentials().await?;
                return Ok(false);
            }
            return Ok(true);
        }

        Ok(self.stored_authorization_code().await?.is_some())
    }

    /// Classifies the stored session without side effects.
    ///
    /// # Errors
    ///
    /// Only store failures.
    pub async fn session_state(&self) -> SessionResult<SessionState> {
        let access_token = self.get_non_empty(StorageKey::AccessToken).await?;
        if let (Some(_), Some(expires_at)) = (access_token, self.expires_at().await?) {
            return Ok(if self.clock.now_millis() >= expires_at {
                SessionState::TokenExpired
            } else {
                SessionState::TokenValid
            });
        }
        if self.stored_authorization_code().await?.is_some() {
            return Ok(SessionState::CodePresent);
        }
        Ok(SessionState::Unauthenticated)
    }

    /// Stores the code delivered by the redirect callback.
    ///
    /// # Errors
    ///
    /// Only store failures.
    pub async fn store_authorization_code(&self, code: &AuthorizationCode) -> SessionResult<()> {
        self.store
            .set_key(StorageKey::AuthorizationCode, code.as_str())
            .await?;
        Ok(())
    }

    /// The pending authorization code, if any.
    ///
    /// # Errors
    ///
    /// Only store failures.
    pub async fn stored_authorization_code(&self) -> SessionResult<Option<AuthorizationCode>> {
        Ok(self
            .get_non_empty(StorageKey::AuthorizationCode)
            .await?
            .and_then(|code| AuthorizationCode::new(code).ok()))
    }

    /// Remembers client credentials so later token requests may omit them.
    ///
    /// # Errors
    ///
    /// Only store failures.
    pub async fn save_client_credentials(&self, credentials: &ClientCredentials) -> SessionResult<()> {
        self.store
            .set_key(StorageKey::ClientId, credentials.client_id())
            .await?;
        self.store
            .set_key(StorageKey::ClientSecret, credentials.client_secret())
            .await?;
        Ok(())
    }

    /// Explicit credentials win; otherwise both stored values must be present.
    ///
    /// # Errors
    ///
    /// [`SessionError::MissingCredentials`] when neither source yields a pair.
    pub async fn resolve_client_credentials(
        &self,
        explicit: Option<&ClientCredentials>,
    ) -> SessionResult<ClientCredentials> {
        if let Some(credentials) = explicit {
            return Ok(credentials.clone());
        }

        let client_id = self.get_non_empty(StorageKey::ClientId).await?;
        let client_secret = self.get_non_empty(StorageKey::ClientSecret).await?;
        match (client_id, client_secret) {
            (Some(id), Some(secret)) => {
                ClientCredentials::new(id, secret).map_err(|_| SessionError::MissingCredentials)
            }
            _ => Err(SessionError::MissingCredentials),
        }
    }

    /// Exchanges the stored authorization code and persists the result.
    ///
    /// # Errors
    ///
    /// [`SessionError::Unauthenticated`] when no code is stored, otherwise as
    /// [`TokenManager::exchange_authorization_code`].
    pub async fn exchange_stored_code(
        &self,
        credentials: Option<&ClientCredentials>,
    ) -> SessionResult<TokenResponse> {
        let code = self.stored_authorization_code().await?.ok_or_else(|| {
            SessionError::unauthenticated(UnauthenticatedReason::MissingAuthorizationCode)
        })?;
        let response = self.exchange_authorization_code(&code, credentials).await?;
        self.persist(&response).await?;
        Ok(response)
    }

    /// Refreshes with the stored refresh token and persists the result.
    ///
    /// # Errors
    ///
    /// [`SessionError::Unauthenticated`] when no refresh token is stored,
    /// otherwise as [`TokenManager::refresh_access_token`].
    pub async fn refresh_stored_token(
        &self,
        credentials: Option<&ClientCredentials>,
    ) -> SessionResult<TokenResponse> {
        let refresh_token = self
            .get_non_empty(StorageKey::RefreshToken)
            .await?
            .ok_or_else(|| {
                SessionError::unauthenticated(UnauthenticatedReason::MissingRefreshToken)
            })?;
        let response = self.refresh_access_token(&refresh_token, credentials).await?;
        self.persist(&response).await?;
        Ok(response)
    }

    /// The full credential record, or `None` if any field is missing or malformed.
    ///
    /// # Errors
    ///
    /// Only store failures.
    pub async fn stored_credentials(&self) -> SessionResult<Option<StoredCredentials>> {
        let Some(access_token) = self.get_non_empty(StorageKey::AccessToken).await? else {
            return Ok(None);
        };
        let Some(refresh_token) = self.get_non_empty(StorageKey::RefreshToken).await? else {
            return Ok(None);
        };
        let Some(expires_at) = self.expires_at().await? else {
            return Ok(None);
        };
        let Some(expires_in) = self
            .get_non_empty(StorageKey::TokenExpiresIn)
            .await?
            .and_then(|v| v.parse::<u64>().ok())
        else {
            return Ok(None);
        };
        let Some(scope) = self.store.get_key(StorageKey::TokenScope).await? else {
            return Ok(None);
        };

        Ok(Some(StoredCredentials::from_stored(
            access_token,
            refresh_token,
            expires_in,
            expires_at,
            scope,
        )))
    }

    /// The stored scope string, if any.
    ///
    /// # Errors
    ///
    /// Only store failures.
    pub async fn granted_scope(&self) -> SessionResult<Option<String>> {
        self.get_non_empty(StorageKey::TokenScope).await
    }

    /// Removes the five credential keys (logout).
    ///
    /// The pending code and client credentials are left in place.
    ///
    /// # Errors
    ///
    /// Only store failures.
    pub async fn clear_credentials(&self) -> SessionResult<()> {
        for key in StorageKey::CREDENTIAL_RECORD {
            self.store.remove_key(key).await?;
        }
        Ok(())
    }

    async fn request_token(
        &self,
        grant: &GrantRequest,
        credentials: &ClientCredentials,
    ) -> SessionResult<TokenResponse> {
        let grant_type = grant.grant_type();
        debug!(grant_type, url = %self.transport.token_url(), "requesting token");

        match self
            .transport
            .request_token(grant, &credentials.basic_authorization())
            .await
        {
            Ok(response) => {
                debug!(grant_type, expires_in = response.expires_in, "token issued");
                Ok(response)
            }
            Err(TransportError::Status { status, body, .. }) => {
                let message = server_message(grant, status, &body);
                warn!(grant_type, status, %message, "token request rejected");
                Err(SessionError::TokenExchangeRejected { status, message })
            }
            Err(TransportError::Unreachable { url, message }) => {
                error!(grant_type, %url, %message, "token endpoint unreachable");
                Err(SessionError::TransportUnavailable { target_url: url })
            }
            Err(TransportError::Decode { message }) => {
                warn!(grant_type, %message, "undecodable token response");
                Err(SessionError::InvalidTokenResponse { message })
            }
        }
    }

    async fn expires_at(&self) -> SessionResult<Option<i64>> {
        let Some(raw) = self.get_non_empty(StorageKey::TokenExpiresAt).await? else {
            return Ok(None);
        };
        match raw.parse::<i64>() {
            Ok(at) => Ok(Some(at)),
            Err(_) => {
                warn!(value = %raw, "ignoring malformed token expiry");
                Ok(None)
            }
        }
    }

    async fn get_non_empty(&self, key: StorageKey) -> SessionResult<Option<String>> {
        Ok(self.store.get_key(key).await?.filter(|v| !v.is_empty()))
    }
}

/// Picks `error_description`, then `error`, then a generic fallback.
fn server_message(grant: &GrantRequest, status: u16, body: &Value) -> String {
    ["error_description", "error"]
        .iter()
        .find_map(|field| body.get(field).and_then(Value::as_str).filter(|s| !s.is_empty()))
        .map_or_else(
            || match grant {
                GrantRequest::AuthorizationCode { .. } => {
                    format!("error {status} while obtaining token")
                }
                GrantRequest::RefreshToken { .. } => {
                    format!("error {status} while refreshing token")
                }
            },
            str::to_string,
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::auth::test_support::{FixedClock, MemoryStore, ScriptedTokenTransport};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Harness {
        manager: TokenManager,
        store: Arc<MemoryStore>,
        transport: Arc<ScriptedTokenTransport>,
        clock: Arc<FixedClock>,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::default());
        let transport = Arc::new(ScriptedTokenTransport::default());
        let clock = Arc::new(FixedClock::at_millis(0));
        let manager = TokenManager::new(store.clone(), transport.clone(), clock.clone());
        Harness {
            manager,
            store,
            transport,
            clock,
        }
    }

    fn token(access: &str, expires_in: u64) -> TokenResponse {
        TokenResponse {
            access_token: access.to_string(),
            refresh_token: "ref1".to_string(),
            expires_in,
            token_type: "Bearer".to_string(),
            scope: "contatos".to_string(),
        }
    }

    fn creds() -> ClientCredentials {
        ClientCredentials::new("id", "secret").unwrap()
    }

    fn code(value: &str) -> AuthorizationCode {
        AuthorizationCode::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_scenario_access_token_until_expiry() {
        let h = harness();
        h.manager.persist(&token("tok1", 3600)).await.unwrap();

        h.clock.set_millis(3_599_000);
        assert_eq!(h.manager.valid_access_token().await.unwrap(), Some("tok1".to_string()));

        h.clock.set_millis(3_600_000);
        assert_eq!(h.manager.valid_access_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_is_expired_boundary_from_later_issue_time() {
        let h = harness();
        h.clock.set_millis(50_000);
        h.manager.persist(&token("tok1", 10)).await.unwrap();

        h.clock.set_millis(59_999);
        assert!(!h.manager.is_expired().await.unwrap());
        h.clock.set_millis(60_000);
        assert!(h.manager.is_expired().await.unwrap());
    }

    #[tokio::test]
    async fn test_is_expired_without_expiry() {
        let h = harness();
        assert!(h.manager.is_expired().await.unwrap());

        h.store.insert(StorageKey::TokenExpiresAt, "not-a-number");
        assert!(h.manager.is_expired().await.unwrap());
    }

    #[tokio::test]
    async fn test_persist_writes_record_and_removes_code() {
        let h = harness();
        h.clock.set_millis(1_000);
        h.store.insert(StorageKey::AuthorizationCode, "abc123");

        h.manager.persist(&token("tok1", 3600)).await.unwrap();

        assert_eq!(h.store.value(StorageKey::AccessToken), Some("tok1".to_string()));
        assert_eq!(h.store.value(StorageKey::RefreshToken), Some("ref1".to_string()));
        assert_eq!(h.store.value(StorageKey::TokenExpiresIn), Some("3600".to_string()));
        assert_eq!(h.store.value(StorageKey::TokenExpiresAt), Some("3601000".to_string()));
        assert_eq!(h.store.value(StorageKey::TokenScope), Some("contatos".to_string()));
        assert_eq!(h.store.value(StorageKey::AuthorizationCode), None);
    }

    #[tokio::test]
    async fn test_exchange_without_credentials_makes_no_call() {
        let h = harness();
        let err = h
            .manager
            .exchange_authorization_code(&code("abc"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::MissingCredentials));
        assert!(h.transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_exchange_with_only_client_id_stored() {
        let h = harness();
        h.store.insert(StorageKey::ClientId, "id");

        let err = h
            .manager
            .exchange_authorization_code(&code("abc"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::MissingCredentials));
    }

    #[tokio::test]
    async fn test_exchange_uses_stored_credentials() {
        let h = harness();
        h.manager.save_client_credentials(&creds()).await.unwrap();
        h.transport.push(Ok(token("tok1", 3600)));

        let response = h
            .manager
            .exchange_authorization_code(&code("abc"), None)
            .await
            .unwrap();

        assert_eq!(response.access_token, "tok1");
        let calls = h.transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].0,
            GrantRequest::AuthorizationCode { code: code("abc") }
        );
        assert_eq!(calls[0].1, "Basic aWQ6c2VjcmV0");
    }

    #[tokio::test]
    async fn test_exchange_does_not_persist() {
        let h = harness();
        h.transport.push(Ok(token("tok1", 3600)));
        h.manager
            .exchange_authorization_code(&code("abc"), Some(&creds()))
            .await
            .unwrap();

        assert_eq!(h.store.value(StorageKey::AccessToken), None);
    }

    #[tokio::test]
    async fn test_exchange_rejected_uses_error_field() {
        let h = harness();
        h.transport.push(Err(TransportError::Status {
            status: 400,
            reason: "Bad Request".to_string(),
            body: json!({ "error": "invalid_grant" }),
        }));

        let err = h
            .manager
            .exchange_authorization_code(&code("abc"), Some(&creds()))
            .await
            .unwrap_err();

        match err {
            SessionError::TokenExchangeRejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "invalid_grant");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejection_prefers_error_description() {
        let h = harness();
        h.transport.push(Err(TransportError::Status {
            status: 401,
            reason: "Unauthorized".to_string(),
            body: json!({ "error": "invalid_client", "error_description": "bad secret" }),
        }));

        let err = h
            .manager
            .refresh_access_token("ref1", Some(&creds()))
            .await
            .unwrap_err();
        assert!(
            matches!(err, SessionError::TokenExchangeRejected { status: 401, ref message } if message == "bad secret")
        );
    }

    #[tokio::test]
    async fn test_rejection_without_message_falls_back() {
        let h = harness();
        h.transport.push(Err(TransportError::Status {
            status: 500,
            reason: "Internal Server Error".to_string(),
            body: json!("<html>oops</html>"),
        }));

        let err = h
            .manager
            .exchange_authorization_code(&code("abc"), Some(&creds()))
            .await
            .unwrap_err();
        assert!(
            matches!(err, SessionError::TokenExchangeRejected { status: 500, ref message } if message == "error 500 while obtaining token")
        );
    }

    #[tokio::test]
    async fn test_unreachable_maps_to_transport_unavailable() {
        let h = harness();
        h.transport.push(Err(TransportError::Unreachable {
            url: "http://localhost/Api/v3/oauth/token".to_string(),
            message: "connection refused".to_string(),
        }));

        let err = h
            .manager
            .refresh_access_token("ref1", Some(&creds()))
            .await
            .unwrap_err();
        match err {
            SessionError::TransportUnavailable { target_url } => {
                assert_eq!(target_url, "http://localhost/Api/v3/oauth/token");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refresh_sends_refresh_grant() {
        let h = harness();
        h.transport.push(Ok(token("tok2", 3600)));

        let response = h
            .manager
            .refresh_access_token("ref1", Some(&creds()))
            .await
            .unwrap();
        assert_eq!(response.access_token, "tok2");
        assert_eq!(
            h.transport.calls()[0].0,
            GrantRequest::RefreshToken {
                refresh_token: "ref1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_is_authenticated_purges_expired_record() {
        let h = harness();
        h.manager.persist(&token("tok1", 60)).await.unwrap();
        h.clock.set_millis(60_000);

        assert!(!h.manager.is_authenticated().await.unwrap());
        for key in StorageKey::CREDENTIAL_RECORD {
            assert_eq!(h.store.value(key), None, "{key} should be purged");
        }
    }

    #[tokio::test]
    async fn test_is_authenticated_expired_ignores_code() {
        let h = harness();
        h.manager.persist(&token("tok1", 60)).await.unwrap();
        h.store.insert(StorageKey::AuthorizationCode, "abc123");
        h.clock.set_millis(120_000);

        assert!(!h.manager.is_authenticated().await.unwrap());
        assert_eq!(h.store.value(StorageKey::AuthorizationCode), Some("abc123".to_string()));
    }

    #[tokio::test]
    async fn test_is_authenticated_with_bare_code() {
        let h = harness();
        h.store.insert(StorageKey::AuthorizationCode, "abc123");
        assert!(h.manager.is_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn test_blank_code_is_not_authenticated() {
        let h = harness();
        h.store.insert(StorageKey::AuthorizationCode, "  ");
        assert!(!h.manager.is_authenticated().await.unwrap());
        assert_eq!(h.manager.session_state().await.unwrap(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_is_authenticated_valid_token() {
        let h = harness();
        h.manager.persist(&token("tok1", 60)).await.unwrap();
        h.clock.set_millis(59_999);
        assert!(h.manager.is_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn test_is_authenticated_partial_record() {
        let h = harness();
        h.store.insert(StorageKey::AccessToken, "tok1");
        assert!(!h.manager.is_authenticated().await.unwrap());
        assert!(h.manager.stored_credentials().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_state_transitions() {
        let h = harness();
        assert_eq!(h.manager.session_state().await.unwrap(), SessionState::Unauthenticated);

        h.manager.store_authorization_code(&code("abc123")).await.unwrap();
        assert_eq!(h.manager.session_state().await.unwrap(), SessionState::CodePresent);

        h.manager.persist(&token("tok1", 1)).await.unwrap();
        assert_eq!(h.manager.session_state().await.unwrap(), SessionState::TokenValid);

        h.clock.set_millis(1_000);
        assert_eq!(h.manager.session_state().await.unwrap(), SessionState::TokenExpired);

        assert!(!h.manager.is_authenticated().await.unwrap());
        assert_eq!(h.manager.session_state().await.unwrap(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_exchange_stored_code_persists() {
        let h = harness();
        h.manager.store_authorization_code(&code("abc123")).await.unwrap();
        h.manager.save_client_credentials(&creds()).await.unwrap();
        h.transport.push(Ok(token("tok1", 3600)));

        h.manager.exchange_stored_code(None).await.unwrap();

        assert_eq!(h.manager.valid_access_token().await.unwrap(), Some("tok1".to_string()));
        assert!(h.manager.stored_authorization_code().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_exchange_keeps_code() {
        let h = harness();
        h.manager.store_authorization_code(&code("abc123")).await.unwrap();
        h.transport.push(Err(TransportError::Status {
            status: 400,
            reason: "Bad Request".to_string(),
            body: json!({ "error": "invalid_grant" }),
        }));

        assert!(h.manager.exchange_stored_code(Some(&creds())).await.is_err());
        assert_eq!(h.store.value(StorageKey::AuthorizationCode), Some("abc123".to_string()));
    }

    #[tokio::test]
    async fn test_refresh_stored_token_requires_refresh_token() {
        let h = harness();
        let err = h.manager.refresh_stored_token(Some(&creds())).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Unauthenticated {
                reason: UnauthenticatedReason::MissingRefreshToken
            }
        ));
    }

    #[tokio::test]
    async fn test_refresh_stored_token_replaces_record() {
        let h = harness();
        h.manager.persist(&token("tok1", 60)).await.unwrap();
        h.clock.set_millis(30_000);
        h.transport.push(Ok(token("tok2", 60)));

        h.manager.refresh_stored_token(Some(&creds())).await.unwrap();

        let record = h.manager.stored_credentials().await.unwrap().unwrap();
        assert_eq!(record.access_token(), "tok2");
        assert_eq!(record.expires_at(), 90_000);
    }

    #[tokio::test]
    async fn test_clear_credentials_keeps_client_credentials() {
        let h = harness();
        h.manager.save_client_credentials(&creds()).await.unwrap();
        h.manager.persist(&token("tok1", 60)).await.unwrap();

        h.manager.clear_credentials().await.unwrap();

        assert!(h.manager.stored_credentials().await.unwrap().is_none());
        assert_eq!(
            h.manager.resolve_client_credentials(None).await.unwrap(),
            creds()
        );
    }

    #[tokio::test]
    async fn test_explicit_credentials_win() {
        let h = harness();
        h.manager.save_client_credentials(&creds()).await.unwrap();
        let explicit = ClientCredentials::new("other", "pair").unwrap();

        let resolved = h
            .manager
            .resolve_client_credentials(Some(&explicit))
            .await
            .unwrap();
        assert_eq!(resolved.client_id(), "other");
    }
}
