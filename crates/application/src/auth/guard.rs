//! Navigation guard for protected views.

use crate::auth::TokenManager;
use crate::error::SessionResult;

/// Name of the route unauthenticated users are sent to.
pub const LOGIN_ROUTE: &str = "Login";

/// Path of the login route.
pub const LOGIN_PATH: &str = "/login";

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Navigation may proceed.
    Allow,
    /// Navigation must go to `route`, remembering where the user was headed.
    Redirect {
        /// Target route name.
        route: &'static str,
        /// Full path originally requested.
        redirect: String,
    },
}

impl GuardDecision {
    /// Returns true if navigation may proceed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Renders the redirect as a location, e.g. `/login?redirect=%2Fmediator`.
    #[must_use]
    pub fn login_location(&self) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::Redirect { redirect, .. } => {
                let encoded: String = url::form_urlencoded::byte_serialize(redirect.as_bytes()).collect();
                Some(format!("{LOGIN_PATH}?redirect={encoded}"))
            }
        }
    }
}

/// Gatekeeper consulted before entering protected views.
#[derive(Clone)]
pub struct NavigationGuard {
    tokens: TokenManager,
}

impl NavigationGuard {
    /// Creates a guard backed by the given token manager.
    #[must_use]
    pub const fn new(tokens: TokenManager) -> Self {
        Self { tokens }
    }

    /// Decides whether navigation to `target_path` may proceed.
    ///
    /// Expired credentials are purged as a side effect of the check.
    ///
    /// # Errors
    ///
    /// Only store failures.
    pub async fn check(&self, target_path: &str) -> SessionResult<GuardDecision> {
        if self.tokens.is_authenticated().await? {
            return Ok(GuardDecision::Allow);
        }
        tracing::debug!(target_path, "redirecting unauthenticated navigation to login");
        Ok(GuardDecision::Redirect {
            route: LOGIN_ROUTE,
            redirect: target_path.to_string(),
        })
    }
}
