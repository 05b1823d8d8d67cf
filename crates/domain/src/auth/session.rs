//! Session lifecycle states

/// Where the local session stands in the token lifecycle.
///
/// `Unauthenticated -> CodePresent -> TokenValid -> TokenExpired`, with the
/// expired state collapsing back to `Unauthenticated` once cleaned up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing usable is stored.
    Unauthenticated,
    /// An authorization code awaits exchange.
    CodePresent,
    /// A non-expired credential record is stored.
    TokenValid,
    /// A credential record is stored but past its expiry.
    TokenExpired,
}

impl SessionState {
    /// Whether the guard lets this state through.
    ///
    /// `CodePresent` is admitted so the views that perform the exchange stay
    /// reachable.
    #[must_use]
    pub const fn admits_navigation(self) -> bool {
        matches!(self, Self::TokenValid | Self::CodePresent)
    }

    /// A user-friendly description.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Unauthenticated => "Not authenticated",
            Self::CodePresent => "Authorization code received, token exchange pending",
            Self::TokenValid => "Access token valid",
            Self::TokenExpired => "Access token expired",
        }
    }
}
