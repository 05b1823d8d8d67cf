//! Domain error types

use thiserror::Error;

/// Domain-level errors raised while validating session values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An authorization code was empty or whitespace only.
    #[error("authorization code must not be empty")]
    EmptyAuthorizationCode,

    /// A client credential field was empty.
    #[error("client credential field is empty: {0}")]
    EmptyClientCredential(&'static str),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
