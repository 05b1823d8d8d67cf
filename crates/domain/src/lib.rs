//! Bling Domain - Core session types
//!
//! This crate defines the `OAuth2` credential model for the Bling client.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;

pub use auth::{
    AuthorizationCode, ClientCredentials, GrantRequest, SessionState, StorageKey,
    StoredCredentials, TokenResponse,
};
pub use error::{DomainError, DomainResult};
