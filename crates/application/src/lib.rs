//! Bling Application - Session core and ports
//!
//! This crate defines the application layer with:
//! - Port traits (store, clock, token endpoint, REST API)
//! - The token lifecycle manager and navigation guard
//! - Application-level error handling

pub mod auth;
pub mod error;
pub mod ports;
pub mod use_cases;

pub use auth::{GuardDecision, NavigationGuard, TokenManager};
pub use error::{SessionError, SessionResult, UnauthenticatedReason};
pub use ports::{
    ApiTransport, Clock, KeyValueStore, StoreError, TokenTransport, TransportError,
};
pub use use_cases::{CONTACTS_PATH, ConnectionReport, ContactsService};
