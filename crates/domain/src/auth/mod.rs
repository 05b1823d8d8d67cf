//! Authentication domain types

mod keys;
mod session;
mod types;

pub use keys::StorageKey;
pub use session::SessionState;
pub use types::{AuthorizationCode, ClientCredentials, GrantRequest, StoredCredentials, TokenResponse};
