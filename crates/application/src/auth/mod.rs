//! Session authentication for the Bling client.
//!
//! This module provides:
//! - Token lifecycle management over an injected key-value store
//! - A navigation guard for protected views

mod guard;
#[cfg(test)]
pub(crate) mod test_support;
mod token_manager;

pub use guard::{GuardDecision, LOGIN_PATH, LOGIN_ROUTE, NavigationGuard};
pub use token_manager::TokenManager;
