//! Bling Infrastructure - Adapters and implementations
//!
//! Concrete implementations of the ports defined in the application
//! layer: the reqwest-based Bling client, the system clock, session
//! stores, plus configuration and tracing setup.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod telemetry;

pub use adapters::{ReqwestBlingClient, SystemClock};
pub use config::{BlingConfig, ConfigError, TOKEN_PATH};
pub use persistence::{FileKeyValueStore, InMemoryKeyValueStore};
pub use telemetry::{init_tracing, init_tracing_with_default};
