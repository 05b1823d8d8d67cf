//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod key_value_store;
mod transport;

pub use clock::Clock;
pub use key_value_store::{KeyValueStore, StoreError};
pub use transport::{ApiTransport, TokenTransport, TransportError};
