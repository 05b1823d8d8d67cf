//! Clock port for expiry arithmetic

use chrono::{DateTime, Utc};

/// Port for getting the current time.
///
/// Expiry checks read the time only through this trait, so tests can pin
/// "now" to an exact millisecond.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current time in epoch milliseconds.
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}
