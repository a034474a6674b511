use crate::cache::Result;
use async_trait::async_trait;

/// Key of the counter backing short code allocation.
pub const DEFAULT_COUNTER_KEY: &str = "url:counter";

/// A shared, named integer that can only be atomically incremented.
///
/// The backend serializes increments, so no two callers ever observe the
/// same post-increment value.
#[async_trait]
pub trait CounterStore: Send + Sync + 'static {
    /// Increments `key` by one and returns the new value.
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Checks whether `key` has been created.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Sets `key` to `value` unless it already exists.
    /// Returns `true` if this call created the key.
    async fn set_if_absent(&self, key: &str, value: i64) -> Result<bool>;
}
