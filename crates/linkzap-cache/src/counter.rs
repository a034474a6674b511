use async_trait::async_trait;
use linkzap_core::cache::Result;
use linkzap_core::CounterStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::trace;

/// An in-process [`CounterStore`].
///
/// Increments are serialized by a mutex, which gives the same uniqueness
/// guarantee as Redis `INCR` within a single process. Like Redis, incrementing
/// a missing key starts it from zero.
#[derive(Debug, Default)]
pub struct MemoryCounter {
    values: Mutex<HashMap<String, i64>>,
}

impl MemoryCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value` unconditionally.
    pub fn seed(&self, key: impl Into<String>, value: i64) {
        self.values.lock().insert(key.into(), value);
    }

    /// Deletes `key`, returning its last value.
    pub fn remove(&self, key: &str) -> Option<i64> {
        self.values.lock().remove(key)
    }

    /// Returns the current value of `key`, if it exists.
    pub fn value(&self, key: &str) -> Option<i64> {
        self.values.lock().get(key).copied()
    }
}

#[async_trait]
impl CounterStore for MemoryCounter {
    async fn incr(&self, key: &str) -> Result<i64> {
        let mut values = self.values.lock();
        let value = values.entry(key.to_string()).or_insert(0);
        *value += 1;
        trace!(counter = key, value = *value, "incremented in-memory counter");
        Ok(*value)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.values.lock().contains_key(key))
    }

    async fn set_if_absent(&self, key: &str, value: i64) -> Result<bool> {
        let mut values = self.values.lock();
        if values.contains_key(key) {
            return Ok(false);
        }
        values.insert(key.to_string(), value);
        Ok(true)
    }
}
