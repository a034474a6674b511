use crate::{AllocationError, CodeAllocator};
use async_trait::async_trait;
use linkzap_core::shortcode::{MAX_LENGTH, MIN_LENGTH};
use linkzap_core::{base62, CounterStore, ShortCode, DEFAULT_COUNTER_KEY};
use rand::Rng;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use typed_builder::TypedBuilder;

/// Range the counter is seeded from, so the first codes are not predictable
/// low values.
pub const SEED_RANGE: RangeInclusive<i64> = 1_000_000_000..=9_999_999_999;

/// Configures an [`Allocator`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct AllocatorSettings {
    /// Key of the counter in the shared store.
    #[builder(default = DEFAULT_COUNTER_KEY.to_string(), setter(into))]
    pub counter_key: String,
    /// Minimum width of generated codes, between 1 and 16.
    #[builder(default = base62::DEFAULT_LENGTH)]
    pub length: usize,
    /// Range the initial counter value is drawn from.
    #[builder(default = SEED_RANGE)]
    pub seed_range: RangeInclusive<i64>,
}

impl Default for AllocatorSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl AllocatorSettings {
    /// Rejects widths that would produce codes outside `ShortCode`'s bounds
    /// and empty or negative seed ranges.
    pub fn validate(&self) -> Result<(), AllocationError> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&self.length) {
            return Err(AllocationError::InvalidSettings(format!(
                "code length must be between {MIN_LENGTH} and {MAX_LENGTH}, got {}",
                self.length
            )));
        }
        if self.seed_range.is_empty() || *self.seed_range.start() < 0 {
            return Err(AllocationError::InvalidSettings(format!(
                "seed range must be non-empty and non-negative, got {:?}",
                self.seed_range
            )));
        }
        Ok(())
    }
}

/// Allocates short codes from a remote atomic counter.
///
/// The counter handle is injected; the allocator itself holds no allocation
/// state beyond remembering whether [`Allocator::ensure_counter`] has run.
#[derive(Debug)]
pub struct Allocator<K> {
    counter: Arc<K>,
    settings: AllocatorSettings,
    ensured: AtomicBool,
}

impl<K: CounterStore> Allocator<K> {
    pub fn new(counter: K, settings: AllocatorSettings) -> Self {
        Self::from_shared(Arc::new(counter), settings)
    }

    /// Creates an allocator over a counter handle shared with other components.
    pub fn from_shared(counter: Arc<K>, settings: AllocatorSettings) -> Self {
        Self {
            counter,
            settings,
            ensured: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &AllocatorSettings {
        &self.settings
    }

    /// Creates the counter with a random seed if it does not exist yet.
    ///
    /// Safe to call from racing initializers: the write is a set-if-absent, so
    /// at most one seed lands and every caller proceeds. Returns `true` if this
    /// call seeded the counter.
    pub async fn ensure_counter(&self) -> Result<bool, AllocationError> {
        self.settings.validate()?;
        let key = self.settings.counter_key.as_str();

        let created = if self.counter.exists(key).await? {
            trace!(counter = key, "counter already initialized");
            false
        } else {
            let seed = self.random_seed();
            let created = self.counter.set_if_absent(key, seed).await?;
            if created {
                info!(counter = key, seed, "initialized allocation counter");
            } else {
                debug!(counter = key, "counter initialized concurrently by another caller");
            }
            created
        };

        self.ensured.store(true, Ordering::Release);
        Ok(created)
    }

    /// Increments the counter and encodes the new value as a short code.
    ///
    /// Fails with [`AllocationError::Uninitialized`] until
    /// [`ensure_counter`](Self::ensure_counter) has succeeded, and again once
    /// the counter is seen below its seed range (the key was lost from the
    /// shared store). Store failures are returned as-is; nothing is retried
    /// here.
    pub async fn allocate(&self) -> Result<ShortCode, AllocationError> {
        let key = self.settings.counter_key.as_str();
        if !self.ensured.load(Ordering::Acquire) {
            return Err(AllocationError::Uninitialized(key.to_string()));
        }

        let raw = self.counter.incr(key).await?;
        let value = u64::try_from(raw).map_err(|_| AllocationError::InvalidValue {
            key: key.to_string(),
            value: raw,
        })?;

        // A seeded counter only grows past the seed, so a value at or below the
        // range start means the key was lost and recreated by INCR.
        if raw <= *self.settings.seed_range.start() {
            warn!(counter = key, value = raw, "counter fell below its seed range, refusing to allocate");
            self.ensured.store(false, Ordering::Release);
            return Err(AllocationError::Uninitialized(key.to_string()));
        }

        let code = ShortCode::from_value(value, self.settings.length);
        debug!(counter = key, value, code = %code, "allocated short code");
        Ok(code)
    }

    fn random_seed(&self) -> i64 {
        rand::rng().random_range(self.settings.seed_range.clone())
    }
}

#[async_trait]
impl<K: CounterStore> CodeAllocator for Allocator<K> {
    async fn allocate(&self) -> Result<ShortCode, AllocationError> {
        Allocator::allocate(self).await
    }
}
