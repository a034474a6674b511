use std::sync::Arc;

use jiff::Timestamp;
use linkzap_core::{
    CacheEntry, LinkCache, LinkChanges, LinkFilter, LinkRecord, LinkStore, NewLink, ShortCode,
};
use tracing::{debug, info, trace, warn};

use crate::{ResolverError, Result};

/// Outcome of resolving a short code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Redirect(String),
    NotFound,
    /// The link exists but its expiry has passed.
    Expired,
}

/// Mediates between a link cache and the backing store.
#[derive(Debug)]
pub struct Resolver<S, C> {
    store: Arc<S>,
    cache: Arc<C>,
}

impl<S, C> Clone for Resolver<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<S: LinkStore, C: LinkCache> Resolver<S, C> {
    pub fn new(store: S, cache: C) -> Self {
        Self::from_shared(Arc::new(store), Arc::new(cache))
    }

    pub fn from_shared(store: Arc<S>, cache: Arc<C>) -> Self {
        Self { store, cache }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Resolves `code` to its destination.
    ///
    /// A cache hit is answered without touching the store; an expired hit is
    /// deleted from the cache. On a miss the active record is looked up in the
    /// store and cached unless it has already expired.
    pub async fn get(&self, code: &ShortCode) -> Result<Resolution> {
        trace!(code = %code, "resolving short code");
        let now = Timestamp::now();

        match self.cache.get_entry(code).await {
            Ok(Some(entry)) => return Ok(self.resolve_cached(entry, now).await),
            Ok(None) => trace!(code = %code, "cache miss, reading store"),
            Err(e) => {
                warn!(code = %code, error = %e, "cache lookup failed, falling back to store");
            }
        }

        let Some(record) = self.store.find(&LinkFilter::active_code(code)).await? else {
            trace!(code = %code, "short code not found");
            return Ok(Resolution::NotFound);
        };

        if record.is_expired(now) {
            debug!(code = %code, "stored record has expired");
            return Ok(Resolution::Expired);
        }

        self.write_entry(&CacheEntry::from(&record)).await;
        debug!(code = %code, url = %record.original_url, "resolved short code from store");
        Ok(Resolution::Redirect(record.original_url))
    }

    async fn resolve_cached(&self, entry: CacheEntry, now: Timestamp) -> Resolution {
        if !entry.is_active {
            debug!(code = %entry.short_code, "cached link is inactive");
            return Resolution::NotFound;
        }

        if entry.is_expired(now) {
            debug!(code = %entry.short_code, "cached link has expired, purging");
            self.purge(&entry.short_code).await;
            return Resolution::Expired;
        }

        debug!(code = %entry.short_code, url = %entry.original_url, "resolved short code from cache");
        Resolution::Redirect(entry.original_url)
    }

    /// Inserts `link` into the store and primes the cache with the result.
    ///
    /// The entry is cached even when its expiry has already passed; the next
    /// [`get`](Self::get) purges it.
    pub async fn create(&self, link: NewLink) -> Result<LinkRecord> {
        let record = self.store.insert(link).await?;
        self.refresh_entry(&record).await;

        info!(code = %record.short_code, id = record.id, "created link");
        Ok(record)
    }

    /// Applies `changes` to the record with `id`, then refreshes its cache
    /// entry. An entry whose new expiry is already past is deleted instead,
    /// as is one that could not be overwritten.
    pub async fn update(&self, id: i64, changes: &LinkChanges) -> Result<LinkRecord> {
        let record = self
            .store
            .update(id, changes)
            .await?
            .ok_or(ResolverError::NotFound(id))?;

        if record.is_expired(Timestamp::now()) {
            self.purge(&record.short_code).await;
        } else {
            self.refresh_entry(&record).await;
        }

        info!(code = %record.short_code, id, "updated link");
        Ok(record)
    }

    /// Reads the record with `id` straight from the store.
    pub async fn link(&self, id: i64) -> Result<LinkRecord> {
        self.store
            .get(id)
            .await?
            .ok_or(ResolverError::NotFound(id))
    }

    async fn write_entry(&self, entry: &CacheEntry) -> bool {
        match self.cache.set_entry(entry).await {
            Ok(()) => true,
            Err(e) => {
                warn!(code = %entry.short_code, error = %e, "failed to write cache entry");
                false
            }
        }
    }

    /// Overwrites the entry for `record`. If the write fails the old entry
    /// is deleted so later reads go to the store instead of serving it.
    async fn refresh_entry(&self, record: &LinkRecord) {
        if !self.write_entry(&CacheEntry::from(record)).await {
            self.purge(&record.short_code).await;
        }
    }

    async fn purge(&self, code: &ShortCode) {
        if let Err(e) = self.cache.del(code).await {
            warn!(code = %code, error = %e, "failed to purge cache entry");
        }
    }
}
