use async_trait::async_trait;
use linkzap_core::cache::Result;
use linkzap_core::{CacheEntry, LinkCache, ShortCode};
use moka::future::Cache;
use tracing::{debug, trace};

/// An in-memory [`LinkCache`] built on Moka.
///
/// Suited to single-node deployments and tests. Entries live until they are
/// overwritten, deleted, or pushed out by the capacity bound.
#[derive(Debug, Clone)]
pub struct MokaLinkCache {
    cache: Cache<ShortCode, CacheEntry>,
}

impl MokaLinkCache {
    /// Creates a cache holding at most 10,000 entries.
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    /// Creates a cache with a custom maximum capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(max_capacity).build();
        Self { cache }
    }

    /// Returns `true` if an entry for `code` is present.
    pub fn contains(&self, code: &ShortCode) -> bool {
        self.cache.contains_key(code)
    }
}

impl Default for MokaLinkCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkCache for MokaLinkCache {
    async fn get_entry(&self, code: &ShortCode) -> Result<Option<CacheEntry>> {
        match self.cache.get(code).await {
            Some(entry) => {
                debug!(code = %code, "Cache hit in Moka");
                Ok(Some(entry))
            }
            None => {
                trace!(code = %code, "Cache miss in Moka");
                Ok(None)
            }
        }
    }

    async fn set_entry(&self, entry: &CacheEntry) -> Result<()> {
        self.cache
            .insert(entry.short_code.clone(), entry.clone())
            .await;
        debug!(code = %entry.short_code, "Cached entry in Moka");
        Ok(())
    }

    async fn del(&self, code: &ShortCode) -> Result<()> {
        self.cache.invalidate(code).await;
        debug!(code = %code, "Removed entry from Moka cache (if present)");
        Ok(())
    }
}
