use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use linkzap_core::repository::Result;
use linkzap_core::{LinkChanges, LinkFilter, LinkRecord, LinkStore, NewLink, ShortCode, StorageError};
use std::sync::atomic::{AtomicI64, Ordering};

/// In-memory implementation of [`LinkStore`] using DashMap.
///
/// Records are keyed by id with a secondary index from short code to id.
/// Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct InMemoryLinkStore {
    records: DashMap<i64, LinkRecord>,
    codes: DashMap<ShortCode, i64>,
    next_id: AtomicI64,
}

impl InMemoryLinkStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            codes: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored records, active or not.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for InMemoryLinkStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkStore for InMemoryLinkStore {
    async fn get(&self, id: i64) -> Result<Option<LinkRecord>> {
        Ok(self.records.get(&id).map(|r| r.value().clone()))
    }

    async fn find(&self, filter: &LinkFilter) -> Result<Option<LinkRecord>> {
        if let Some(code) = &filter.short_code {
            let Some(id) = self.codes.get(code).map(|id| *id) else {
                return Ok(None);
            };
            return Ok(self
                .records
                .get(&id)
                .filter(|r| filter.matches(r.value()))
                .map(|r| r.value().clone()));
        }

        Ok(self
            .records
            .iter()
            .filter(|r| filter.matches(r.value()))
            .min_by_key(|r| *r.key())
            .map(|r| r.value().clone()))
    }

    async fn insert(&self, link: NewLink) -> Result<LinkRecord> {
        // Claim the code first so two inserts of the same code cannot both win.
        let id = match self.codes.entry(link.short_code.clone()) {
            Entry::Occupied(_) => {
                return Err(StorageError::Conflict(link.short_code.to_string()));
            }
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                slot.insert(id);
                id
            }
        };

        let now = Timestamp::now();
        let record = LinkRecord {
            id,
            short_code: link.short_code,
            original_url: link.original_url,
            expires_at: link.expires_at,
            is_active: link.is_active,
            created_at: now,
            updated_at: now,
        };
        self.records.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: i64, changes: &LinkChanges) -> Result<Option<LinkRecord>> {
        let Some(mut record) = self.records.get_mut(&id) else {
            return Ok(None);
        };

        changes.apply_to(&mut record);
        record.updated_at = Timestamp::now();
        Ok(Some(record.clone()))
    }
}
