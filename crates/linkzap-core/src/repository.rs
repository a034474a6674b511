use crate::error::StorageError;
use crate::expiration;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for backing store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A link as persisted by the backing store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Store-assigned identifier. Immutable.
    pub id: i64,
    /// Unique code, immutable once assigned.
    pub short_code: ShortCode,
    /// The URL the code redirects to.
    pub original_url: String,
    /// When the link stops resolving, if ever.
    pub expires_at: Option<Timestamp>,
    /// Soft-delete flag. Inactive links never resolve.
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl LinkRecord {
    /// Returns `true` if the record has passed its expiry at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        expiration::is_expired(self.expires_at, now)
    }
}

/// Fields for a link that has not been persisted yet.
///
/// The short code is attached by the caller after allocation; the store
/// assigns the id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLink {
    pub short_code: ShortCode,
    pub original_url: String,
    pub expires_at: Option<Timestamp>,
    pub is_active: bool,
}

impl NewLink {
    /// An active link without expiry.
    pub fn new(short_code: ShortCode, original_url: impl Into<String>) -> Self {
        Self {
            short_code,
            original_url: original_url.into(),
            expires_at: None,
            is_active: true,
        }
    }

    pub fn with_expires_at(mut self, expires_at: Option<Timestamp>) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// A partial update of a [`LinkRecord`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkChanges {
    pub original_url: Option<String>,
    /// `Some(None)` clears the expiry.
    pub expires_at: Option<Option<Timestamp>>,
    pub is_active: Option<bool>,
}

impl LinkChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn original_url(mut self, url: impl Into<String>) -> Self {
        self.original_url = Some(url.into());
        self
    }

    pub fn expires_at(mut self, expires_at: Option<Timestamp>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// Shorthand for `active(false)`.
    pub fn deactivate(self) -> Self {
        self.active(false)
    }

    pub fn is_empty(&self) -> bool {
        self.original_url.is_none() && self.expires_at.is_none() && self.is_active.is_none()
    }

    /// Applies the changes in place. Does not touch `updated_at`.
    pub fn apply_to(&self, record: &mut LinkRecord) {
        if let Some(url) = &self.original_url {
            record.original_url.clone_from(url);
        }
        if let Some(expires_at) = self.expires_at {
            record.expires_at = expires_at;
        }
        if let Some(is_active) = self.is_active {
            record.is_active = is_active;
        }
    }
}

/// Equality filter for [`LinkStore::find`]. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkFilter {
    pub short_code: Option<ShortCode>,
    pub is_active: Option<bool>,
}

impl LinkFilter {
    /// Matches the active record carrying `code`.
    pub fn active_code(code: &ShortCode) -> Self {
        Self {
            short_code: Some(code.clone()),
            is_active: Some(true),
        }
    }

    pub fn matches(&self, record: &LinkRecord) -> bool {
        self.short_code
            .as_ref()
            .is_none_or(|code| *code == record.short_code)
            && self.is_active.is_none_or(|active| active == record.is_active)
    }
}

/// The durable, authoritative link repository.
///
/// Implementations own id assignment and timestamps. They do not evaluate
/// expiry: expired records are returned like any other.
#[async_trait]
pub trait LinkStore: Send + Sync + 'static {
    /// Fetches a record by id. Returns `None` if no such id exists.
    async fn get(&self, id: i64) -> Result<Option<LinkRecord>>;

    /// Returns the first record matching `filter`.
    async fn find(&self, filter: &LinkFilter) -> Result<Option<LinkRecord>>;

    /// Persists a new record. Returns `Err(Conflict)` if the short code is taken.
    async fn insert(&self, link: NewLink) -> Result<LinkRecord>;

    /// Applies `changes` to the record with `id` and returns the updated record,
    /// or `None` if no such id exists.
    async fn update(&self, id: i64, changes: &LinkChanges) -> Result<Option<LinkRecord>>;
}
