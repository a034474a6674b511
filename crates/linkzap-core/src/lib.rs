//! Core types and traits for the linkzap URL shortener.
//!
//! This crate holds the short code codec, the link record model and the
//! contracts of the three external collaborators: the backing store
//! ([`LinkStore`]), the entry cache ([`LinkCache`]) and the shared counter
//! ([`CounterStore`]).

pub mod base62;
pub mod cache;
pub mod counter;
pub mod error;
pub mod expiration;
pub mod repository;
pub mod shortcode;

pub use cache::{CacheEntry, LinkCache};
pub use counter::{CounterStore, DEFAULT_COUNTER_KEY};
pub use error::{CacheError, CoreError, StorageError};
pub use expiration::ExpirationPolicy;
pub use repository::{LinkChanges, LinkFilter, LinkRecord, LinkStore, NewLink};
pub use shortcode::ShortCode;
