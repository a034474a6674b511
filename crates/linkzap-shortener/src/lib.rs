//! URL shortener service.
//!
//! Glues an allocator to the cache-aside resolver: a shortened URL gets a
//! freshly allocated code, is written to the store and primed in the cache.

pub mod error;
pub mod service;
pub mod shortener;

pub use error::{Result, ShortenerError};
pub use service::ShortenerService;
pub use shortener::{LinkUpdate, ShortenParams, Shortener};
