//! Short code allocation backed by a shared atomic counter.
//!
//! Every allocation is a single `INCR` on a named counter held by the shared
//! store; the post-increment value is base62-encoded into a fixed-width
//! [`ShortCode`]. The store serializes increments, which is what makes codes
//! unique across processes without any locking on the backing database.

pub mod allocator;
pub mod error;

pub use allocator::{Allocator, AllocatorSettings, SEED_RANGE};
pub use error::AllocationError;

use async_trait::async_trait;
use linkzap_core::ShortCode;

/// Trait for producing fresh short codes.
///
/// Implementations never hand out the same code twice, including across
/// concurrent callers.
#[async_trait]
pub trait CodeAllocator: Send + Sync + 'static {
    /// Allocates a new, globally unique short code.
    async fn allocate(&self) -> Result<ShortCode, AllocationError>;
}
