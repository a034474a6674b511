//! Cache and counter backends for linkzap.
//!
//! - [`RedisStore`]: production backend; implements both
//!   [`LinkCache`](linkzap_core::LinkCache) and
//!   [`CounterStore`](linkzap_core::CounterStore) over one connection.
//! - [`MokaLinkCache`] and [`MemoryCounter`]: in-process doubles for
//!   single-node use and tests.

pub mod counter;
pub mod moka;
pub mod redis;

pub use counter::MemoryCounter;
pub use self::moka::MokaLinkCache;
pub use self::redis::RedisStore;
