//! Cache-aside read and write path for link records.
//!
//! [`Resolver`] keeps a [`LinkCache`](linkzap_core::LinkCache) as a mirror of
//! a [`LinkStore`](linkzap_core::LinkStore). Reads try the cache first and
//! repopulate it from the store on a miss. Writes go to the store and then
//! refresh the cache. Cache failures are logged and masked by the store;
//! store failures surface as [`ResolverError::Storage`].
//!
//! ```rust,no_run
//! use linkzap_core::ShortCode;
//! use linkzap_resolver::{Resolution, Resolver};
//! # async fn example<S: linkzap_core::LinkStore, C: linkzap_core::LinkCache>(
//! #     store: S,
//! #     cache: C,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = Resolver::new(store, cache);
//!
//! match resolver.get(&ShortCode::new("015ftgH")?).await? {
//!     Resolution::Redirect(url) => println!("redirect to {url}"),
//!     Resolution::Expired => println!("gone"),
//!     Resolution::NotFound => println!("not found"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod resolver;

pub use error::ResolverError;
pub use resolver::{Resolution, Resolver};

pub type Result<T> = std::result::Result<T, ResolverError>;
