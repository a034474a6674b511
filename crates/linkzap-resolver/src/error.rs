use linkzap_core::StorageError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ResolverError {
    #[error("no link with id {0}")]
    NotFound(i64),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
