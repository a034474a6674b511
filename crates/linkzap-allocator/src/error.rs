use linkzap_core::CacheError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AllocationError {
    #[error("counter store unavailable: {0}")]
    Unavailable(String),
    #[error("counter '{0}' has not been initialized")]
    Uninitialized(String),
    #[error("invalid allocator settings: {0}")]
    InvalidSettings(String),
    #[error("counter '{key}' holds an invalid value: {value}")]
    InvalidValue { key: String, value: i64 },
}

impl From<CacheError> for AllocationError {
    fn from(value: CacheError) -> Self {
        Self::Unavailable(value.to_string())
    }
}
