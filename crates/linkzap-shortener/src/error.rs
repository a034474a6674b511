use linkzap_allocator::AllocationError;
use linkzap_core::{CoreError, StorageError};
use linkzap_resolver::ResolverError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShortenerError>;

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
    #[error("invalid expiration: {0}")]
    InvalidExpiration(String),
    #[error("custom short codes are not supported: {0}")]
    CustomCodeUnsupported(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("link has expired: {0}")]
    Expired(String),
    #[error("short code already exists: {0}")]
    Conflict(String),
    #[error("allocation failed: {0}")]
    Allocation(#[from] AllocationError),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ShortenerError {
    /// HTTP status a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidUrl(_)
            | Self::InvalidShortCode(_)
            | Self::InvalidExpiration(_)
            | Self::CustomCodeUnsupported(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Expired(_) => 410,
            Self::Storage(_) => 500,
            Self::Allocation(_) => 503,
        }
    }
}

impl From<CoreError> for ShortenerError {
    fn from(value: CoreError) -> Self {
        match value {
            CoreError::InvalidShortCode(message) => Self::InvalidShortCode(message),
            CoreError::InvalidExpiration(message) => Self::InvalidExpiration(message),
        }
    }
}

impl From<StorageError> for ShortenerError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Conflict(code) => Self::Conflict(code),
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<ResolverError> for ShortenerError {
    fn from(value: ResolverError) -> Self {
        match value {
            ResolverError::NotFound(id) => Self::NotFound(format!("link {id}")),
            ResolverError::Storage(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(ShortenerError::NotFound("x".into()).status_code(), 404);
        assert_eq!(ShortenerError::Expired("x".into()).status_code(), 410);
        assert_eq!(ShortenerError::InvalidUrl("x".into()).status_code(), 400);
        assert_eq!(
            ShortenerError::Allocation(AllocationError::Uninitialized("url:counter".into()))
                .status_code(),
            503
        );
        assert_eq!(
            ShortenerError::from(StorageError::Timeout("slow".into())).status_code(),
            500
        );
    }

    #[test]
    fn resolver_errors_convert() {
        let err = ShortenerError::from(ResolverError::NotFound(7));
        assert!(matches!(err, ShortenerError::NotFound(m) if m == "link 7"));

        let err = ShortenerError::from(ResolverError::Storage(StorageError::Conflict(
            "015ftgH".into(),
        )));
        assert!(matches!(err, ShortenerError::Conflict(c) if c == "015ftgH"));
    }
}
