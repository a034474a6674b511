use crate::error::Result;
use async_trait::async_trait;
use linkzap_core::{ExpirationPolicy, LinkRecord, ShortCode};

/// Request to shorten a URL.
#[derive(Debug, Clone)]
pub struct ShortenParams {
    /// The URL to redirect to. Must be http or https.
    pub original_url: String,
    pub expiration: ExpirationPolicy,
    /// Caller-chosen code. Codes are always allocated, so any value here is
    /// rejected.
    pub custom_alias: Option<ShortCode>,
}

impl ShortenParams {
    pub fn new(original_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            expiration: ExpirationPolicy::Never,
            custom_alias: None,
        }
    }

    pub fn with_expiration(mut self, expiration: ExpirationPolicy) -> Self {
        self.expiration = expiration;
        self
    }
}

/// Partial update of an existing link. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct LinkUpdate {
    pub original_url: Option<String>,
    /// `Some(ExpirationPolicy::Never)` clears the expiry.
    pub expiration: Option<ExpirationPolicy>,
    pub is_active: Option<bool>,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Allocates a code for `params.original_url` and stores the link.
    async fn shorten(&self, params: ShortenParams) -> Result<LinkRecord>;

    /// Returns the URL `code` redirects to.
    async fn resolve(&self, code: &ShortCode) -> Result<String>;

    /// Applies `update` to the link with `id`.
    async fn update(&self, id: i64, update: LinkUpdate) -> Result<LinkRecord>;

    /// Fetches the link with `id`, whatever its state.
    async fn link(&self, id: i64) -> Result<LinkRecord>;
}
