use crate::error::{Result, ShortenerError};
use crate::shortener::{LinkUpdate, ShortenParams, Shortener};
use async_trait::async_trait;
use jiff::Timestamp;
use linkzap_allocator::CodeAllocator;
use linkzap_core::{LinkCache, LinkChanges, LinkRecord, LinkStore, NewLink, ShortCode};
use linkzap_resolver::{Resolution, Resolver};
use std::sync::Arc;
use tracing::{debug, info};

/// A concrete implementation of the [`Shortener`] trait.
///
/// Codes come from the allocator and are never checked against the store;
/// the allocator is responsible for their uniqueness.
#[derive(Debug)]
pub struct ShortenerService<A, S, C> {
    allocator: Arc<A>,
    resolver: Resolver<S, C>,
}

impl<A, S, C> Clone for ShortenerService<A, S, C> {
    fn clone(&self) -> Self {
        Self {
            allocator: Arc::clone(&self.allocator),
            resolver: self.resolver.clone(),
        }
    }
}

impl<A: CodeAllocator, S: LinkStore, C: LinkCache> ShortenerService<A, S, C> {
    pub fn new(allocator: A, resolver: Resolver<S, C>) -> Self {
        Self {
            allocator: Arc::new(allocator),
            resolver,
        }
    }

    pub fn resolver(&self) -> &Resolver<S, C> {
        &self.resolver
    }

    /// Checks that the URL is http or https with a non-empty host.
    fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }

        let Some((scheme, rest)) = url.split_once("://") else {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must have a scheme and host: {url}"
            )));
        };

        let scheme = scheme.to_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL scheme must be http or https: {scheme}"
            )));
        }

        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        if host.is_empty() {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must have a host: {url}"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl<A: CodeAllocator, S: LinkStore, C: LinkCache> Shortener for ShortenerService<A, S, C> {
    async fn shorten(&self, params: ShortenParams) -> Result<LinkRecord> {
        Self::validate_url(&params.original_url)?;

        if let Some(code) = params.custom_alias {
            return Err(ShortenerError::CustomCodeUnsupported(code.to_string()));
        }

        let expires_at = params.expiration.expires_at(Timestamp::now())?;
        let code = self.allocator.allocate().await?;

        let link = NewLink::new(code, params.original_url).with_expires_at(expires_at);
        let record = self.resolver.create(link).await?;

        info!(code = %record.short_code, id = record.id, "shortened url");
        Ok(record)
    }

    async fn resolve(&self, code: &ShortCode) -> Result<String> {
        match self.resolver.get(code).await? {
            Resolution::Redirect(url) => Ok(url),
            Resolution::NotFound => Err(ShortenerError::NotFound(code.to_string())),
            Resolution::Expired => Err(ShortenerError::Expired(code.to_string())),
        }
    }

    async fn update(&self, id: i64, update: LinkUpdate) -> Result<LinkRecord> {
        let mut changes = LinkChanges::new();

        if let Some(url) = update.original_url {
            Self::validate_url(&url)?;
            changes = changes.original_url(url);
        }
        if let Some(expiration) = update.expiration {
            changes = changes.expires_at(expiration.expires_at(Timestamp::now())?);
        }
        if let Some(is_active) = update.is_active {
            changes = changes.active(is_active);
        }

        debug!(id, ?changes, "updating link");
        Ok(self.resolver.update(id, &changes).await?)
    }

    async fn link(&self, id: i64) -> Result<LinkRecord> {
        Ok(self.resolver.link(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;
    use linkzap_allocator::{AllocationError, Allocator, AllocatorSettings};
    use linkzap_cache::{MemoryCounter, MokaLinkCache};
    use linkzap_core::{base62, ExpirationPolicy, DEFAULT_COUNTER_KEY};
    use linkzap_storage::InMemoryLinkStore;
    use std::time::Duration;

    type TestService = ShortenerService<Allocator<MemoryCounter>, InMemoryLinkStore, MokaLinkCache>;

    async fn test_service() -> (TestService, Arc<MemoryCounter>) {
        let counter = Arc::new(MemoryCounter::new());
        counter.seed(DEFAULT_COUNTER_KEY, 1_000_000_000);

        let allocator = Allocator::from_shared(Arc::clone(&counter), AllocatorSettings::default());
        allocator.ensure_counter().await.unwrap();

        let resolver = Resolver::new(InMemoryLinkStore::new(), MokaLinkCache::new());
        (ShortenerService::new(allocator, resolver), counter)
    }

    #[tokio::test]
    async fn shorten_allocates_successive_codes() {
        let (service, _) = test_service().await;

        let first = service
            .shorten(ShortenParams::new("https://example.com/one"))
            .await
            .unwrap();
        let second = service
            .shorten(ShortenParams::new("https://example.com/two"))
            .await
            .unwrap();

        assert_eq!(first.short_code.as_str(), base62::encode(1_000_000_001, 7));
        assert_eq!(second.short_code.as_str(), "015ftgI");
        assert!(first.is_active);
        assert_eq!(first.expires_at, None);
    }

    #[tokio::test]
    async fn shortened_link_resolves() {
        let (service, _) = test_service().await;
        let record = service
            .shorten(ShortenParams::new("https://example.com"))
            .await
            .unwrap();

        let url = service.resolve(&record.short_code).await.unwrap();
        assert_eq!(url, "https://example.com");
    }

    #[tokio::test]
    async fn custom_alias_is_rejected_without_allocating() {
        let (service, counter) = test_service().await;

        let mut params = ShortenParams::new("https://example.com");
        params.custom_alias = Some(ShortCode::new("mine").unwrap());

        let err = service.shorten(params).await.unwrap_err();
        assert!(matches!(err, ShortenerError::CustomCodeUnsupported(c) if c == "mine"));
        assert_eq!(counter.value(DEFAULT_COUNTER_KEY), Some(1_000_000_000));
    }

    #[tokio::test]
    async fn invalid_urls_are_rejected() {
        let (service, counter) = test_service().await;

        for url in ["", "example.com", "ftp://example.com", "https://", "http:///path"] {
            let err = service.shorten(ShortenParams::new(url)).await.unwrap_err();
            assert!(matches!(err, ShortenerError::InvalidUrl(_)), "{url}: {err:?}");
            assert_eq!(err.status_code(), 400);
        }
        assert_eq!(counter.value(DEFAULT_COUNTER_KEY), Some(1_000_000_000));
    }

    #[tokio::test]
    async fn after_duration_sets_expiry() {
        let (service, _) = test_service().await;
        let before = Timestamp::now();

        let record = service
            .shorten(
                ShortenParams::new("https://example.com")
                    .with_expiration(ExpirationPolicy::AfterDuration(Duration::from_secs(3600))),
            )
            .await
            .unwrap();

        let expires_at = record.expires_at.unwrap();
        assert!(expires_at >= before + SignedDuration::from_hours(1));
        assert!(expires_at <= Timestamp::now() + SignedDuration::from_hours(1));
    }

    #[tokio::test]
    async fn past_expiry_is_accepted_then_reported_expired() {
        let (service, _) = test_service().await;
        let past = Timestamp::now() - SignedDuration::from_secs(30);

        let record = service
            .shorten(
                ShortenParams::new("https://example.com")
                    .with_expiration(ExpirationPolicy::AtTimestamp(past)),
            )
            .await
            .unwrap();

        let err = service.resolve(&record.short_code).await.unwrap_err();
        assert!(matches!(err, ShortenerError::Expired(_)));
        assert_eq!(err.status_code(), 410);
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let (service, _) = test_service().await;

        let err = service
            .resolve(&ShortCode::new("zzzzzzz").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(ref c) if c == "zzzzzzz"));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn deactivated_link_stops_resolving() {
        let (service, _) = test_service().await;
        let record = service
            .shorten(ShortenParams::new("https://example.com"))
            .await
            .unwrap();

        let update = LinkUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        service.update(record.id, update).await.unwrap();

        let err = service.resolve(&record.short_code).await.unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_never_clears_expiry() {
        let (service, _) = test_service().await;
        let past = Timestamp::now() - SignedDuration::from_secs(30);
        let record = service
            .shorten(
                ShortenParams::new("https://example.com")
                    .with_expiration(ExpirationPolicy::AtTimestamp(past)),
            )
            .await
            .unwrap();

        let update = LinkUpdate {
            original_url: Some("https://example.org".to_string()),
            expiration: Some(ExpirationPolicy::Never),
            ..Default::default()
        };
        let updated = service.update(record.id, update).await.unwrap();
        assert_eq!(updated.expires_at, None);

        assert_eq!(
            service.resolve(&record.short_code).await.unwrap(),
            "https://example.org"
        );
    }

    #[tokio::test]
    async fn update_validates_url() {
        let (service, _) = test_service().await;
        let record = service
            .shorten(ShortenParams::new("https://example.com"))
            .await
            .unwrap();

        let update = LinkUpdate {
            original_url: Some("not a url".to_string()),
            ..Default::default()
        };
        let err = service.update(record.id, update).await.unwrap_err();
        assert!(matches!(err, ShortenerError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn update_missing_link() {
        let (service, _) = test_service().await;

        let err = service
            .update(404, LinkUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(_)));
    }

    #[tokio::test]
    async fn link_returns_record_by_id() {
        let (service, _) = test_service().await;
        let record = service
            .shorten(ShortenParams::new("https://example.com"))
            .await
            .unwrap();

        assert_eq!(service.link(record.id).await.unwrap(), record);
        assert!(matches!(
            service.link(record.id + 100).await.unwrap_err(),
            ShortenerError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn shorten_fails_until_counter_is_ensured() {
        let allocator = Allocator::new(MemoryCounter::new(), AllocatorSettings::default());
        let resolver = Resolver::new(InMemoryLinkStore::new(), MokaLinkCache::new());
        let service = ShortenerService::new(allocator, resolver);

        let err = service
            .shorten(ShortenParams::new("https://example.com"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ShortenerError::Allocation(AllocationError::Uninitialized(_))
        ));
        assert_eq!(err.status_code(), 503);
    }
}
