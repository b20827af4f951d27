//! Serves single-resource reads from the cache tier.

use super::{FilterChain, RequestFilter, ResourceAction, ResourceRequest, ResourceResponse, proceed};
use crate::cache::CacheResolver;
use crate::error::SdkResult;
use async_trait::async_trait;
use log::{debug, trace};

/// Answers `Get` requests from the cache region of the requested type.
///
/// Requests carrying a query string (collection queries, expansions) always
/// go to the server since the cached snapshot cannot satisfy them.
#[derive(Debug, Clone)]
pub struct ReadCacheFilter {
    resolver: CacheResolver,
}

impl ReadCacheFilter {
    pub fn new(resolver: CacheResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl RequestFilter for ReadCacheFilter {
    fn name(&self) -> &'static str {
        "read-cache"
    }

    async fn filter(
        &self,
        request: ResourceRequest,
        chain: Option<&FilterChain>,
    ) -> SdkResult<ResourceResponse> {
        if request.action != ResourceAction::Get || request.has_query() {
            return proceed(self.name(), request, chain).await;
        }

        let cache = self.resolver.cache_for_type(request.type_name)?;
        if let Some(properties) = cache
            .get(&request.href, &request.context.cancellation)
            .await?
        {
            debug!(
                "[{}] Cache hit for {} in region '{}'",
                request.context.request_id,
                request.href,
                cache.name()
            );
            return Ok(ResourceResponse::cached(properties));
        }

        trace!(
            "[{}] Cache miss for {} in region '{}'",
            request.context.request_id,
            request.href,
            cache.name()
        );
        proceed(self.name(), request, chain).await
    }
}
