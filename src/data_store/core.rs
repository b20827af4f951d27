//! Core data store structure, construction and disposal.

use super::builder::{DataStoreBuilder, DataStoreConfig};
use crate::auth::{ApiKey, RequestAuthenticator};
use crate::cache::{CacheMode, CacheProvider, CacheResolver};
use crate::error::{SdkError, SdkResult};
use crate::filter::{
    ErrorTranslationFilter, ExecuteRequestFilter, FilterChain, ReadCacheFilter, RequestFilter,
    ResourceRequest, ResourceResponse, WriteCacheFilter,
};
use crate::http::HttpClient;
use crate::identity_map::IdentityMap;
use crate::resource::data::href_of;
use crate::resource::{ResourceData, ResourceFactory};
use crate::serializer::{PropertyMap, Serializer};
use log::{debug, info};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Resolves, persists and deletes resources.
///
/// Cheap to clone; clones share the identity map, the cache provider and the
/// filter chain. Safe to use from many tasks at once.
#[derive(Clone)]
pub struct DataStore {
    pub(super) inner: Arc<DataStoreInner>,
}

pub(super) struct DataStoreInner {
    pub(super) base_url: String,
    pub(super) identity_map: IdentityMap<ResourceData>,
    pub(super) cache_resolver: CacheResolver,
    pub(super) cache_provider: Arc<dyn CacheProvider>,
    pub(super) factory: ResourceFactory,
    pub(super) chain: FilterChain,
    pub(super) config: DataStoreConfig,
    pub(super) disposed: AtomicBool,
}

impl DataStore {
    /// Start configuring a data store.
    pub fn builder() -> DataStoreBuilder {
        DataStoreBuilder::new()
    }

    /// Assemble a data store from already validated parts.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Configuration`] if `cache_provider` does not
    /// support `config.cache_mode`.
    pub(super) fn new(
        base_url: String,
        api_key: ApiKey,
        authenticator: Arc<dyn RequestAuthenticator>,
        http_client: Arc<dyn HttpClient>,
        serializer: Arc<dyn Serializer>,
        cache_provider: Arc<dyn CacheProvider>,
        config: DataStoreConfig,
    ) -> SdkResult<Self> {
        let cache_resolver = CacheResolver::new(Arc::clone(&cache_provider), config.cache_mode)?;

        let filters: Vec<Arc<dyn RequestFilter>> = vec![
            Arc::new(ReadCacheFilter::new(cache_resolver.clone())),
            Arc::new(ErrorTranslationFilter::new()),
            Arc::new(WriteCacheFilter::new(cache_resolver.clone())),
            Arc::new(ExecuteRequestFilter::new(
                http_client,
                authenticator,
                api_key,
                serializer,
            )),
        ];
        let chain = FilterChain::new(filters)?;

        info!(
            "Data store for {} ready ({} cache, identity map expiration {:?})",
            base_url, config.cache_mode, config.identity_map_expiration
        );

        Ok(Self {
            inner: Arc::new(DataStoreInner {
                base_url,
                identity_map: IdentityMap::new(config.identity_map_expiration),
                cache_resolver,
                cache_provider,
                factory: ResourceFactory::new(),
                chain,
                config,
                disposed: AtomicBool::new(false),
            }),
        })
    }

    /// Root of the REST API, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn config(&self) -> &DataStoreConfig {
        &self.inner.config
    }

    pub fn cache_mode(&self) -> CacheMode {
        self.inner.config.cache_mode
    }

    /// The provider backing the cache tier.
    pub fn cache_provider(&self) -> &Arc<dyn CacheProvider> {
        &self.inner.cache_provider
    }

    /// Number of cells materialized over the lifetime of the identity map.
    pub fn identity_map_items_added(&self) -> u64 {
        self.inner.identity_map.lifetime_items_added()
    }

    /// Release the identity map. Every later operation fails with
    /// [`SdkError::Disposed`]. Disposing twice is a no-op.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.identity_map.dispose();
        info!("Data store for {} disposed", self.inner.base_url);
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    pub(super) fn ensure_live(&self) -> SdkResult<()> {
        if self.is_disposed() {
            Err(SdkError::Disposed {
                component: "data store",
            })
        } else {
            Ok(())
        }
    }

    /// Turn a relative href (`/accounts/1`) into an absolute one.
    pub fn qualify(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if href.starts_with('/') {
            format!("{}{}", self.inner.base_url, href)
        } else {
            format!("{}/{}", self.inner.base_url, href)
        }
    }

    pub(super) async fn send(&self, request: ResourceRequest) -> SdkResult<ResourceResponse> {
        self.ensure_live()?;
        request.context.check_cancelled()?;
        self.inner.chain.execute(request).await
    }

    /// Route freshly received properties through the identity map.
    ///
    /// The first cell stored under the href wins. A live cell without local
    /// changes is refreshed wholesale with the new state; a dirty one keeps
    /// its pending changes.
    pub(super) fn materialize(
        &self,
        properties: PropertyMap,
        fallback_href: Option<&str>,
        store_infinitely: bool,
    ) -> SdkResult<ResourceData> {
        let Some(href) = href_of(&properties).or_else(|| fallback_href.map(str::to_string))
        else {
            return Ok(ResourceData::from_properties(properties));
        };

        let fresh = ResourceData::from_properties(properties.clone());
        let data = self
            .inner
            .identity_map
            .get_or_add(&href, || fresh.clone(), store_infinitely)?;

        if !data.ptr_eq(&fresh) {
            if data.is_dirty() {
                debug!("Keeping local changes of {} over server state", href);
            } else {
                data.refresh(properties);
            }
        }
        Ok(data)
    }

    /// Make `data` the identity map's cell for its href, or return the cell
    /// that already holds that role after refreshing it from `data`.
    pub(super) fn adopt(&self, data: &ResourceData, store_infinitely: bool) -> SdkResult<ResourceData> {
        let Some(href) = data.href() else {
            return Ok(data.clone());
        };
        let canonical = self
            .inner
            .identity_map
            .get_or_add(&href, || data.clone(), store_infinitely)?;
        if !canonical.ptr_eq(data) {
            canonical.refresh(data.properties());
        }
        Ok(canonical)
    }
}

impl fmt::Debug for DataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStore")
            .field("base_url", &self.inner.base_url)
            .field("config", &self.inner.config)
            .field("chain", &self.inner.chain)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
