//! Resolution of cache regions for resource types.

use super::{AsyncCache, CacheMode, CacheProvider, SyncCache, region_for_type};
use crate::error::{SdkError, SdkResult};
use crate::serializer::PropertyMap;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A cache region opened in the resolver's execution mode.
#[derive(Clone)]
pub enum CacheHandle {
    Sync(Arc<dyn SyncCache>),
    Async(Arc<dyn AsyncCache>),
}

impl CacheHandle {
    pub fn name(&self) -> &str {
        match self {
            CacheHandle::Sync(cache) => cache.name(),
            CacheHandle::Async(cache) => cache.name(),
        }
    }

    pub async fn get(
        &self,
        key: &str,
        cancellation: &CancellationToken,
    ) -> SdkResult<Option<PropertyMap>> {
        match self {
            CacheHandle::Sync(cache) => {
                check(cancellation)?;
                Ok(cache.get(key))
            }
            CacheHandle::Async(cache) => cache.get(key, cancellation).await,
        }
    }

    pub async fn put(
        &self,
        key: &str,
        value: PropertyMap,
        cancellation: &CancellationToken,
    ) -> SdkResult<Option<PropertyMap>> {
        match self {
            CacheHandle::Sync(cache) => {
                check(cancellation)?;
                Ok(cache.put(key, value))
            }
            CacheHandle::Async(cache) => cache.put(key, value, cancellation).await,
        }
    }

    pub async fn remove(
        &self,
        key: &str,
        cancellation: &CancellationToken,
    ) -> SdkResult<Option<PropertyMap>> {
        match self {
            CacheHandle::Sync(cache) => {
                check(cancellation)?;
                Ok(cache.remove(key))
            }
            CacheHandle::Async(cache) => cache.remove(key, cancellation).await,
        }
    }
}

impl fmt::Debug for CacheHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheHandle::Sync(cache) => write!(f, "CacheHandle::Sync({})", cache.name()),
            CacheHandle::Async(cache) => write!(f, "CacheHandle::Async({})", cache.name()),
        }
    }
}

fn check(cancellation: &CancellationToken) -> SdkResult<()> {
    if cancellation.is_cancelled() {
        Err(SdkError::Cancelled)
    } else {
        Ok(())
    }
}

/// Maps resource types to cache regions of a provider.
#[derive(Clone)]
pub struct CacheResolver {
    provider: Arc<dyn CacheProvider>,
    mode: CacheMode,
}

impl CacheResolver {
    /// Bind `provider` in `mode`.
    ///
    /// # Errors
    /// Returns [`SdkError::Configuration`] if the provider does not support `mode`.
    pub fn new(provider: Arc<dyn CacheProvider>, mode: CacheMode) -> SdkResult<Self> {
        if !provider.supports(mode) {
            return Err(SdkError::configuration(format!(
                "Cache provider does not support {} execution",
                mode
            )));
        }
        Ok(Self { provider, mode })
    }

    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    /// Region for a resource type name.
    pub fn region_name(&self, type_name: &str) -> String {
        region_for_type(type_name)
    }

    /// Open the region `region` in the resolver's mode.
    pub fn cache(&self, region: &str) -> SdkResult<CacheHandle> {
        match self.mode {
            CacheMode::Sync => self.sync_cache(region).map(CacheHandle::Sync),
            CacheMode::Async => self.async_cache(region).map(CacheHandle::Async),
        }
    }

    /// Open the region used by resources of `type_name`.
    pub fn cache_for_type(&self, type_name: &str) -> SdkResult<CacheHandle> {
        self.cache(&self.region_name(type_name))
    }

    pub fn sync_cache(&self, region: &str) -> SdkResult<Arc<dyn SyncCache>> {
        self.provider.sync_cache(region).ok_or_else(|| {
            SdkError::configuration(format!(
                "Cache provider cannot open region '{}' for synchronous execution",
                region
            ))
        })
    }

    pub fn async_cache(&self, region: &str) -> SdkResult<Arc<dyn AsyncCache>> {
        self.provider.async_cache(region).ok_or_else(|| {
            SdkError::configuration(format!(
                "Cache provider cannot open region '{}' for asynchronous execution",
                region
            ))
        })
    }
}

impl fmt::Debug for CacheResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheResolver")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
