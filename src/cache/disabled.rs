//! Cache provider that caches nothing.

use super::{AsyncCache, CacheProvider, SyncCache};
use crate::error::{SdkError, SdkResult};
use crate::serializer::PropertyMap;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Provider whose regions always miss and never store.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCacheProvider;

impl DisabledCacheProvider {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug)]
struct DisabledCache {
    name: String,
}

impl SyncCache for DisabledCache {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, _key: &str) -> Option<PropertyMap> {
        None
    }

    fn put(&self, _key: &str, _value: PropertyMap) -> Option<PropertyMap> {
        None
    }

    fn remove(&self, _key: &str) -> Option<PropertyMap> {
        None
    }

    fn clear(&self) {}
}

#[async_trait]
impl AsyncCache for DisabledCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(
        &self,
        _key: &str,
        cancellation: &CancellationToken,
    ) -> SdkResult<Option<PropertyMap>> {
        if cancellation.is_cancelled() {
            return Err(SdkError::Cancelled);
        }
        Ok(None)
    }

    async fn put(
        &self,
        _key: &str,
        _value: PropertyMap,
        cancellation: &CancellationToken,
    ) -> SdkResult<Option<PropertyMap>> {
        if cancellation.is_cancelled() {
            return Err(SdkError::Cancelled);
        }
        Ok(None)
    }

    async fn remove(
        &self,
        _key: &str,
        cancellation: &CancellationToken,
    ) -> SdkResult<Option<PropertyMap>> {
        if cancellation.is_cancelled() {
            return Err(SdkError::Cancelled);
        }
        Ok(None)
    }

    async fn clear(&self, cancellation: &CancellationToken) -> SdkResult<()> {
        if cancellation.is_cancelled() {
            return Err(SdkError::Cancelled);
        }
        Ok(())
    }
}

impl CacheProvider for DisabledCacheProvider {
    fn supports_sync(&self) -> bool {
        true
    }

    fn supports_async(&self) -> bool {
        true
    }

    fn sync_cache(&self, name: &str) -> Option<Arc<dyn SyncCache>> {
        let cache: Arc<dyn SyncCache> = Arc::new(DisabledCache {
            name: name.to_string(),
        });
        Some(cache)
    }

    fn async_cache(&self, name: &str) -> Option<Arc<dyn AsyncCache>> {
        let cache: Arc<dyn AsyncCache> = Arc::new(DisabledCache {
            name: name.to_string(),
        });
        Some(cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_disabled_cache_always_misses() {
        let cache = DisabledCacheProvider::new().sync_cache("accounts").unwrap();
        let value = json!({"href": "https://api.example.com/v1/accounts/1"})
            .as_object()
            .unwrap()
            .clone();

        assert!(cache.put("https://api.example.com/v1/accounts/1", value).is_none());
        assert!(cache.get("https://api.example.com/v1/accounts/1").is_none());
        assert!(cache.remove("https://api.example.com/v1/accounts/1").is_none());
    }
}
