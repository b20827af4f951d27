//! Stores successful results in the cache tier.
//!
//! A response body is split into one cache entry per materialized resource.
//! Embedded resources (expansions, collection items) are stored in the region
//! named by their own href and replaced by bare links in their parent's entry,
//! so each resource has exactly one cached snapshot. Collection bodies are
//! never cached as a whole.

use super::{FilterChain, RequestFilter, ResourceAction, ResourceRequest, ResourceResponse, proceed};
use crate::cache::{CacheResolver, region_for_href};
use crate::error::{SdkError, SdkResult};
use crate::resource::collection::ITEMS_PROPERTY;
use crate::resource::data::{HREF_PROPERTY, href_of, is_link};
use crate::serializer::PropertyMap;
use async_trait::async_trait;
use log::{debug, trace};
use serde_json::Value;

/// Caches response bodies and invalidates deleted resources.
#[derive(Debug, Clone)]
pub struct WriteCacheFilter {
    resolver: CacheResolver,
}

impl WriteCacheFilter {
    pub fn new(resolver: CacheResolver) -> Self {
        Self { resolver }
    }

    async fn store(&self, request: &ResourceRequest, body: &PropertyMap) -> SdkResult<()> {
        let token = &request.context.cancellation;
        let mut nested = Vec::new();

        if is_collection(body) {
            if let Some(Value::Array(items)) = body.get(ITEMS_PROPERTY) {
                for item in items {
                    collapse_value(item, &mut nested);
                }
            }
        } else if let Some(href) = href_of(body) {
            let root = collapse(body, &mut nested);
            let cache = self.resolver.cache_for_type(request.type_name)?;
            cache.put(&href, root, token).await?;
            trace!("[{}] Cached {} in '{}'", request.context.request_id, href, cache.name());
        }

        for properties in nested {
            let Some(href) = href_of(&properties) else {
                continue;
            };
            let Some(region) = region_for_href(&href) else {
                continue;
            };
            let cache = self.resolver.cache(&region)?;
            cache.put(&href, properties, token).await?;
            trace!("[{}] Cached nested {} in '{}'", request.context.request_id, href, region);
        }
        Ok(())
    }
}

#[async_trait]
impl RequestFilter for WriteCacheFilter {
    fn name(&self) -> &'static str {
        "write-cache"
    }

    async fn filter(
        &self,
        request: ResourceRequest,
        chain: Option<&FilterChain>,
    ) -> SdkResult<ResourceResponse> {
        let response = proceed(self.name(), request.clone(), chain).await?;
        if !response.is_success() || response.from_cache {
            return Ok(response);
        }
        if request.context.is_cancelled() {
            debug!(
                "[{}] Cancelled before caching {}",
                request.context.request_id, request.href
            );
            return Err(SdkError::Cancelled);
        }

        if request.action == ResourceAction::Delete {
            let cache = self.resolver.cache_for_type(request.type_name)?;
            cache
                .remove(&request.href, &request.context.cancellation)
                .await?;
            debug!(
                "[{}] Evicted {} from '{}'",
                request.context.request_id,
                request.href,
                cache.name()
            );
            return Ok(response);
        }

        self.store(&request, &response.body).await?;
        Ok(response)
    }
}

fn is_collection(properties: &PropertyMap) -> bool {
    matches!(properties.get(ITEMS_PROPERTY), Some(Value::Array(_)))
}

/// Copy of `properties` with embedded resources replaced by links.
fn collapse(properties: &PropertyMap, found: &mut Vec<PropertyMap>) -> PropertyMap {
    properties
        .iter()
        .map(|(name, value)| (name.clone(), collapse_value(value, found)))
        .collect()
}

fn collapse_value(value: &Value, found: &mut Vec<PropertyMap>) -> Value {
    match value {
        Value::Object(map) => match href_of(map) {
            Some(href) if !is_link(map) => {
                if is_collection(map) {
                    if let Some(Value::Array(items)) = map.get(ITEMS_PROPERTY) {
                        for item in items {
                            collapse_value(item, found);
                        }
                    }
                } else {
                    let entry = collapse(map, found);
                    found.push(entry);
                }
                link(href)
            }
            _ => Value::Object(collapse(map, found)),
        },
        Value::Array(items) => Value::Array(items.iter().map(|v| collapse_value(v, found)).collect()),
        other => other.clone(),
    }
}

fn link(href: String) -> Value {
    let mut map = PropertyMap::new();
    map.insert(HREF_PROPERTY.to_string(), Value::String(href));
    Value::Object(map)
}
