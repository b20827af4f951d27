//! Two-tier resource caching.
//!
//! The first tier is the in-process [`IdentityMap`](crate::identity_map::IdentityMap)
//! of live resource cells. This module provides the second tier: named cache
//! regions mapping an href to a snapshot of the resource's property map.
//!
//! # Architecture
//!
//! - [`CacheProvider`] hands out named regions and declares which execution
//!   modes (synchronous, asynchronous) it supports.
//! - [`SyncCache`] and [`AsyncCache`] are the region contracts for each mode.
//! - [`CacheResolver`] maps a resource type to its region and fails fast when
//!   the provider cannot serve the mode the data store runs in.
//!
//! Cached values are snapshots: every read returns a fresh copy, so mutating
//! a returned map never affects what the cache holds.
//!
//! # Example Usage
//!
//! ```rust
//! use idm_client::cache::{CacheProvider, InMemoryCacheProvider};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! let provider = InMemoryCacheProvider::builder()
//!     .default_time_to_live(Duration::from_secs(300))
//!     .region_time_to_idle("accounts", Duration::from_secs(60))
//!     .build();
//!
//! let accounts = provider.sync_cache("accounts").unwrap();
//! let href = "https://api.example.com/v1/accounts/1";
//! accounts.put(href, json!({"href": href}).as_object().unwrap().clone());
//!
//! assert!(accounts.get(href).is_some());
//! ```

pub mod disabled;
pub mod in_memory;
pub mod region;
pub mod resolver;

pub use disabled::DisabledCacheProvider;
pub use in_memory::{InMemoryCache, InMemoryCacheProvider, InMemoryCacheProviderBuilder};
pub use region::{region_for_href, region_for_type};
pub use resolver::{CacheHandle, CacheResolver};

use crate::error::SdkResult;
use crate::serializer::PropertyMap;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Execution mode a cache region is accessed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CacheMode {
    /// Blocking calls from the synchronous surface.
    Sync,
    /// Awaitable, cancelable calls from the asynchronous surface.
    #[default]
    Async,
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheMode::Sync => f.write_str("synchronous"),
            CacheMode::Async => f.write_str("asynchronous"),
        }
    }
}

/// A named cache region accessed synchronously.
pub trait SyncCache: Send + Sync {
    fn name(&self) -> &str;

    /// A copy of the live value stored under `key`.
    fn get(&self, key: &str) -> Option<PropertyMap>;

    /// Store `value`, returning the live value it replaced.
    fn put(&self, key: &str, value: PropertyMap) -> Option<PropertyMap>;

    /// Delete `key`, returning the live value it held.
    fn remove(&self, key: &str) -> Option<PropertyMap>;

    fn clear(&self);
}

/// A named cache region accessed asynchronously.
///
/// Every operation observes `cancellation` before touching the region; a
/// cancelled call has no effect.
#[async_trait]
pub trait AsyncCache: Send + Sync {
    fn name(&self) -> &str;

    async fn get(
        &self,
        key: &str,
        cancellation: &CancellationToken,
    ) -> SdkResult<Option<PropertyMap>>;

    async fn put(
        &self,
        key: &str,
        value: PropertyMap,
        cancellation: &CancellationToken,
    ) -> SdkResult<Option<PropertyMap>>;

    async fn remove(
        &self,
        key: &str,
        cancellation: &CancellationToken,
    ) -> SdkResult<Option<PropertyMap>>;

    async fn clear(&self, cancellation: &CancellationToken) -> SdkResult<()>;
}

/// Factory for named cache regions.
pub trait CacheProvider: Send + Sync {
    fn supports_sync(&self) -> bool;

    fn supports_async(&self) -> bool;

    fn supports(&self, mode: CacheMode) -> bool {
        match mode {
            CacheMode::Sync => self.supports_sync(),
            CacheMode::Async => self.supports_async(),
        }
    }

    /// The synchronous region `name`, or `None` if sync access is unsupported.
    fn sync_cache(&self, name: &str) -> Option<Arc<dyn SyncCache>>;

    /// The asynchronous region `name`, or `None` if async access is unsupported.
    fn async_cache(&self, name: &str) -> Option<Arc<dyn AsyncCache>>;
}

/// Point-in-time counters of one cache region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub access_count: u64,
    pub hit_count: u64,
    pub miss_count: u64,
    pub put_count: u64,
    pub size: usize,
}

impl CacheStats {
    /// Hits over accesses, or 0 when nothing was accessed yet.
    pub fn hit_ratio(&self) -> f64 {
        if self.access_count == 0 {
            0.0
        } else {
            self.hit_count as f64 / self.access_count as f64
        }
    }
}
