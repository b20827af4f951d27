//! In-memory cache provider.
//!
//! Regions are created lazily on first request and live as long as the
//! provider. Each region applies its own time-to-live (absolute, measured
//! from the write) and time-to-idle (sliding, measured from the last read)
//! policies; either may be absent, in which case entries stay until they are
//! removed or the region is cleared.
//!
//! Expired entries are dropped lazily on the next access to their key.

use super::{AsyncCache, CacheProvider, CacheStats, SyncCache};
use crate::error::{SdkError, SdkResult};
use crate::serializer::PropertyMap;
use async_trait::async_trait;
use log::trace;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Default absolute expiration of cached resources.
pub const DEFAULT_TIME_TO_LIVE: Duration = Duration::from_secs(60 * 60);

/// Default sliding expiration of cached resources.
pub const DEFAULT_TIME_TO_IDLE: Duration = Duration::from_secs(60 * 60);

#[derive(Debug)]
struct CacheEntry {
    value: PropertyMap,
    created: Instant,
    last_access: Instant,
}

/// A single in-memory cache region.
#[derive(Debug)]
pub struct InMemoryCache {
    name: String,
    time_to_live: Option<Duration>,
    time_to_idle: Option<Duration>,
    entries: Mutex<HashMap<String, CacheEntry>>,
    last_sweep: Mutex<Instant>,
    access_count: AtomicU64,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
    put_count: AtomicU64,
}

impl InMemoryCache {
    pub fn new(
        name: impl Into<String>,
        time_to_live: Option<Duration>,
        time_to_idle: Option<Duration>,
    ) -> Self {
        Self {
            name: name.into(),
            time_to_live,
            time_to_idle,
            entries: Mutex::new(HashMap::new()),
            last_sweep: Mutex::new(Instant::now()),
            access_count: AtomicU64::new(0),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
            put_count: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time_to_live(&self) -> Option<Duration> {
        self.time_to_live
    }

    pub fn time_to_idle(&self) -> Option<Duration> {
        self.time_to_idle
    }

    pub fn get(&self, key: &str) -> Option<PropertyMap> {
        self.access_count.fetch_add(1, Ordering::Relaxed);
        let mut entries = self.entries.lock();
        let now = Instant::now();

        let expired = entries
            .get(key)
            .is_some_and(|entry| self.is_expired(entry, now));
        if expired {
            trace!("Cache region '{}' evicted expired {}", self.name, key);
            entries.remove(key);
        }

        match entries.get_mut(key) {
            Some(entry) => {
                entry.last_access = now;
                self.hit_count.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            None => {
                self.miss_count.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn put(&self, key: &str, value: PropertyMap) -> Option<PropertyMap> {
        self.put_count.fetch_add(1, Ordering::Relaxed);
        let now = Instant::now();
        let mut entries = self.entries.lock();
        self.sweep(&mut entries, now);
        let previous = entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                created: now,
                last_access: now,
            },
        );
        previous
            .filter(|entry| !self.is_expired(entry, now))
            .map(|entry| entry.value)
    }

    pub fn remove(&self, key: &str) -> Option<PropertyMap> {
        let now = Instant::now();
        self.entries
            .lock()
            .remove(key)
            .filter(|entry| !self.is_expired(entry, now))
            .map(|entry| entry.value)
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            access_count: self.access_count.load(Ordering::Relaxed),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            put_count: self.put_count.load(Ordering::Relaxed),
            size: self.len(),
        }
    }

    /// Drop expired entries, at most once per the region's shortest expiration.
    fn sweep(&self, entries: &mut HashMap<String, CacheEntry>, now: Instant) {
        let interval = match (self.time_to_live, self.time_to_idle) {
            (Some(ttl), Some(tti)) => ttl.min(tti),
            (Some(window), None) | (None, Some(window)) => window,
            (None, None) => return,
        };
        let mut last_sweep = self.last_sweep.lock();
        if now.saturating_duration_since(*last_sweep) < interval {
            return;
        }
        *last_sweep = now;

        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        if entries.len() < before {
            trace!(
                "Cache region '{}' swept {} expired entries",
                self.name,
                before - entries.len()
            );
        }
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        let dead = self
            .time_to_live
            .is_some_and(|ttl| now.saturating_duration_since(entry.created) > ttl);
        let idle = self
            .time_to_idle
            .is_some_and(|tti| now.saturating_duration_since(entry.last_access) > tti);
        dead || idle
    }
}

impl SyncCache for InMemoryCache {
    fn name(&self) -> &str {
        InMemoryCache::name(self)
    }

    fn get(&self, key: &str) -> Option<PropertyMap> {
        InMemoryCache::get(self, key)
    }

    fn put(&self, key: &str, value: PropertyMap) -> Option<PropertyMap> {
        InMemoryCache::put(self, key, value)
    }

    fn remove(&self, key: &str) -> Option<PropertyMap> {
        InMemoryCache::remove(self, key)
    }

    fn clear(&self) {
        InMemoryCache::clear(self)
    }
}

fn ensure_not_cancelled(cancellation: &CancellationToken) -> SdkResult<()> {
    if cancellation.is_cancelled() {
        Err(SdkError::Cancelled)
    } else {
        Ok(())
    }
}

#[async_trait]
impl AsyncCache for InMemoryCache {
    fn name(&self) -> &str {
        InMemoryCache::name(self)
    }

    async fn get(
        &self,
        key: &str,
        cancellation: &CancellationToken,
    ) -> SdkResult<Option<PropertyMap>> {
        ensure_not_cancelled(cancellation)?;
        Ok(InMemoryCache::get(self, key))
    }

    async fn put(
        &self,
        key: &str,
        value: PropertyMap,
        cancellation: &CancellationToken,
    ) -> SdkResult<Option<PropertyMap>> {
        ensure_not_cancelled(cancellation)?;
        Ok(InMemoryCache::put(self, key, value))
    }

    async fn remove(
        &self,
        key: &str,
        cancellation: &CancellationToken,
    ) -> SdkResult<Option<PropertyMap>> {
        ensure_not_cancelled(cancellation)?;
        Ok(InMemoryCache::remove(self, key))
    }

    async fn clear(&self, cancellation: &CancellationToken) -> SdkResult<()> {
        ensure_not_cancelled(cancellation)?;
        InMemoryCache::clear(self);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RegionPolicy {
    time_to_live: Option<Duration>,
    time_to_idle: Option<Duration>,
}

/// Cache provider keeping every region in process memory.
#[derive(Debug)]
pub struct InMemoryCacheProvider {
    default_policy: RegionPolicy,
    region_policies: HashMap<String, RegionPolicy>,
    regions: Mutex<HashMap<String, Arc<InMemoryCache>>>,
}

impl InMemoryCacheProvider {
    /// A provider using [`DEFAULT_TIME_TO_LIVE`] and [`DEFAULT_TIME_TO_IDLE`].
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> InMemoryCacheProviderBuilder {
        InMemoryCacheProviderBuilder::new()
    }

    /// The region `name`, created on first use.
    pub fn region(&self, name: &str) -> Arc<InMemoryCache> {
        let mut regions = self.regions.lock();
        let region = regions.entry(name.to_string()).or_insert_with(|| {
            let policy = self
                .region_policies
                .get(name)
                .copied()
                .unwrap_or(self.default_policy);
            trace!("Creating cache region '{}' ({:?})", name, policy);
            Arc::new(InMemoryCache::new(
                name,
                policy.time_to_live,
                policy.time_to_idle,
            ))
        });
        Arc::clone(region)
    }

    /// Statistics per region created so far.
    pub fn stats(&self) -> HashMap<String, CacheStats> {
        self.regions
            .lock()
            .iter()
            .map(|(name, region)| (name.clone(), region.stats()))
            .collect()
    }

    pub fn clear(&self) {
        for region in self.regions.lock().values() {
            region.clear();
        }
    }
}

impl Default for InMemoryCacheProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheProvider for InMemoryCacheProvider {
    fn supports_sync(&self) -> bool {
        true
    }

    fn supports_async(&self) -> bool {
        true
    }

    fn sync_cache(&self, name: &str) -> Option<Arc<dyn SyncCache>> {
        let region: Arc<dyn SyncCache> = self.region(name);
        Some(region)
    }

    fn async_cache(&self, name: &str) -> Option<Arc<dyn AsyncCache>> {
        let region: Arc<dyn AsyncCache> = self.region(name);
        Some(region)
    }
}

/// Builder for [`InMemoryCacheProvider`].
#[derive(Debug, Clone)]
pub struct InMemoryCacheProviderBuilder {
    default_policy: RegionPolicy,
    region_policies: HashMap<String, RegionPolicy>,
}

impl InMemoryCacheProviderBuilder {
    pub fn new() -> Self {
        Self {
            default_policy: RegionPolicy {
                time_to_live: Some(DEFAULT_TIME_TO_LIVE),
                time_to_idle: Some(DEFAULT_TIME_TO_IDLE),
            },
            region_policies: HashMap::new(),
        }
    }

    pub fn default_time_to_live(mut self, ttl: Duration) -> Self {
        self.default_policy.time_to_live = Some(ttl);
        self
    }

    pub fn default_time_to_idle(mut self, tti: Duration) -> Self {
        self.default_policy.time_to_idle = Some(tti);
        self
    }

    /// Keep entries until removed unless a region overrides it.
    pub fn without_default_expiration(mut self) -> Self {
        self.default_policy = RegionPolicy::default();
        self
    }

    pub fn region_time_to_live(mut self, region: impl Into<String>, ttl: Duration) -> Self {
        self.region_policy(region).time_to_live = Some(ttl);
        self
    }

    pub fn region_time_to_idle(mut self, region: impl Into<String>, tti: Duration) -> Self {
        self.region_policy(region).time_to_idle = Some(tti);
        self
    }

    pub fn build(self) -> InMemoryCacheProvider {
        InMemoryCacheProvider {
            default_policy: self.default_policy,
            region_policies: self.region_policies,
            regions: Mutex::new(HashMap::new()),
        }
    }

    // Region overrides start from the defaults configured so far.
    fn region_policy(&mut self, region: impl Into<String>) -> &mut RegionPolicy {
        let default_policy = self.default_policy;
        self.region_policies
            .entry(region.into())
            .or_insert(default_policy)
    }
}

impl Default for InMemoryCacheProviderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
