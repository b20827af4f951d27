//! Configuration and construction of data stores.

use super::core::DataStore;
use crate::auth::{ApiKey, AuthenticationScheme};
use crate::cache::{CacheMode, CacheProvider, InMemoryCacheProvider};
use crate::error::{SdkError, SdkResult};
use crate::http::HttpClient;
use crate::serializer::{JsonSerializer, Serializer};
use std::sync::Arc;
use std::time::Duration;

/// Sliding expiration of identity map entries.
pub const DEFAULT_IDENTITY_MAP_EXPIRATION: Duration = Duration::from_secs(10);

/// Page size used when a query does not set one.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Largest page the server returns.
pub const MAX_PAGE_SIZE: usize = 100;

/// Tunables of a data store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataStoreConfig {
    /// Sliding expiration for identity map entries.
    pub identity_map_expiration: Duration,

    /// How cache regions are opened. The blocking surface requires [`CacheMode::Sync`].
    pub cache_mode: CacheMode,

    /// Collection page size when none is requested.
    pub default_page_size: usize,
}

impl Default for DataStoreConfig {
    fn default() -> Self {
        Self {
            identity_map_expiration: DEFAULT_IDENTITY_MAP_EXPIRATION,
            cache_mode: CacheMode::default(),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl DataStoreConfig {
    /// Check the configuration for values the data store cannot work with.
    pub fn validate(&self) -> SdkResult<()> {
        if self.identity_map_expiration.is_zero() {
            return Err(SdkError::configuration(
                "Identity map expiration must be greater than zero",
            ));
        }
        if self.default_page_size == 0 || self.default_page_size > MAX_PAGE_SIZE {
            return Err(SdkError::configuration(format!(
                "Default page size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.default_page_size
            )));
        }
        Ok(())
    }
}

/// Validate `base_url` and strip any trailing slash.
pub(crate) fn normalize_base_url(base_url: &str) -> SdkResult<String> {
    let parsed = url::Url::parse(base_url).map_err(|e| {
        SdkError::configuration(format!("Invalid base URL '{}': {}", base_url, e))
    })?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(SdkError::configuration(format!(
                "Base URL must use http or https, got '{}'",
                other
            )));
        }
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(SdkError::configuration(format!(
            "Base URL '{}' must not carry a query or fragment",
            base_url
        )));
    }
    Ok(base_url.trim_end_matches('/').to_string())
}

/// Builder for [`DataStore`] instances.
///
/// Only the base URL, the API key and the HTTP client are required (the
/// HTTP client defaults to the `reqwest` transport when the `reqwest-client`
/// feature is enabled). Everything else has a default: a JSON serializer,
/// an in-memory cache provider with one hour TTL and TTI, Basic
/// authentication and [`DataStoreConfig::default`].
#[derive(Default)]
pub struct DataStoreBuilder {
    base_url: Option<String>,
    api_key: Option<ApiKey>,
    authentication_scheme: AuthenticationScheme,
    http_client: Option<Arc<dyn HttpClient>>,
    serializer: Option<Arc<dyn Serializer>>,
    cache_provider: Option<Arc<dyn CacheProvider>>,
    config: DataStoreConfig,
}

impl DataStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root of the REST API, e.g. `https://api.example.com/v1`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key(mut self, api_key: ApiKey) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_authentication_scheme(mut self, scheme: AuthenticationScheme) -> Self {
        self.authentication_scheme = scheme;
        self
    }

    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    pub fn with_cache_provider(mut self, cache_provider: Arc<dyn CacheProvider>) -> Self {
        self.cache_provider = Some(cache_provider);
        self
    }

    pub fn with_config(mut self, config: DataStoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.config.cache_mode = cache_mode;
        self
    }

    pub fn with_identity_map_expiration(mut self, expiration: Duration) -> Self {
        self.config.identity_map_expiration = expiration;
        self
    }

    pub fn with_default_page_size(mut self, page_size: usize) -> Self {
        self.config.default_page_size = page_size;
        self
    }

    pub(crate) fn cache_mode(&self) -> CacheMode {
        self.config.cache_mode
    }

    /// Build the data store.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Configuration`] for a missing or malformed base
    /// URL, missing or blank credentials, a missing HTTP client, an invalid
    /// [`DataStoreConfig`], or a cache provider that does not support the
    /// configured cache mode.
    pub fn build(self) -> SdkResult<DataStore> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| SdkError::configuration("A base URL is required"))
            .and_then(normalize_base_url)?;

        let api_key = self
            .api_key
            .ok_or_else(|| SdkError::configuration("API key credentials are required"))?;
        api_key.validate()?;
        self.config.validate()?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => default_http_client()?,
        };
        let serializer = self
            .serializer
            .unwrap_or_else(|| Arc::new(JsonSerializer::new()));
        let cache_provider = self
            .cache_provider
            .unwrap_or_else(|| Arc::new(InMemoryCacheProvider::new()));

        DataStore::new(
            base_url,
            api_key,
            self.authentication_scheme.authenticator(),
            http_client,
            serializer,
            cache_provider,
            self.config,
        )
    }
}

#[cfg(feature = "reqwest-client")]
fn default_http_client() -> SdkResult<Arc<dyn HttpClient>> {
    let client: Arc<dyn HttpClient> = Arc::new(crate::http::ReqwestHttpClient::new()?);
    Ok(client)
}

#[cfg(not(feature = "reqwest-client"))]
fn default_http_client() -> SdkResult<Arc<dyn HttpClient>> {
    Err(SdkError::configuration(
        "An HTTP client is required; enable the `reqwest-client` feature or call with_http_client",
    ))
}
