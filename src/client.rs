//! Client façade over the data store.

use crate::auth::{ApiKey, AuthenticationScheme};
use crate::cache::{CacheProvider, InMemoryCacheProvider};
use crate::data_store::{DataStore, DataStoreBuilder, DataStoreConfig};
use crate::error::SdkResult;
use crate::http::HttpClient;
use crate::query::CollectionQuery;
use crate::resource::{RequestContext, Resource, ResponseOptions, Tenant};
use crate::serializer::Serializer;
use log::debug;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Entry point for applications.
///
/// ```rust,no_run
/// use idm_client::Client;
/// use idm_client::auth::ApiKey;
/// use idm_client::resource::RequestContext;
/// # use idm_client::http::{HttpClient, HttpRequest, HttpResponse};
/// # use idm_client::error::SdkResult;
/// # use std::sync::Arc;
/// # struct Transport;
/// # #[async_trait::async_trait]
/// # impl HttpClient for Transport {
/// #     async fn execute(&self, _: HttpRequest) -> SdkResult<HttpResponse> { unimplemented!() }
/// # }
///
/// # async fn example() -> SdkResult<()> {
/// let client = Client::builder()
///     .with_base_url("https://api.example.com/v1")
///     .with_api_key(ApiKey::new("id", "secret"))
///     .with_http_client(Arc::new(Transport))
///     .build()?;
///
/// let tenant = client.current_tenant(&RequestContext::new()).await?;
/// println!("{:?}", tenant.name());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    data_store: DataStore,
    tenant_href: Arc<OnceCell<String>>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn data_store(&self) -> &DataStore {
        &self.data_store
    }

    /// The tenant owning the API key. Tenants stay in the identity map for
    /// the client's lifetime, so only the first call reaches the network.
    pub async fn current_tenant(&self, context: &RequestContext) -> SdkResult<Tenant> {
        if let Some(href) = self.tenant_href.get() {
            return self.data_store.get_resource(href, context).await;
        }

        let tenant: Tenant = self
            .data_store
            .get_resource("/tenants/current", context)
            .await?;
        if let Some(href) = tenant.href() {
            debug!("[{}] Current tenant is {}", context.request_id, href);
            // A concurrent caller may have set it first; both resolved the same tenant.
            let _ = self.tenant_href.set(href);
        }
        Ok(tenant)
    }

    pub async fn get_resource<T: Resource>(&self, href: &str, context: &RequestContext) -> SdkResult<T> {
        self.data_store.get_resource(href, context).await
    }

    pub async fn get_resource_with_options<T: Resource>(
        &self,
        href: &str,
        options: &ResponseOptions,
        context: &RequestContext,
    ) -> SdkResult<T> {
        self.data_store
            .get_resource_with_options(href, options, context)
            .await
    }

    pub fn instantiate<T: Resource>(&self) -> T {
        self.data_store.instantiate()
    }

    pub fn query<T: Resource>(&self, href: &str) -> CollectionQuery<T> {
        self.data_store.query(href)
    }

    /// Release the data store. See [`DataStore::dispose`].
    pub fn dispose(&self) {
        self.data_store.dispose();
    }
}

/// Builder for [`Client`] instances. Thin layer over [`DataStoreBuilder`].
#[derive(Default)]
pub struct ClientBuilder {
    inner: DataStoreBuilder,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.inner = self.inner.with_base_url(base_url);
        self
    }

    pub fn with_api_key(mut self, api_key: ApiKey) -> Self {
        self.inner = self.inner.with_api_key(api_key);
        self
    }

    pub fn with_authentication_scheme(mut self, scheme: AuthenticationScheme) -> Self {
        self.inner = self.inner.with_authentication_scheme(scheme);
        self
    }

    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.inner = self.inner.with_http_client(http_client);
        self
    }

    pub fn with_serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.inner = self.inner.with_serializer(serializer);
        self
    }

    pub fn with_cache_provider(mut self, cache_provider: Arc<dyn CacheProvider>) -> Self {
        self.inner = self.inner.with_cache_provider(cache_provider);
        self
    }

    /// Turn the cache tier off entirely.
    pub fn without_caching(self) -> Self {
        self.with_cache_provider(Arc::new(crate::cache::DisabledCacheProvider::new()))
    }

    /// Use an in-memory cache with the given provider settings.
    pub fn with_in_memory_cache(self, provider: InMemoryCacheProvider) -> Self {
        self.with_cache_provider(Arc::new(provider))
    }

    pub fn with_config(mut self, config: DataStoreConfig) -> Self {
        self.inner = self.inner.with_config(config);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// Every configuration problem [`DataStoreBuilder::build`] reports.
    pub fn build(self) -> SdkResult<Client> {
        Ok(Client {
            data_store: self.inner.build()?,
            tenant_href: Arc::new(OnceCell::new()),
        })
    }

    /// Build a blocking client. Forces the synchronous cache mode.
    pub fn build_blocking(self) -> SdkResult<crate::blocking::DataStore> {
        crate::blocking::DataStore::new(self.inner)
    }
}
