//! Blocking data store.
//!
//! A synchronous façade over the asynchronous [`crate::DataStore`]. Each call
//! drives the async operation to completion on a private current-thread
//! runtime. The wrapped store opens cache regions in [`CacheMode::Sync`], so
//! the cache provider must support synchronous access.
//!
//! Calls fail with a configuration error when made from inside an async
//! runtime; use the async store there instead.
//!
//! ```rust,no_run
//! use idm_client::auth::ApiKey;
//! use idm_client::blocking;
//! use idm_client::data_store::DataStoreBuilder;
//! use idm_client::resource::Account;
//! # use idm_client::http::{HttpClient, HttpRequest, HttpResponse};
//! # use idm_client::error::SdkResult;
//! # use std::sync::Arc;
//! # struct Transport;
//! # #[async_trait::async_trait]
//! # impl HttpClient for Transport {
//! #     async fn execute(&self, _: HttpRequest) -> SdkResult<HttpResponse> { unimplemented!() }
//! # }
//!
//! # fn example() -> SdkResult<()> {
//! let store = blocking::DataStore::new(
//!     DataStoreBuilder::new()
//!         .with_base_url("https://api.example.com/v1")
//!         .with_api_key(ApiKey::new("id", "secret"))
//!         .with_http_client(Arc::new(Transport)),
//! )?;
//!
//! let account: Account = store.get_resource("/accounts/abc")?;
//! # Ok(())
//! # }
//! ```

use crate::cache::CacheMode;
use crate::data_store::DataStoreBuilder;
use crate::error::{SdkError, SdkResult};
use crate::query::CollectionQuery;
use crate::resource::{CollectionPage, RequestContext, Resource, ResponseOptions};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

/// Synchronous data store.
#[derive(Clone)]
pub struct DataStore {
    inner: crate::DataStore,
    runtime: Arc<Runtime>,
}

impl DataStore {
    /// Build a blocking store from `builder`, forcing the synchronous cache mode.
    ///
    /// # Errors
    /// Returns [`SdkError::Configuration`] when the cache provider has no
    /// synchronous regions, the runtime cannot start, or `builder` is
    /// otherwise invalid.
    pub fn new(builder: DataStoreBuilder) -> SdkResult<Self> {
        let inner = builder.with_cache_mode(CacheMode::Sync).build()?;
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SdkError::configuration(format!("Failed to start runtime: {}", e)))?;
        Ok(Self {
            inner,
            runtime: Arc::new(runtime),
        })
    }

    /// The async store driven by this façade.
    pub fn as_async(&self) -> &crate::DataStore {
        &self.inner
    }

    /// Run `future` to completion.
    pub fn block_on<F, T>(&self, future: F) -> SdkResult<T>
    where
        F: Future<Output = SdkResult<T>>,
    {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(SdkError::configuration(
                "The blocking data store cannot be used from within an async runtime",
            ));
        }
        self.runtime.block_on(future)
    }

    pub fn instantiate<T: Resource>(&self) -> T {
        self.inner.instantiate()
    }

    pub fn get_resource<T: Resource>(&self, href: &str) -> SdkResult<T> {
        let context = RequestContext::new();
        self.block_on(self.inner.get_resource(href, &context))
    }

    pub fn get_resource_with_options<T: Resource>(
        &self,
        href: &str,
        options: &ResponseOptions,
    ) -> SdkResult<T> {
        let context = RequestContext::new();
        self.block_on(self.inner.get_resource_with_options(href, options, &context))
    }

    pub fn get_linked<T: Resource, R: Resource>(&self, resource: &R, property: &str) -> SdkResult<Option<T>> {
        let context = RequestContext::new();
        self.block_on(self.inner.get_linked(resource, property, &context))
    }

    pub fn get_collection<T: Resource>(
        &self,
        href: &str,
        params: Vec<(String, String)>,
    ) -> SdkResult<CollectionPage<T>> {
        let context = RequestContext::new();
        self.block_on(self.inner.get_collection(href, params, &context))
    }

    pub fn create<T: Resource>(&self, parent_href: &str, resource: &T) -> SdkResult<T> {
        let context = RequestContext::new();
        self.block_on(self.inner.create(parent_href, resource, &context))
    }

    pub fn save<T: Resource>(&self, resource: &T) -> SdkResult<T> {
        let context = RequestContext::new();
        self.block_on(self.inner.save(resource, &context))
    }

    pub fn delete<T: Resource>(&self, resource: &T) -> SdkResult<bool> {
        let context = RequestContext::new();
        self.block_on(self.inner.delete(resource, &context))
    }

    /// Start a query; run it with [`to_list`](Self::to_list) or the other
    /// terminal helpers below.
    pub fn query<T: Resource>(&self, href: &str) -> CollectionQuery<T> {
        self.inner.query(href)
    }

    pub fn to_list<T: Resource>(&self, query: &CollectionQuery<T>) -> SdkResult<Vec<T>> {
        let context = RequestContext::new();
        self.block_on(query.to_list(&context))
    }

    pub fn count<T: Resource>(&self, query: &CollectionQuery<T>) -> SdkResult<usize> {
        let context = RequestContext::new();
        self.block_on(query.count(&context))
    }

    pub fn any<T: Resource>(&self, query: &CollectionQuery<T>) -> SdkResult<bool> {
        let context = RequestContext::new();
        self.block_on(query.any(&context))
    }

    pub fn first<T: Resource>(&self, query: &CollectionQuery<T>) -> SdkResult<T> {
        let context = RequestContext::new();
        self.block_on(query.first(&context))
    }

    pub fn first_or_default<T: Resource>(&self, query: &CollectionQuery<T>) -> SdkResult<Option<T>> {
        let context = RequestContext::new();
        self.block_on(query.first_or_default(&context))
    }

    pub fn single<T: Resource>(&self, query: &CollectionQuery<T>) -> SdkResult<T> {
        let context = RequestContext::new();
        self.block_on(query.single(&context))
    }

    pub fn dispose(&self) {
        self.inner.dispose();
    }
}

impl fmt::Debug for DataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("blocking::DataStore")
            .field("inner", &self.inner)
            .finish()
    }
}
