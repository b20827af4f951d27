//! Client SDK core for a hosted identity-management REST API.
//!
//! Resources fetched through a [`DataStore`] are identity-mapped (one live
//! instance per href), backed by a pluggable two-tier cache, and sent through
//! a fixed request filter chain. Collections are queried with a typed builder
//! that compiles to the service's query-string dialect.
//!
//! # Core Components
//!
//! - [`Client`] - Application entry point and builder
//! - [`DataStore`] - Resource resolution, persistence and identity mapping
//! - [`cache::CacheProvider`] - Pluggable second-tier resource cache
//! - [`query::CollectionQuery`] - Typed collection query builder and executor
//! - [`blocking::DataStore`] - Synchronous façade
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use idm_client::{Client, auth::ApiKey};
//! use idm_client::resource::{Account, RequestContext};
//! # use idm_client::http::{HttpClient, HttpRequest, HttpResponse};
//! # use idm_client::error::SdkResult;
//! # use std::sync::Arc;
//! # struct Transport;
//! # #[async_trait::async_trait]
//! # impl HttpClient for Transport {
//! #     async fn execute(&self, _: HttpRequest) -> SdkResult<HttpResponse> { unimplemented!() }
//! # }
//!
//! # async fn example() -> SdkResult<()> {
//! let client = Client::builder()
//!     .with_base_url("https://api.example.com/v1")
//!     .with_api_key(ApiKey::new("id", "secret"))
//!     .with_http_client(Arc::new(Transport))
//!     .build()?;
//!
//! let context = RequestContext::new();
//! let enabled = client
//!     .query::<Account>("/directories/7/accounts")
//!     .where_eq("status", "ENABLED")
//!     .count(&context)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod blocking;
pub mod cache;
pub mod client;
pub mod data_store;
pub mod error;
pub mod filter;
pub mod http;
pub mod identity_map;
pub mod query;
pub mod resource;
pub mod serializer;

// Re-export commonly used types for convenience
pub use auth::{ApiKey, AuthenticationScheme};
pub use cache::{CacheMode, CacheProvider, InMemoryCacheProvider};
pub use client::{Client, ClientBuilder};
pub use data_store::{DataStore, DataStoreBuilder, DataStoreConfig};
pub use error::{QueryError, ResourceError, SdkError, SdkResult};
pub use query::{CollectionQuery, Predicate, field};
pub use resource::{RequestContext, Resource, ResourceStatus, ResponseOptions};
