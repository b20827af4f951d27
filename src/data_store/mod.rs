//! The data store: resolution of resources through the identity map, the
//! cache tier and the network.
//!
//! # Module Organization
//!
//! * [`builder`] - `DataStoreConfig` and the `DataStoreBuilder`
//! * [`core`] - The `DataStore` struct, construction and disposal
//! * [`operations`] - Resource operations (get, create, save, delete, collections)
//!
//! # Resolution Order
//!
//! A read for an href consults, in order:
//!
//! 1. the identity map, which returns the live cell if one exists;
//! 2. the cache region of the requested type (inside the filter chain);
//! 3. the network, whose result populates both tiers.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use idm_client::data_store::DataStoreBuilder;
//! use idm_client::auth::ApiKey;
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
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = DataStoreBuilder::new()
//!     .with_base_url("https://api.example.com/v1")
//!     .with_api_key(ApiKey::new("id", "secret"))
//!     .with_http_client(Arc::new(Transport))
//!     .build()?;
//!
//! let context = RequestContext::new();
//! let account: Account = store.get_resource("/accounts/abc", &context).await?;
//! println!("{:?}", account.email());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod core;
pub mod operations;


pub use builder::{DataStoreBuilder, DataStoreConfig};
pub use core::DataStore;
