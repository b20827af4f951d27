//! Shared test infrastructure: a scripted transport and client builders.

use async_trait::async_trait;
use idm_client::auth::ApiKey;
use idm_client::cache::{CacheMode, CacheProvider, InMemoryCacheProvider};
use idm_client::error::SdkResult;
use idm_client::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use idm_client::{Client, DataStore, DataStoreBuilder};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Once};
use std::time::Duration;

pub const BASE_URL: &str = "https://api.example.com/v1";

static INIT: Once = Once::new();

/// Route `log` output through env_logger once per test binary.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub fn url(path: &str) -> String {
    format!("{}{}", BASE_URL, path)
}

/// Transport answering from a route table keyed by method and path.
#[derive(Default)]
pub struct ScriptedServer {
    routes: Mutex<HashMap<(HttpMethod, String), (u16, Value)>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Mutex<Option<Duration>>,
}

impl ScriptedServer {
    pub fn new() -> Arc<Self> {
        init_logging();
        Arc::new(Self::default())
    }

    pub fn respond(&self, method: HttpMethod, path: &str, status: u16, body: Value) {
        self.routes
            .lock()
            .insert((method, url(path)), (status, body));
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests_to(&self, method: HttpMethod, path: &str) -> usize {
        let target = url(path);
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.url.split('?').next() == Some(target.as_str()))
            .count()
    }
}

#[async_trait]
impl HttpClient for ScriptedServer {
    async fn execute(&self, request: HttpRequest) -> SdkResult<HttpResponse> {
        self.requests.lock().push(request.clone());
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let path = request.url.split('?').next().unwrap_or_default().to_string();
        let route = self.routes.lock().get(&(request.method, path)).cloned();
        let (status, body) = route.unwrap_or_else(|| {
            (
                404,
                json!({"status": 404, "code": 404, "message": "The requested resource does not exist."}),
            )
        });

        let response = HttpResponse::new(status, if status < 300 { "OK" } else { "Error" });
        Ok(match body {
            Value::Null => response,
            body => response.with_body(body.to_string()),
        })
    }
}

pub fn builder(server: Arc<ScriptedServer>) -> DataStoreBuilder {
    DataStoreBuilder::new()
        .with_base_url(BASE_URL)
        .with_api_key(ApiKey::new("id", "secret"))
        .with_http_client(server)
}

pub fn store(server: Arc<ScriptedServer>) -> DataStore {
    store_with_cache(server, Arc::new(InMemoryCacheProvider::new()))
}

pub fn store_with_cache(server: Arc<ScriptedServer>, cache: Arc<dyn CacheProvider>) -> DataStore {
    builder(server)
        .with_cache_provider(cache)
        .with_cache_mode(CacheMode::Async)
        .build()
        .expect("Failed to build data store")
}

pub fn client(server: Arc<ScriptedServer>) -> Client {
    Client::builder()
        .with_base_url(BASE_URL)
        .with_api_key(ApiKey::new("id", "secret"))
        .with_http_client(server)
        .build()
        .expect("Failed to build client")
}

pub fn account_json(id: &str) -> Value {
    json!({
        "href": url(&format!("/accounts/{}", id)),
        "username": format!("user{}", id),
        "email": format!("user{}@example.com", id),
        "givenName": "User",
        "surname": id,
        "status": "ENABLED",
        "directory": {"href": url("/directories/7")}
    })
}

/// A collection page body holding `count` accounts numbered from `first`.
pub fn account_page(path: &str, size: u64, offset: usize, limit: usize, first: usize, count: usize) -> Value {
    let items: Vec<Value> = (first..first + count)
        .map(|i| account_json(&i.to_string()))
        .collect();
    json!({
        "href": url(path),
        "offset": offset,
        "limit": limit,
        "size": size,
        "items": items
    })
}
