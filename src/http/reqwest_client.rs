//! [`HttpClient`] implementation backed by `reqwest`.
//!
//! Only compiled with the `reqwest-client` feature.

use super::{HttpClient, HttpHeaders, HttpMethod, HttpRequest, HttpResponse};
use crate::error::{SdkError, SdkResult};
use async_trait::async_trait;
use log::debug;
use std::time::Duration;

/// Default time allowed for a single request, connection included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Network transport using a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Create a client with [`DEFAULT_TIMEOUT`].
    pub fn new() -> SdkResult<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> SdkResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SdkError::configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an already configured `reqwest::Client`.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> SdkResult<HttpResponse> {
        let mut builder = self
            .client
            .request(Self::method(request.method), request.url.as_str());
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("Request to {} timed out", request.url)
            } else {
                format!("Request to {} failed", request.url)
            };
            SdkError::transport_error(message, e)
        })?;

        let status = response.status();
        let mut headers = HttpHeaders::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str(), value);
            }
        }
        let body = response
            .text()
            .await
            .map_err(|e| SdkError::transport_error("Failed to read response body", e))?;

        debug!("{} {} -> {}", request.method, request.url, status.as_u16());

        Ok(HttpResponse {
            status: status.as_u16(),
            reason_phrase: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: if body.is_empty() { None } else { Some(body) },
        })
    }
}
