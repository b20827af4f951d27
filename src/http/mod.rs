//! HTTP transport abstraction.
//!
//! The data store never talks to the network directly. It hands a fully
//! built [`HttpRequest`] to an [`HttpClient`] implementation supplied at
//! construction time and receives an [`HttpResponse`] back. Any response,
//! regardless of status, is a successful transport outcome; only failures
//! to obtain a response at all (timeouts, refused connections) are reported
//! as [`SdkError::Transport`](crate::error::SdkError::Transport).
//!
//! # Example Implementation
//!
//! ```rust
//! use async_trait::async_trait;
//! use idm_client::error::SdkResult;
//! use idm_client::http::{HttpClient, HttpRequest, HttpResponse};
//!
//! struct AlwaysNotFound;
//!
//! #[async_trait]
//! impl HttpClient for AlwaysNotFound {
//!     async fn execute(&self, _request: HttpRequest) -> SdkResult<HttpResponse> {
//!         Ok(HttpResponse::new(404, "Not Found"))
//!     }
//! }
//! ```

#[cfg(feature = "reqwest-client")]
pub mod reqwest_client;

#[cfg(feature = "reqwest-client")]
pub use reqwest_client::ReqwestHttpClient;

use crate::error::SdkResult;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;

/// HTTP methods used by the data store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive header collection.
///
/// Header names are stored lower-cased; iteration order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    entries: BTreeMap<String, String>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing any previous value.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An outgoing HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL including any query string.
    pub url: String,
    pub headers: HttpHeaders,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HttpHeaders::new(),
            body: None,
        }
    }

    /// Attach a JSON body and the matching content type.
    pub fn with_json_body(mut self, body: impl Into<String>) -> Self {
        self.headers.insert("Content-Type", "application/json");
        self.body = Some(body.into());
        self
    }
}

/// A response received from the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason_phrase: String,
    pub headers: HttpHeaders,
    pub body: Option<String>,
}

impl HttpResponse {
    pub fn new(status: u16, reason_phrase: impl Into<String>) -> Self {
        Self {
            status,
            reason_phrase: reason_phrase.into(),
            headers: HttpHeaders::new(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the body is absent or blank.
    pub fn has_body(&self) -> bool {
        self.body.as_deref().is_some_and(|b| !b.trim().is_empty())
    }
}

/// Executes requests against the network.
///
/// Implementations must be cheap to share; the data store holds a single
/// instance behind an `Arc` for its whole lifetime. Dropping the returned
/// future must abort the in-flight request, which is how cancellation
/// reaches the transport.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send the request and return whatever response the server produced.
    ///
    /// # Errors
    /// Only transport failures are errors; non-2xx responses are returned
    /// as `Ok` and translated further up the filter chain.
    async fn execute(&self, request: HttpRequest) -> SdkResult<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_case_insensitive() {
        let mut headers = HttpHeaders::new();
        headers.insert("Content-Type", "application/json");

        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert!(headers.contains("CONTENT-TYPE"));

        headers.insert("content-type", "text/plain");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn test_response_success_range() {
        assert!(HttpResponse::new(200, "OK").is_success());
        assert!(HttpResponse::new(204, "No Content").is_success());
        assert!(!HttpResponse::new(301, "Moved").is_success());
        assert!(!HttpResponse::new(404, "Not Found").is_success());
    }

    #[test]
    fn test_blank_body_is_not_a_body() {
        assert!(!HttpResponse::new(200, "OK").has_body());
        assert!(!HttpResponse::new(200, "OK").with_body("  ").has_body());
        assert!(HttpResponse::new(200, "OK").with_body("{}").has_body());
    }
}
