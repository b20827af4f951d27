//! Request authentication.
//!
//! Every outgoing request passes through a [`RequestAuthenticator`] before it
//! reaches the [`HttpClient`](crate::http::HttpClient). The authenticator
//! mutates the request headers in place. Which scheme is used is decided once,
//! when the client is built, through [`AuthenticationScheme`].
//!
//! # Example Usage
//!
//! ```rust
//! use idm_client::auth::{ApiKey, BasicRequestAuthenticator, RequestAuthenticator};
//! use idm_client::http::{HttpMethod, HttpRequest};
//!
//! let api_key = ApiKey::new("key-id", "key-secret");
//! let mut request = HttpRequest::new(HttpMethod::Get, "https://api.example.com/v1/tenants/current");
//!
//! BasicRequestAuthenticator::new().authenticate(&mut request, &api_key).unwrap();
//! assert!(request.headers.get("Authorization").unwrap().starts_with("Basic "));
//! ```

use crate::error::{SdkError, SdkResult};
use crate::http::HttpRequest;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use std::fmt;
use std::sync::Arc;

/// Header carrying the request timestamp.
pub const DATE_HEADER: &str = "X-Idm-Date";

/// Timestamp format of [`DATE_HEADER`] (ISO-8601 basic format, UTC).
pub const DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("idm-client-rust/", env!("CARGO_PKG_VERSION"));

/// API key credentials used to authenticate requests.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    id: String,
    secret: String,
}

impl ApiKey {
    pub fn new(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Check that both halves of the key are present.
    pub fn validate(&self) -> SdkResult<()> {
        if self.id.trim().is_empty() {
            return Err(SdkError::configuration("API key id must not be empty"));
        }
        if self.secret.trim().is_empty() {
            return Err(SdkError::configuration("API key secret must not be empty"));
        }
        Ok(())
    }
}

// The secret never appears in logs.
impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Signs outgoing requests.
pub trait RequestAuthenticator: Send + Sync {
    /// Add authentication headers to `request`.
    fn authenticate(&self, request: &mut HttpRequest, credentials: &ApiKey) -> SdkResult<()>;
}

/// HTTP Basic authentication with the API key id and secret.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicRequestAuthenticator;

impl BasicRequestAuthenticator {
    pub fn new() -> Self {
        Self
    }
}

impl RequestAuthenticator for BasicRequestAuthenticator {
    fn authenticate(&self, request: &mut HttpRequest, credentials: &ApiKey) -> SdkResult<()> {
        let token = STANDARD.encode(format!("{}:{}", credentials.id(), credentials.secret()));
        request
            .headers
            .insert(DATE_HEADER, Utc::now().format(DATE_FORMAT).to_string());
        request
            .headers
            .insert("Authorization", format!("Basic {}", token));
        if !request.headers.contains("User-Agent") {
            request.headers.insert("User-Agent", USER_AGENT);
        }
        Ok(())
    }
}

/// Which authenticator the client installs.
#[derive(Clone, Default)]
pub enum AuthenticationScheme {
    /// HTTP Basic with the API key.
    #[default]
    Basic,
    /// A caller-provided signing scheme.
    Custom(Arc<dyn RequestAuthenticator>),
}

impl AuthenticationScheme {
    /// Instantiate the authenticator for this scheme.
    pub fn authenticator(&self) -> Arc<dyn RequestAuthenticator> {
        match self {
            AuthenticationScheme::Basic => Arc::new(BasicRequestAuthenticator::new()),
            AuthenticationScheme::Custom(authenticator) => Arc::clone(authenticator),
        }
    }
}

impl fmt::Debug for AuthenticationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthenticationScheme::Basic => f.write_str("Basic"),
            AuthenticationScheme::Custom(_) => f.write_str("Custom"),
        }
    }
}
