//! Request filter chain.
//!
//! Every data store request runs through an ordered chain of
//! [`RequestFilter`]s. A filter either answers the request itself or hands it
//! to the rest of the chain and post-processes what comes back. The chain is
//! consumed one filter at a time: the head filter receives a chain built from
//! the remaining filters, and the last filter receives `None`.
//!
//! The data store installs the standard filters in this order:
//!
//! 1. [`ReadCacheFilter`] serves cached resources and skips everything below.
//! 2. [`ErrorTranslationFilter`] turns non-2xx responses into
//!    [`ResourceError`](crate::error::ResourceError)s.
//! 3. [`WriteCacheFilter`] stores successful results and invalidates deletes.
//! 4. [`ExecuteRequestFilter`] authenticates and sends the HTTP request.
//!
//! so a request is checked against the cache, executed, cached, and finally
//! translated on its way back to the caller.

pub mod error_translation;
pub mod execute;
pub mod read_cache;
pub mod write_cache;

pub use error_translation::ErrorTranslationFilter;
pub use execute::ExecuteRequestFilter;
pub use read_cache::ReadCacheFilter;
pub use write_cache::WriteCacheFilter;

use crate::error::{SdkError, SdkResult};
use crate::http::{HttpHeaders, HttpMethod};
use crate::resource::RequestContext;
use crate::serializer::PropertyMap;
use async_trait::async_trait;
use log::trace;
use std::fmt;
use std::sync::Arc;

/// What a request does to its resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceAction {
    Get,
    Create,
    Update,
    Delete,
}

impl ResourceAction {
    /// HTTP method used for this action. Updates are POSTed to the resource href.
    pub fn method(&self) -> HttpMethod {
        match self {
            ResourceAction::Get => HttpMethod::Get,
            ResourceAction::Create | ResourceAction::Update => HttpMethod::Post,
            ResourceAction::Delete => HttpMethod::Delete,
        }
    }
}

impl fmt::Display for ResourceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceAction::Get => "get",
            ResourceAction::Create => "create",
            ResourceAction::Update => "update",
            ResourceAction::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// A resource-level request travelling down the filter chain.
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    pub action: ResourceAction,
    /// Type name of the target resource (or of the collection's items).
    pub type_name: &'static str,
    /// Absolute href, without query string.
    pub href: String,
    pub query: Vec<(String, String)>,
    pub body: Option<PropertyMap>,
    pub context: RequestContext,
}

impl ResourceRequest {
    pub fn new(
        action: ResourceAction,
        type_name: &'static str,
        href: impl Into<String>,
        context: &RequestContext,
    ) -> Self {
        Self {
            action,
            type_name,
            href: href.into(),
            query: Vec::new(),
            body: None,
            context: context.clone(),
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: PropertyMap) -> Self {
        self.body = Some(body);
        self
    }

    pub fn has_query(&self) -> bool {
        !self.query.is_empty()
    }

    /// Href plus the form-encoded query string.
    pub fn url(&self) -> String {
        if self.query.is_empty() {
            return self.href.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        let separator = if self.href.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.href, separator, query)
    }
}

/// A resource-level response travelling back up the filter chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceResponse {
    pub status: u16,
    pub reason_phrase: String,
    pub headers: HttpHeaders,
    pub body: PropertyMap,
    /// Whether the response was served from the cache tier.
    pub from_cache: bool,
}

impl ResourceResponse {
    /// A synthetic 200 response carrying cached properties.
    pub fn cached(body: PropertyMap) -> Self {
        Self {
            status: 200,
            reason_phrase: "OK".to_string(),
            headers: HttpHeaders::new(),
            body,
            from_cache: true,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One interceptor in the chain.
#[async_trait]
pub trait RequestFilter: Send + Sync {
    /// Name used in trace logs.
    fn name(&self) -> &'static str;

    /// Handle `request`, optionally delegating to `chain`.
    ///
    /// `chain` is `None` when this filter is the last one.
    async fn filter(
        &self,
        request: ResourceRequest,
        chain: Option<&FilterChain>,
    ) -> SdkResult<ResourceResponse>;
}

/// Ordered, non-empty list of filters.
#[derive(Clone)]
pub struct FilterChain {
    filters: Vec<Arc<dyn RequestFilter>>,
}

impl FilterChain {
    /// # Errors
    /// Returns [`SdkError::Configuration`] if `filters` is empty.
    pub fn new(filters: Vec<Arc<dyn RequestFilter>>) -> SdkResult<Self> {
        if filters.is_empty() {
            return Err(SdkError::configuration("Empty filter chain"));
        }
        Ok(Self { filters })
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Names of the filters, head first.
    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Run `request` through the chain.
    pub async fn execute(&self, request: ResourceRequest) -> SdkResult<ResourceResponse> {
        let (head, tail) = self
            .filters
            .split_first()
            .ok_or_else(|| SdkError::configuration("Empty filter chain"))?;

        trace!(
            "[{}] {} {} via {}",
            request.context.request_id,
            request.action,
            request.href,
            head.name()
        );

        if tail.is_empty() {
            head.filter(request, None).await
        } else {
            let rest = FilterChain {
                filters: tail.to_vec(),
            };
            head.filter(request, Some(&rest)).await
        }
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.filter_names())
            .finish()
    }
}

/// Delegate to `chain`, failing if the calling filter is terminal.
pub(crate) async fn proceed(
    filter: &'static str,
    request: ResourceRequest,
    chain: Option<&FilterChain>,
) -> SdkResult<ResourceResponse> {
    match chain {
        Some(chain) => chain.execute(request).await,
        None => Err(SdkError::configuration(format!(
            "Filter '{}' requires a downstream filter but is last in the chain",
            filter
        ))),
    }
}
