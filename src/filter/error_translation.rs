//! Conversion of failed responses into resource errors.

use super::{FilterChain, RequestFilter, ResourceRequest, ResourceResponse, proceed};
use crate::error::{ResourceError, SdkError, SdkResult};
use async_trait::async_trait;
use log::warn;

/// Fails the request with a [`ResourceError`] when the response is not 2xx.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorTranslationFilter;

impl ErrorTranslationFilter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RequestFilter for ErrorTranslationFilter {
    fn name(&self) -> &'static str {
        "error-translation"
    }

    async fn filter(
        &self,
        request: ResourceRequest,
        chain: Option<&FilterChain>,
    ) -> SdkResult<ResourceResponse> {
        let request_id = request.context.request_id.clone();
        let href = request.href.clone();
        let response = proceed(self.name(), request, chain).await?;
        if response.is_success() {
            return Ok(response);
        }

        let error = ResourceError::from_body(response.status, &response.reason_phrase, &response.body);
        warn!("[{}] {} failed: {}", request_id, href, error);
        Err(SdkError::Resource(error))
    }
}
