//! Per-call request context.
//!
//! Every asynchronous data store operation receives a [`RequestContext`]
//! carrying a request id for log correlation and the cancellation signal
//! for the call.

use crate::error::{SdkError, SdkResult};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Request context for data store operations.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request
    pub request_id: String,
    /// Cancellation signal observed by every suspension point of the call
    pub cancellation: CancellationToken,
}

impl RequestContext {
    /// Create a new request context with a generated request ID.
    pub fn new() -> Self {
        Self::with_request_id(Uuid::new_v4().to_string())
    }

    /// Create a new request context with a specific request ID.
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Create a request context observing the given cancellation token.
    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            cancellation,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Fail with [`SdkError::Cancelled`] if the call has been cancelled.
    pub fn check_cancelled(&self) -> SdkResult<()> {
        if self.is_cancelled() {
            Err(SdkError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
