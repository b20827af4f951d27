//! Error types for SDK operations.
//!
//! Every fallible operation in this crate returns [`SdkResult`]. Server-side
//! failures only ever surface as [`SdkError::Resource`], carrying the
//! structured [`ResourceError`] decoded from the response body.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Main error type for SDK operations.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// Setup or capability mismatch detected while building a component
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A collection query could not be compiled
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// The remote service answered with a non-2xx status
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// The request never produced an HTTP response (timeout, connection failure)
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation observed its cancellation signal
    #[error("Operation was cancelled")]
    Cancelled,

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A component was used after it was disposed
    #[error("{component} has been disposed")]
    Disposed { component: &'static str },

    /// The resource is not in a state that allows the requested operation
    #[error("Invalid resource: {message}")]
    InvalidResource { message: String },

    /// A terminal query operator required at least one element
    #[error("Sequence contains no elements")]
    EmptySequence,

    /// A terminal query operator required exactly one element
    #[error("Sequence contains more than one element")]
    MoreThanOneElement,
}

/// Errors raised while compiling a collection query.
///
/// These are always reported before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The query uses a construct the remote API cannot express
    #[error("Expression not supported: {expression}")]
    NotSupported { expression: String },

    /// Two constraints target the same bound of one field
    #[error("Conflicting {bound} bound constraints on field '{field}'")]
    RangeCollision { field: String, bound: &'static str },

    /// More than one non-range constraint targets the same field
    #[error("Multiple constraints on field '{field}' are not supported")]
    MultipleConstraints { field: String },

    /// The right-hand side of a comparison is not a constant
    #[error("Comparison on field '{field}' requires a constant operand")]
    NonConstantOperand { field: String },

    /// Offset or limit values are out of range
    #[error("Invalid pagination: {message}")]
    InvalidPagination { message: String },
}

/// Structured error returned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("HTTP {status}, code {code}: {developer_message}{}", more_info_suffix(.more_info))]
pub struct ResourceError {
    pub status: u16,
    pub code: i64,
    pub message: String,
    pub developer_message: String,
    pub more_info: Option<String>,
    pub request_id: Option<String>,
}

/// Wire shape of an error body. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ErrorBody {
    status: Option<u16>,
    code: Option<i64>,
    message: Option<String>,
    developer_message: Option<String>,
    more_info: Option<String>,
    request_id: Option<String>,
}

fn more_info_suffix(more_info: &Option<String>) -> String {
    more_info
        .as_deref()
        .map(|more_info| format!(" ({})", more_info))
        .unwrap_or_default()
}

impl ResourceError {
    /// Build a resource error from a decoded error body.
    ///
    /// Missing fields fall back to the HTTP status and reason phrase so the
    /// result always carries a usable developer message. A body that does
    /// not have the error shape is treated as missing.
    pub fn from_body(status: u16, reason: &str, body: &Map<String, Value>) -> Self {
        let body: ErrorBody = serde_json::from_value(Value::Object(body.clone())).unwrap_or_default();

        let message = body.message.unwrap_or_else(|| reason.to_string());
        let developer_message = body.developer_message.unwrap_or_else(|| message.clone());

        Self {
            status: body.status.unwrap_or(status),
            code: body.code.unwrap_or(-1),
            message,
            developer_message,
            more_info: body.more_info,
            request_id: body.request_id,
        }
    }

    /// Build a resource error when no usable body was returned.
    pub fn from_status(status: u16, reason: &str) -> Self {
        Self::from_body(status, reason, &Map::new())
    }
}

// Convenience methods for creating common errors
impl SdkError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a transport error without an underlying source
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a transport-level failure
    pub fn transport_error<E>(message: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(error)),
        }
    }

    /// Create an invalid resource error
    pub fn invalid_resource(message: impl Into<String>) -> Self {
        Self::InvalidResource {
            message: message.into(),
        }
    }

    /// Whether this error is the cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The structured remote error, if this is one.
    pub fn as_resource_error(&self) -> Option<&ResourceError> {
        match self {
            Self::Resource(error) => Some(error),
            _ => None,
        }
    }
}

impl QueryError {
    /// Create a not-supported error naming the offending expression
    pub fn not_supported(expression: impl Into<String>) -> Self {
        Self::NotSupported {
            expression: expression.into(),
        }
    }
}

// Result type aliases for convenience
pub type SdkResult<T> = Result<T, SdkError>;
pub type QueryResult<T> = Result<T, QueryError>;
