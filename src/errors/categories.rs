use std::fmt;
use thiserror::Error;

/// Smallest `max_output_tokens` the remote side accepts.
pub const MIN_OUTPUT_TOKENS: u32 = 16;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("token cap below minimum: max_output_tokens must be at least {minimum}, got {value}")]
    TokenCapBelowMinimum { value: u32, minimum: u32 },

    #[error("empty input: a request needs at least one input item")]
    EmptyInput,

    #[error("reasoning input at position {index} must have no content parts, got {count}")]
    ReasoningContentNotEmpty { index: usize, count: usize },

    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: String,
        max: String,
        value: String,
    },

    /// The remote side refused the request (4xx or an `invalid_request_error` event).
    #[error("Request rejected: {message}")]
    Rejected {
        status_code: Option<u16>,
        message: String,
        error_type: Option<String>,
        error_code: Option<String>,
        param: Option<String>,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Missing API key: {0}")]
    MissingApiKey(String),

    #[error("Invalid API key format: {0}")]
    InvalidApiKeyFormat(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Server error ({status_code}): {message}")]
    Server { status_code: u16, message: String },

    #[error("Authentication failed ({status_code}): {message}")]
    Authentication { status_code: u16, message: String },

    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Unexpected status {status_code}: {message}")]
    UnexpectedStatus { status_code: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// The remote side reported the response itself as failed.
    #[error("Response {response_id} failed: {message}")]
    ResponseFailed {
        response_id: String,
        code: Option<String>,
        message: String,
    },

    /// An `error` event arrived on the stream.
    #[error("Stream error event: {message}")]
    StreamError {
        code: Option<String>,
        message: String,
    },
}

impl TransportError {
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            TransportError::RateLimited {
                retry_after_secs, ..
            } => *retry_after_secs,
            _ => None,
        }
    }
}

/// Which wait exceeded its bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPhase {
    NextEvent,
    Finalize,
}

impl fmt::Display for WaitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitPhase::NextEvent => write!(f, "next event"),
            WaitPhase::Finalize => write!(f, "finalize"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The consumer called `cancel()` or dropped the stream mid-flight.
    Explicit,
    /// A time-bounded wait expired.
    Timeout { timeout_ms: u64, phase: WaitPhase },
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Explicit => write!(f, "cancelled by consumer"),
            CancelReason::Timeout { timeout_ms, phase } => {
                write!(f, "timed out after {}ms waiting for {}", timeout_ms, phase)
            }
        }
    }
}
