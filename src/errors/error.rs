use crate::errors::categories::{
    CancelReason, ConfigurationError, NetworkError, TransportError, ValidationError,
};
use thiserror::Error;

pub type ResponsesResult<T> = Result<T, ResponsesError>;

/// Closed failure taxonomy surfaced to callers.
///
/// `Cancelled` is deliberately not a fault: use [`ResponsesError::is_failure`]
/// to tell a deliberate abandonment apart from the other kinds.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResponsesError {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    #[error("Sequence violation: sequence number {received} does not follow {previous}")]
    SequenceViolation { previous: u64, received: u64 },

    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Incomplete stream: ended after {events_seen} events without response.completed")]
    IncompleteStream {
        events_seen: usize,
        last_sequence: Option<u64>,
    },

    #[error("Stream cancelled: {0}")]
    Cancelled(CancelReason),

    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),
}

impl ResponsesError {
    pub fn malformed(message: impl Into<String>) -> Self {
        ResponsesError::MalformedEvent(message.into())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ResponsesError::Transport(
                TransportError::Network(_)
                    | TransportError::Server { .. }
                    | TransportError::RateLimited { .. }
                    | TransportError::Timeout(_)
            )
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ResponsesError::Cancelled(_))
    }

    /// True for every kind except `Cancelled`.
    pub fn is_failure(&self) -> bool {
        !self.is_cancelled()
    }

    /// Failures that terminate a stream because the event sequence itself was bad.
    pub fn is_stream_error(&self) -> bool {
        matches!(
            self,
            ResponsesError::SequenceViolation { .. }
                | ResponsesError::MalformedEvent(_)
                | ResponsesError::IncompleteStream { .. }
        )
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ResponsesError::InvalidRequest(ValidationError::Rejected { status_code, .. }) => {
                *status_code
            }
            ResponsesError::Transport(TransportError::Server { status_code, .. })
            | ResponsesError::Transport(TransportError::Authentication { status_code, .. })
            | ResponsesError::Transport(TransportError::UnexpectedStatus { status_code, .. }) => {
                Some(*status_code)
            }
            ResponsesError::Transport(TransportError::RateLimited { .. }) => Some(429),
            _ => None,
        }
    }

    pub fn retry_after(&self) -> Option<u64> {
        match self {
            ResponsesError::Transport(transport) => transport.retry_after(),
            _ => None,
        }
    }
}

impl From<NetworkError> for ResponsesError {
    fn from(err: NetworkError) -> Self {
        ResponsesError::Transport(TransportError::Network(err))
    }
}

impl From<ConfigurationError> for ResponsesError {
    fn from(err: ConfigurationError) -> Self {
        ResponsesError::Transport(TransportError::Configuration(err))
    }
}

impl From<reqwest::Error> for ResponsesError {
    fn from(err: reqwest::Error) -> Self {
        let transport = if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Network(NetworkError::ConnectionFailed(err.to_string()))
        } else if err.is_body() || err.is_decode() {
            TransportError::Network(NetworkError::StreamInterrupted(err.to_string()))
        } else {
            TransportError::Network(NetworkError::RequestFailed(err.to_string()))
        };
        ResponsesError::Transport(transport)
    }
}

impl From<serde_json::Error> for ResponsesError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            ResponsesError::Transport(TransportError::Deserialization(err.to_string()))
        } else {
            ResponsesError::Transport(TransportError::Serialization(err.to_string()))
        }
    }
}

impl From<url::ParseError> for ResponsesError {
    fn from(err: url::ParseError) -> Self {
        ConfigurationError::InvalidBaseUrl(err.to_string()).into()
    }
}
