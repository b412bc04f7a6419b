mod categories;
mod error;
mod mapping;

pub use categories::{
    CancelReason, ConfigurationError, NetworkError, TransportError, ValidationError, WaitPhase,
    MIN_OUTPUT_TOKENS,
};
pub use error::{ResponsesError, ResponsesResult};
pub use mapping::{ApiErrorDetail, ApiErrorResponse, ErrorMapper};
