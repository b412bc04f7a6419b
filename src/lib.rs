//! Client for the OpenAI Responses API.
//!
//! Requests are validated locally before anything is sent. Streaming calls
//! are assembled event by event into the same [`Response`] a blocking call
//! returns, with sequence checking, cancellation and bounded waits.

pub mod client;
pub mod errors;
pub mod observability;
pub mod services;
pub mod transport;

#[cfg(test)]
pub mod mocks;

pub use client::{ResponsesClient, ResponsesClientBuilder, ResponsesClientImpl, ResponsesConfig};
pub use errors::{ResponsesError, ResponsesResult};

pub use services::responses::{
    AggregatorState, ContentPart, EventDecoder, ItemStatus, OutputItem, OutputMessage,
    ReasoningConfig, ReasoningEffort, ReasoningItem, ReasoningSummary, RequestParams, Response,
    ResponseAggregator, ResponseEvent, ResponseEventStream, ResponseInputItem, ResponseRequest,
    ResponseStatus, ResponseStream, ResponseUpdate, ResponsesService, Role, SummaryPart, Usage,
};

pub mod prelude {
    pub use crate::client::{ResponsesClient, ResponsesClientBuilder, ResponsesConfig};
    pub use crate::errors::{ResponsesError, ResponsesResult};
    pub use crate::services::responses::{
        ReasoningConfig, ReasoningEffort, RequestParams, Response, ResponseInputItem,
        ResponseStream, ResponseUpdate, ResponsesService,
    };
}
