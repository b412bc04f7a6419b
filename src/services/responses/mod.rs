mod aggregator;
pub mod events;
mod request;
mod service;
mod stream;
mod types;
mod validation;
mod views;


pub use aggregator::{AggregatorState, ResponseAggregator, ResponseUpdate};
pub use events::{event_types, EventDecoder, ResponseEvent};
pub use request::{
    ReasoningConfig, ReasoningContentPart, ReasoningEffort, ReasoningInput, ReasoningSummary,
    RequestParams, ResponseInputItem, ResponseRequest, INCLUDE_ENCRYPTED_REASONING,
};
pub use service::{ResponsesService, ResponsesServiceImpl, RESPONSES_PATH};
pub use stream::{ResponseEventStream, ResponseStream};
pub use types::{
    ContentPart, InputTokensDetails, ItemStatus, OutputItem, OutputMessage, OutputTokensDetails,
    ReasoningItem, Response, ResponseErrorDetail, ResponseStatus, Role, SummaryPart, Usage,
    UsageMismatch,
};
pub use validation::ResponseRequestValidator;
