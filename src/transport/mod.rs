mod http_transport;
mod response_parser;
mod stream_handler;

pub use http_transport::ReqwestTransport;
pub use response_parser::ResponseParser;
pub use stream_handler::{SseEvent, SseStream, StreamHandler};

use crate::errors::ResponsesResult;
use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use std::pin::Pin;

/// Ordered feed of raw stream records, one JSON value per record.
pub type RecordStream = Pin<Box<dyn Stream<Item = ResponsesResult<Value>> + Send>>;

/// The HTTP boundary. Implementations own connection handling and framing;
/// everything above works on JSON values.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Posts `body` and returns the decoded JSON reply.
    async fn post_json(&self, path: &str, body: Value) -> ResponsesResult<Value>;

    /// Posts `body` and returns the reply as a stream of records. Dropping the
    /// stream releases the underlying connection.
    async fn post_stream(&self, path: &str, body: Value) -> ResponsesResult<RecordStream>;
}
