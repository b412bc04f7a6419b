use crate::errors::{ResponsesError, ResponsesResult, TransportError};
use crate::services::responses::{Response, ResponseEventStream, ResponseRequest, ResponseStream};
use crate::transport::HttpTransport;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const RESPONSES_PATH: &str = "/responses";

#[async_trait]
pub trait ResponsesService: Send + Sync {
    /// Sends the request and waits for the complete response.
    async fn create(&self, request: ResponseRequest) -> ResponsesResult<Response>;

    /// Sends the request in streaming mode and assembles the response as events arrive.
    async fn create_stream(&self, request: ResponseRequest) -> ResponsesResult<ResponseStream>;

    /// Sends the request in streaming mode and exposes the decoded events.
    async fn create_event_stream(
        &self,
        request: ResponseRequest,
    ) -> ResponsesResult<ResponseEventStream>;
}

pub struct ResponsesServiceImpl {
    transport: Arc<dyn HttpTransport>,
    stream_idle_timeout: Option<Duration>,
}

impl ResponsesServiceImpl {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            stream_idle_timeout: None,
        }
    }

    pub fn with_stream_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.stream_idle_timeout = idle_timeout;
        self
    }

    fn body(request: &ResponseRequest) -> ResponsesResult<Value> {
        serde_json::to_value(request).map_err(|e| {
            ResponsesError::Transport(TransportError::Serialization(format!(
                "Failed to serialize request: {}",
                e
            )))
        })
    }
}

#[async_trait]
impl ResponsesService for ResponsesServiceImpl {
    async fn create(&self, request: ResponseRequest) -> ResponsesResult<Response> {
        let request = request.into_stream_mode(false);
        debug!(model = request.model(), inputs = request.input().len(), "Creating response");

        let value = self
            .transport
            .post_json(RESPONSES_PATH, Self::body(&request)?)
            .await?;

        let response: Response = serde_json::from_value(value).map_err(|e| {
            ResponsesError::Transport(TransportError::Deserialization(format!(
                "Failed to decode response: {}",
                e
            )))
        })?;

        debug!(response_id = %response.id, status = ?response.status, "Response received");
        Ok(response)
    }

    async fn create_stream(&self, request: ResponseRequest) -> ResponsesResult<ResponseStream> {
        let request = request.into_stream_mode(true);
        debug!(model = request.model(), inputs = request.input().len(), "Creating response stream");

        let records = self
            .transport
            .post_stream(RESPONSES_PATH, Self::body(&request)?)
            .await?;

        Ok(ResponseStream::new(records).with_idle_timeout(self.stream_idle_timeout))
    }

    async fn create_event_stream(
        &self,
        request: ResponseRequest,
    ) -> ResponsesResult<ResponseEventStream> {
        let request = request.into_stream_mode(true);
        debug!(model = request.model(), "Creating response event stream");

        let records = self
            .transport
            .post_stream(RESPONSES_PATH, Self::body(&request)?)
            .await?;

        Ok(ResponseEventStream::new(records))
    }
}
