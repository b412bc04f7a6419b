//! Mock HTTP transport for testing

use crate::errors::{ResponsesError, ResponsesResult, TransportError};
use crate::transport::{HttpTransport, RecordStream};
use async_trait::async_trait;
use futures::{stream, Stream, StreamExt};
use serde_json::Value;
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

/// Mock HTTP transport that allows configuring expected requests and responses
#[derive(Clone)]
pub struct MockHttpTransport {
    inner: Arc<Mutex<MockHttpTransportInner>>,
    stream_dropped: Arc<AtomicBool>,
}

struct MockHttpTransportInner {
    responses: VecDeque<ResponsesResult<Value>>,
    stream_responses: VecDeque<MockStreamResponse>,
    requests: Vec<MockRequest>,
}

#[derive(Debug, Clone)]
pub struct MockRequest {
    pub path: String,
    pub body: Value,
    pub streaming: bool,
}

enum MockStreamResponse {
    Records {
        records: Vec<ResponsesResult<Value>>,
        hang: bool,
    },
    Error(ResponsesError),
}

impl MockHttpTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockHttpTransportInner {
                responses: VecDeque::new(),
                stream_responses: VecDeque::new(),
                requests: Vec::new(),
            })),
            stream_dropped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Add a successful JSON response
    pub fn with_json_response(self, response: Value) -> Self {
        self.inner.lock().unwrap().responses.push_back(Ok(response));
        self
    }

    /// Add an error response
    pub fn with_error_response(self, error: ResponsesError) -> Self {
        self.inner.lock().unwrap().responses.push_back(Err(error));
        self
    }

    /// Add a stream that yields the records and then ends
    pub fn with_stream_response(self, records: Vec<Value>) -> Self {
        self.push_stream(records.into_iter().map(Ok).collect(), false)
    }

    /// Add a stream that yields the records (or transport errors) and then ends
    pub fn with_stream_results(self, records: Vec<ResponsesResult<Value>>) -> Self {
        self.push_stream(records, false)
    }

    /// Add a stream that yields the records and then never produces another one
    pub fn with_hanging_stream(self, records: Vec<Value>) -> Self {
        self.push_stream(records.into_iter().map(Ok).collect(), true)
    }

    /// Fail the stream request itself
    pub fn with_stream_error(self, error: ResponsesError) -> Self {
        self.inner
            .lock()
            .unwrap()
            .stream_responses
            .push_back(MockStreamResponse::Error(error));
        self
    }

    fn push_stream(self, records: Vec<ResponsesResult<Value>>, hang: bool) -> Self {
        self.inner
            .lock()
            .unwrap()
            .stream_responses
            .push_back(MockStreamResponse::Records { records, hang });
        self
    }

    /// Get the list of requests made
    pub fn requests(&self) -> Vec<MockRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// Body of the most recent request
    pub fn last_body(&self) -> Option<Value> {
        self.inner.lock().unwrap().requests.last().map(|r| r.body.clone())
    }

    /// Verify that a request was made to the given path
    pub fn verify_request(&self, path: &str) -> bool {
        self.inner.lock().unwrap().requests.iter().any(|r| r.path == path)
    }

    /// Get the number of requests made
    pub fn request_count(&self) -> usize {
        self.inner.lock().unwrap().requests.len()
    }

    /// True once a stream handed out by this transport has been dropped
    pub fn stream_dropped(&self) -> bool {
        self.stream_dropped.load(Ordering::SeqCst)
    }

    fn record(&self, path: &str, body: Value, streaming: bool) {
        self.inner.lock().unwrap().requests.push(MockRequest {
            path: path.to_string(),
            body,
            streaming,
        });
    }
}

impl Default for MockHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn not_configured() -> ResponsesError {
    ResponsesError::Transport(TransportError::UnexpectedStatus {
        status_code: 0,
        message: "No mock response configured".to_string(),
    })
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn post_json(&self, path: &str, body: Value) -> ResponsesResult<Value> {
        self.record(path, body, false);
        self.inner
            .lock()
            .unwrap()
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(not_configured()))
    }

    async fn post_stream(&self, path: &str, body: Value) -> ResponsesResult<RecordStream> {
        self.record(path, body, true);
        let response = self
            .inner
            .lock()
            .unwrap()
            .stream_responses
            .pop_front()
            .ok_or_else(not_configured)?;

        match response {
            MockStreamResponse::Records { records, hang } => {
                let records = stream::iter(records);
                let inner: RecordStream = if hang {
                    Box::pin(records.chain(stream::pending()))
                } else {
                    Box::pin(records)
                };
                Ok(Box::pin(DropFlagStream {
                    inner,
                    dropped: self.stream_dropped.clone(),
                }))
            }
            MockStreamResponse::Error(err) => Err(err),
        }
    }
}

/// Raises a flag when dropped, standing in for a closed connection.
struct DropFlagStream {
    inner: RecordStream,
    dropped: Arc<AtomicBool>,
}

impl Stream for DropFlagStream {
    type Item = ResponsesResult<Value>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl Drop for DropFlagStream {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}
