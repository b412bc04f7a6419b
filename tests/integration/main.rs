//! Integration tests using WireMock
//!
//! The real reqwest transport against a local mock server: request shape,
//! authentication headers, error mapping and stream assembly from SSE bodies.

mod responses;
mod streaming;

use integrations_responses::prelude::*;
use integrations_responses::ResponseRequest;
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_API_KEY: &str = "test-api-key";

pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn client_for(server: &MockServer) -> Arc<dyn ResponsesClient> {
    let base_url = Url::parse(&server.uri()).expect("mock server uri");
    ResponsesClientBuilder::new()
        .with_config(ResponsesConfig::new(TEST_API_KEY).with_base_url(base_url))
        .build()
        .expect("Failed to build client")
}

/// Matches an authenticated POST to the responses endpoint.
pub fn responses_endpoint() -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path("/responses"))
        .and(header("Authorization", "Bearer test-api-key"))
}

pub fn error_response(status: u16, error_body: Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(error_body)
}

pub fn success_response(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

pub fn sse_response(records: &[Value]) -> ResponseTemplate {
    let mut body = String::new();
    for record in records {
        let event_type = record["type"].as_str().unwrap_or("message");
        body.push_str(&format!("event: {}\ndata: {}\n\n", event_type, record));
    }
    body.push_str("data: [DONE]\n\n");
    ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
}

pub fn hello_request() -> ResponseRequest {
    RequestParams::new("gpt-4o-mini", vec![ResponseInputItem::user("Say hello")])
        .build()
        .expect("valid request")
}

pub fn completed_response(text: &str) -> Value {
    json!({
        "id": "resp_it",
        "object": "response",
        "created_at": 1741476542,
        "status": "completed",
        "model": "gpt-4o-mini-2024-07-18",
        "output": [{
            "type": "message",
            "id": "msg_it",
            "status": "completed",
            "role": "assistant",
            "content": [{"type": "output_text", "text": text, "annotations": []}]
        }],
        "temperature": 1.0,
        "usage": {
            "input_tokens": 9,
            "input_tokens_details": {"cached_tokens": 0},
            "output_tokens": 2,
            "output_tokens_details": {"reasoning_tokens": 0},
            "total_tokens": 11
        }
    })
}
