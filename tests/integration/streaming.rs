//! Streaming calls over server-sent events

use super::*;
use futures::StreamExt;
use integrations_responses::errors::TransportError;
use integrations_responses::{AggregatorState, ResponseEvent, ResponseStatus};
use pretty_assertions::assert_eq;
use wiremock::matchers::body_partial_json;

fn delta(sequence_number: u64, text: &str) -> Value {
    json!({
        "type": "response.output_text.delta",
        "sequence_number": sequence_number,
        "item_id": "msg_it",
        "output_index": 0,
        "content_index": 0,
        "delta": text
    })
}

fn snapshot(event_type: &str, sequence_number: u64) -> Value {
    json!({
        "type": event_type,
        "sequence_number": sequence_number,
        "response": {
            "id": "resp_it",
            "object": "response",
            "created_at": 1741476542,
            "status": "in_progress",
            "model": "gpt-4o-mini-2024-07-18",
            "output": []
        }
    })
}

fn hello_records() -> Vec<Value> {
    vec![
        snapshot("response.created", 0),
        snapshot("response.in_progress", 1),
        json!({
            "type": "response.output_item.added",
            "sequence_number": 2,
            "output_index": 0,
            "item": {
                "type": "message",
                "id": "msg_it",
                "status": "in_progress",
                "role": "assistant",
                "content": []
            }
        }),
        json!({
            "type": "response.content_part.added",
            "sequence_number": 3,
            "item_id": "msg_it",
            "output_index": 0,
            "content_index": 0,
            "part": {"type": "output_text", "text": "", "annotations": []}
        }),
        delta(4, "Hel"),
        delta(5, "lo"),
        json!({
            "type": "response.completed",
            "sequence_number": 6,
            "response": completed_response("Hello")
        }),
    ]
}

#[tokio::test]
async fn test_stream_integration_assembles_response() {
    let mock_server = setup_mock_server().await;

    responses_endpoint()
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(sse_response(&hello_records()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut stream = client.responses().create_stream(hello_request()).await.unwrap();

    let mut text = String::new();
    while let Some(update) = stream.next().await {
        if let Some(delta) = update.unwrap().text_delta() {
            text.push_str(delta);
        }
    }
    assert_eq!(text, "Hello");

    let response = stream.finalize().await.unwrap();
    assert_eq!(response.status, ResponseStatus::Completed);
    assert_eq!(response.output_text(), Some("Hello".to_string()));
    assert_eq!(stream.aggregator().state(), AggregatorState::Completed);
}

#[tokio::test]
async fn test_stream_integration_collect_text() {
    let mock_server = setup_mock_server().await;

    responses_endpoint()
        .respond_with(sse_response(&hello_records()))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let stream = client.responses().create_stream(hello_request()).await.unwrap();

    assert_eq!(stream.collect_text().await.unwrap(), "Hello");
}

#[tokio::test]
async fn test_stream_integration_truncated_body() {
    let mock_server = setup_mock_server().await;

    let records = hello_records();
    responses_endpoint()
        .respond_with(sse_response(&records[..5]))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut stream = client.responses().create_stream(hello_request()).await.unwrap();

    let err = stream.finalize().await.unwrap_err();
    match err {
        ResponsesError::IncompleteStream {
            events_seen,
            last_sequence,
        } => {
            assert_eq!(events_seen, 5);
            assert_eq!(last_sequence, Some(4));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(stream.partial_response().and_then(|r| r.output_text()), Some("Hel".to_string()));
}

#[tokio::test]
async fn test_stream_integration_failed_event() {
    let mock_server = setup_mock_server().await;

    let mut failed = completed_response("");
    failed["status"] = json!("failed");
    failed["output"] = json!([]);
    failed["error"] = json!({"code": "server_error", "message": "The model crashed"});

    responses_endpoint()
        .respond_with(sse_response(&[
            snapshot("response.created", 0),
            json!({"type": "response.failed", "sequence_number": 1, "response": failed}),
        ]))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut stream = client.responses().create_stream(hello_request()).await.unwrap();

    let err = stream.finalize().await.unwrap_err();
    assert!(matches!(
        err,
        ResponsesError::Transport(TransportError::ResponseFailed { .. })
    ));
}

#[tokio::test]
async fn test_stream_integration_open_error() {
    let mock_server = setup_mock_server().await;

    responses_endpoint()
        .respond_with(error_response(
            500,
            json!({"error": {"message": "Internal error", "type": "server_error"}}),
        ))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.responses().create_stream(hello_request()).await;

    assert!(matches!(
        result,
        Err(ResponsesError::Transport(TransportError::Server { .. }))
    ));
}

#[tokio::test]
async fn test_event_stream_integration_yields_decoded_events() {
    let mock_server = setup_mock_server().await;

    responses_endpoint()
        .respond_with(sse_response(&hello_records()))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let events: Vec<ResponseEvent> = client
        .responses()
        .create_event_stream(hello_request())
        .await
        .unwrap()
        .map(|event| event.unwrap())
        .collect()
        .await;

    assert_eq!(events.len(), 7);
    assert!(matches!(events[0], ResponseEvent::Created(_)));
    assert!(events[6].is_terminal());
    let sequences: Vec<u64> = events.iter().map(|e| e.sequence_number()).collect();
    assert_eq!(sequences, (0..7).collect::<Vec<_>>());
}
