//! Blocking create calls

use super::*;
use integrations_responses::errors::{TransportError, ValidationError};
use integrations_responses::{ReasoningEffort, ResponseStatus};
use pretty_assertions::assert_eq;
use wiremock::matchers::body_partial_json;

#[tokio::test]
async fn test_create_integration_success() {
    let mock_server = setup_mock_server().await;

    responses_endpoint()
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "stream": false,
            "store": false,
            "input": [{"type": "message", "role": "user", "content": "Say hello"}]
        })))
        .respond_with(success_response(completed_response("Hello there")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client.responses().create(hello_request()).await.unwrap();

    assert_eq!(response.id, "resp_it");
    assert_eq!(response.status, ResponseStatus::Completed);
    assert_eq!(response.output_text(), Some("Hello there".to_string()));
    assert_eq!(response.usage.as_ref().and_then(|u| u.total_tokens), Some(11));
}

#[tokio::test]
async fn test_create_integration_sends_reasoning_options() {
    let mock_server = setup_mock_server().await;

    responses_endpoint()
        .and(body_partial_json(json!({
            "reasoning": {"effort": "high"},
            "include": ["reasoning.encrypted_content"],
            "max_output_tokens": 64
        })))
        .respond_with(success_response(completed_response("42")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = RequestParams::new("o4-mini", vec![ResponseInputItem::user("Answer?")])
        .with_reasoning(ReasoningConfig::new(ReasoningEffort::High))
        .with_encrypted_reasoning()
        .with_max_output_tokens(64)
        .build()
        .unwrap();

    let client = client_for(&mock_server);
    let response = client.responses().create(request).await.unwrap();
    assert_eq!(response.first_message_text(), Some("42"));
}

#[tokio::test]
async fn test_create_integration_rejected_request() {
    let mock_server = setup_mock_server().await;

    responses_endpoint()
        .respond_with(error_response(
            400,
            json!({
                "error": {
                    "message": "Unsupported parameter: 'temperature'",
                    "type": "invalid_request_error",
                    "param": "temperature",
                    "code": "unsupported_parameter"
                }
            }),
        ))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.responses().create(hello_request()).await.unwrap_err();

    match err {
        ResponsesError::InvalidRequest(ValidationError::Rejected {
            status_code,
            param,
            error_code,
            ..
        }) => {
            assert_eq!(status_code, Some(400));
            assert_eq!(param.as_deref(), Some("temperature"));
            assert_eq!(error_code.as_deref(), Some("unsupported_parameter"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_create_integration_authentication_error() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(error_response(
            401,
            json!({
                "error": {
                    "message": "Incorrect API key provided",
                    "type": "invalid_request_error",
                    "code": "invalid_api_key"
                }
            }),
        ))
        .mount(&mock_server)
        .await;

    let base_url = Url::parse(&mock_server.uri()).unwrap();
    let client = ResponsesClientBuilder::new()
        .with_config(ResponsesConfig::new("sk-wrong").with_base_url(base_url))
        .build()
        .unwrap();

    let err = client.responses().create(hello_request()).await.unwrap_err();
    assert!(matches!(
        err,
        ResponsesError::Transport(TransportError::Authentication { .. })
    ));
}

#[tokio::test]
async fn test_create_integration_rate_limited() {
    let mock_server = setup_mock_server().await;

    responses_endpoint()
        .respond_with(
            error_response(
                429,
                json!({"error": {"message": "Rate limit reached", "type": "rate_limit_error"}}),
            )
            .insert_header("retry-after", "7"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.responses().create(hello_request()).await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(err.retry_after(), Some(7));
}

#[tokio::test]
async fn test_token_cap_below_minimum_is_rejected_locally() {
    let mock_server = setup_mock_server().await;

    responses_endpoint()
        .respond_with(success_response(completed_response("unused")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = RequestParams::new("gpt-4o-mini", vec![ResponseInputItem::user("Hi")])
        .with_max_output_tokens(1)
        .build()
        .unwrap_err();

    assert!(matches!(
        err,
        ResponsesError::InvalidRequest(ValidationError::TokenCapBelowMinimum { .. })
    ));
}
