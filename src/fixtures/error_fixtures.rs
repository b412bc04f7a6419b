//! Error response fixtures

use serde_json::{json, Value};

/// 400 for a token cap under the server minimum
pub fn error_400_token_cap() -> Value {
    json!({
        "error": {
            "message": "Invalid 'max_output_tokens': integer below minimum value. Expected a value >= 16, but got 1 instead.",
            "type": "invalid_request_error",
            "param": "max_output_tokens",
            "code": "integer_below_min_value"
        }
    })
}

/// 401 authentication error response
pub fn error_401_invalid_api_key() -> Value {
    json!({
        "error": {
            "message": "Incorrect API key provided: sk-bad.",
            "type": "invalid_request_error",
            "param": null,
            "code": "invalid_api_key"
        }
    })
}

/// 429 rate limit error response
pub fn error_429_rate_limit() -> Value {
    json!({
        "error": {
            "message": "Rate limit reached for requests",
            "type": "rate_limit_error",
            "param": null,
            "code": "rate_limit_exceeded"
        }
    })
}

/// 500 server error response
pub fn error_500_server() -> Value {
    json!({
        "error": {
            "message": "The server had an error while processing your request.",
            "type": "server_error",
            "param": null,
            "code": null
        }
    })
}
