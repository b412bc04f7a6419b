use crate::errors::{ResponsesError, TransportError, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub code: Option<String>,
    pub param: Option<String>,
}

pub struct ErrorMapper;

impl ErrorMapper {
    /// Maps HTTP status code and error response to ResponsesError
    pub fn map_status_code(
        status_code: u16,
        error_response: Option<ApiErrorResponse>,
    ) -> ResponsesError {
        let detail = error_response.map(|r| r.error);
        let message = detail
            .as_ref()
            .map(|d| d.message.clone())
            .unwrap_or_else(|| format!("HTTP error: {}", status_code));

        match status_code {
            401 | 403 => ResponsesError::Transport(TransportError::Authentication {
                status_code,
                message,
            }),
            429 => ResponsesError::Transport(TransportError::RateLimited {
                message,
                retry_after_secs: None,
            }),
            400..=499 => ResponsesError::InvalidRequest(ValidationError::Rejected {
                status_code: Some(status_code),
                message,
                error_type: detail.as_ref().and_then(|d| d.error_type.clone()),
                error_code: detail.as_ref().and_then(|d| d.code.clone()),
                param: detail.as_ref().and_then(|d| d.param.clone()),
            }),
            500..=599 => ResponsesError::Transport(TransportError::Server {
                status_code,
                message,
            }),
            _ => ResponsesError::Transport(TransportError::UnexpectedStatus {
                status_code,
                message,
            }),
        }
    }

    /// Maps HTTP status code with headers for better rate limit handling
    pub fn map_status_with_headers(
        status_code: u16,
        headers: &http::HeaderMap,
        body: &str,
    ) -> ResponsesError {
        let error_response = Self::parse_error_response(body);
        let mut error = Self::map_status_code(status_code, error_response);

        if let ResponsesError::Transport(TransportError::RateLimited {
            retry_after_secs, ..
        }) = &mut error
        {
            *retry_after_secs = Self::extract_retry_after(headers);
        }

        error
    }

    /// Classifies the `type` of an error reported inside the stream, where no
    /// HTTP status is available.
    pub fn map_error_type(
        error_type: Option<&str>,
        code: Option<String>,
        message: String,
        param: Option<String>,
    ) -> ResponsesError {
        match error_type {
            Some("invalid_request_error") => {
                ResponsesError::InvalidRequest(ValidationError::Rejected {
                    status_code: None,
                    message,
                    error_type: error_type.map(str::to_string),
                    error_code: code,
                    param,
                })
            }
            Some("rate_limit_error") => ResponsesError::Transport(TransportError::RateLimited {
                message,
                retry_after_secs: None,
            }),
            _ => ResponsesError::Transport(TransportError::StreamError { code, message }),
        }
    }

    /// Extracts retry-after header value in seconds
    pub fn extract_retry_after(headers: &http::HeaderMap) -> Option<u64> {
        headers
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok())
    }

    pub fn parse_error_response(body: &str) -> Option<ApiErrorResponse> {
        serde_json::from_str(body).ok()
    }

    pub fn from_response(status: u16, headers: &http::HeaderMap, body: &[u8]) -> ResponsesError {
        let body_str = String::from_utf8_lossy(body);
        Self::map_status_with_headers(status, headers, &body_str)
    }
}
