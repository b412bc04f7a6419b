use crate::errors::{ErrorMapper, ResponsesError, ResponsesResult, TransportError};
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::warn;

pub struct ResponseParser;

impl ResponseParser {
    pub async fn parse_response<T: DeserializeOwned>(response: Response) -> ResponsesResult<T> {
        let response = Self::ensure_success(response).await?;
        let body = response.bytes().await?;
        Self::parse_json(&body)
    }

    /// Passes a successful response through; turns anything else into the
    /// classified error built from its status, headers and body.
    pub async fn ensure_success(response: Response) -> ResponsesResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let body = response.bytes().await.unwrap_or_default();
        let error = ErrorMapper::from_response(status.as_u16(), &headers, &body);
        warn!(status = status.as_u16(), error = %error, "Request rejected");
        Err(error)
    }

    pub fn parse_json<T: DeserializeOwned>(data: &[u8]) -> ResponsesResult<T> {
        serde_json::from_slice(data).map_err(|e| {
            ResponsesError::Transport(TransportError::Deserialization(format!(
                "Failed to deserialize JSON: {}. Data: {}",
                e,
                String::from_utf8_lossy(data)
            )))
        })
    }
}
