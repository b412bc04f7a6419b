use crate::client::ResponsesConfig;
use crate::errors::{ConfigurationError, NetworkError, ResponsesResult};
use crate::transport::{HttpTransport, RecordStream, ResponseParser, StreamHandler};
use async_trait::async_trait;
use http::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// HTTP transport implementation using reqwest
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    default_headers: HeaderMap,
    request_timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a new ReqwestTransport from configuration
    pub fn new(config: &ResponsesConfig) -> ResponsesResult<Self> {
        config.validate()?;

        // Only connection setup is bounded client-wide; a client-wide timeout
        // would also cut long streams short.
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                NetworkError::ConnectionFailed(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            default_headers: Self::auth_headers(config)?,
            request_timeout: config.timeout,
        })
    }

    /// Sets default headers to include in all requests
    pub fn with_default_headers(mut self, headers: HeaderMap) -> Self {
        for (key, value) in headers.iter() {
            self.default_headers.insert(key.clone(), value.clone());
        }
        self
    }

    fn auth_headers(config: &ResponsesConfig) -> ResponsesResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let bearer = format!("Bearer {}", config.api_key.expose_secret());
        let mut value = HeaderValue::from_str(&bearer).map_err(|_| {
            ConfigurationError::InvalidApiKeyFormat(
                "API key contains characters not allowed in a header".to_string(),
            )
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        if let Some(org_id) = &config.organization_id {
            headers.insert("OpenAI-Organization", header_value(org_id, "organization id")?);
        }
        if let Some(project_id) = &config.project_id {
            headers.insert("OpenAI-Project", header_value(project_id, "project id")?);
        }

        Ok(headers)
    }

    /// Builds a full URL from a path
    fn build_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }
}

fn header_value(value: &str, what: &str) -> ResponsesResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| ConfigurationError::InvalidHeader(format!("invalid {}", what)).into())
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, path: &str, body: Value) -> ResponsesResult<Value> {
        let url = self.build_url(path);
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .headers(self.default_headers.clone())
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await?;
        ResponseParser::parse_response(response).await
    }

    async fn post_stream(&self, path: &str, body: Value) -> ResponsesResult<RecordStream> {
        let url = self.build_url(path);
        debug!(%url, "POST (stream)");

        let response = self
            .client
            .post(&url)
            .headers(self.default_headers.clone())
            .header(ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await?;

        StreamHandler::handle_stream(response).await
    }
}
