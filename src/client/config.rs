use crate::errors::{ConfigurationError, ResponsesResult};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsesConfig {
    #[serde(skip_serializing)]
    pub api_key: Secret<String>,

    #[serde(default = "default_base_url")]
    pub base_url: Url,

    #[serde(default)]
    pub organization_id: Option<String>,

    #[serde(default)]
    pub project_id: Option<String>,

    /// Bound on a whole non-streaming exchange and on connection setup.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Longest wait for the next event of a stream; `None` waits forever.
    #[serde(default)]
    pub stream_idle_timeout: Option<Duration>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ResponsesConfig {
    /// Creates a new ResponsesConfig with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: default_base_url(),
            organization_id: None,
            project_id: None,
            timeout: default_timeout(),
            stream_idle_timeout: None,
            user_agent: default_user_agent(),
        }
    }

    /// Creates a new ResponsesConfig from environment variables
    ///
    /// Reads the following environment variables:
    /// - OPENAI_API_KEY (required)
    /// - OPENAI_BASE_URL (optional, defaults to https://api.openai.com/v1)
    /// - OPENAI_ORGANIZATION_ID (optional)
    /// - OPENAI_PROJECT_ID (optional)
    pub fn from_env() -> ResponsesResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ConfigurationError::MissingApiKey(
                "OPENAI_API_KEY environment variable not found".to_string(),
            )
        })?;

        let mut config = Self::new(api_key);

        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            config.base_url = Url::parse(&base_url).map_err(|e| {
                ConfigurationError::InvalidBaseUrl(format!("Invalid OPENAI_BASE_URL: {}", e))
            })?;
        }

        if let Ok(org_id) = std::env::var("OPENAI_ORGANIZATION_ID") {
            config.organization_id = Some(org_id);
        }

        if let Ok(project_id) = std::env::var("OPENAI_PROJECT_ID") {
            config.project_id = Some(project_id);
        }

        Ok(config)
    }

    pub fn validate(&self) -> ResponsesResult<()> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(ConfigurationError::MissingApiKey("API key is empty".to_string()).into());
        }

        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(ConfigurationError::InvalidBaseUrl(format!(
                "unsupported scheme: {}",
                self.base_url.scheme()
            ))
            .into());
        }

        if self.timeout.is_zero() {
            return Err(ConfigurationError::InvalidTimeout(
                "Timeout must be greater than 0".to_string(),
            )
            .into());
        }

        if matches!(self.stream_idle_timeout, Some(idle) if idle.is_zero()) {
            return Err(ConfigurationError::InvalidTimeout(
                "Stream idle timeout must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_organization_id(mut self, org_id: impl Into<String>) -> Self {
        self.organization_id = Some(org_id.into());
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_stream_idle_timeout(mut self, idle: Duration) -> Self {
        self.stream_idle_timeout = Some(idle);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is a valid URL")
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_user_agent() -> String {
    format!("integrations-responses/{}", env!("CARGO_PKG_VERSION"))
}
