use crate::client::{ResponsesClient, ResponsesClientImpl, ResponsesConfig};
use crate::errors::{ConfigurationError, ResponsesResult};
use crate::transport::{HttpTransport, ReqwestTransport};
use std::sync::Arc;

#[derive(Default)]
pub struct ResponsesClientBuilder {
    config: Option<ResponsesConfig>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl ResponsesClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ResponsesConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config = Some(ResponsesConfig::new(api_key));
        self
    }

    /// Reads the configuration from `OPENAI_*` environment variables.
    pub fn from_env(self) -> ResponsesResult<Self> {
        Ok(self.with_config(ResponsesConfig::from_env()?))
    }

    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> ResponsesResult<Arc<dyn ResponsesClient>> {
        let config = self.config.ok_or_else(|| {
            ConfigurationError::MissingApiKey("API key must be provided".to_string())
        })?;
        config.validate()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&config)?),
        };

        Ok(Arc::new(ResponsesClientImpl::new(config, transport)))
    }
}
