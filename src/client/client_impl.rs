use crate::client::{ResponsesClient, ResponsesConfig};
use crate::services::responses::{ResponsesService, ResponsesServiceImpl};
use crate::transport::HttpTransport;
use std::sync::Arc;

pub struct ResponsesClientImpl {
    config: ResponsesConfig,
    responses_service: ResponsesServiceImpl,
}

impl ResponsesClientImpl {
    pub fn new(config: ResponsesConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let responses_service = ResponsesServiceImpl::new(transport)
            .with_stream_idle_timeout(config.stream_idle_timeout);

        Self {
            config,
            responses_service,
        }
    }
}

impl ResponsesClient for ResponsesClientImpl {
    fn responses(&self) -> &dyn ResponsesService {
        &self.responses_service
    }

    fn config(&self) -> &ResponsesConfig {
        &self.config
    }
}
