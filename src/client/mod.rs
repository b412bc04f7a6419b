mod client_impl;
mod config;
mod factory;

pub use client_impl::ResponsesClientImpl;
pub use config::{ResponsesConfig, DEFAULT_BASE_URL};
pub use factory::ResponsesClientBuilder;

use crate::services::responses::ResponsesService;

pub trait ResponsesClient: Send + Sync {
    fn responses(&self) -> &dyn ResponsesService;

    fn config(&self) -> &ResponsesConfig;
}
