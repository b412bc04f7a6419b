//! Structured logging setup.
//!
//! The crate itself only emits `tracing` events; installing a subscriber is
//! left to the application, which can use [`LoggingConfig`] for a sensible
//! default.

mod logging;

pub use logging::{LogFormat, LogLevel, LoggingConfig};
