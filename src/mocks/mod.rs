//! Mock implementations for testing
//!
//! Stand-ins for the transport boundary so services and streams can be
//! exercised without HTTP.

mod mock_transport;

pub use mock_transport::{MockHttpTransport, MockRequest};
