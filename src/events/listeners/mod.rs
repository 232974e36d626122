//! Built-in event listeners

pub mod mock_listener;
pub mod tracing_logger;

pub use mock_listener::MockEventListener;
pub use tracing_logger::TracingEventListener;
