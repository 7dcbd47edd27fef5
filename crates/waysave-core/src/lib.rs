//! Waysave Core - Shared infrastructure for the Save Page Now drivers
//!
//! This crate provides the HTTP client, bounded retry policy, logging
//! setup, and shutdown handling used by the waysave commands.

pub mod clock;
pub mod http;
pub mod logging;
pub mod retry;
pub mod shutdown;

// Re-exports for convenience
pub use clock::{Sleep, SystemSleep};
pub use http::{HttpConfig, HttpError, SHARED_RUNTIME, http_client, http_config, set_http_config};
pub use logging::init_logging;
pub use retry::{backoff_duration, retry_with_backoff};
pub use shutdown::{install_signal_handlers, is_shutdown_requested, shutdown_flag};
