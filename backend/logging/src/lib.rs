//! Structured logging for Appify.
//!
//! Console plus rolling NDJSON file output, and scrubbing of credentials
//! before they reach a log line or an HTTP response.

pub mod logger;
pub mod redact;

pub use logger::{init_logger, LOG_FILE_PREFIX};
pub use redact::redact_sensitive_data;
