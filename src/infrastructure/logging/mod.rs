//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty console output, rolling JSON files
//! - Secret scrubbing for audit error text
//! - JSON-lines audit file sink

pub mod audit;
pub mod config;
pub mod logger;
pub mod secret_scrubbing;

pub use audit::FileAuditSink;
pub use config::{LogConfig, LogFormat, RotationPolicy};
pub use logger::LoggerImpl;
pub use secret_scrubbing::SecretScrubber;
