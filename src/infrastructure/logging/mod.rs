//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty stdout output
//! - Optional rolling JSON file output

pub mod logger;

pub use logger::{LogFormat, LoggerImpl, RotationPolicy};
