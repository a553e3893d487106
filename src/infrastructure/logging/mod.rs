//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - Pretty, JSON or Actions-friendly console output
//! - Optional JSON log file
//! - Secret scrubbing
//! - Adapters for the `Logger` port

pub mod config;
pub mod logger;
pub mod secret_scrubbing;
pub mod sync_logger;

pub use config::{LogConfig, LogFormat};
pub use logger::LoggerImpl;
pub use secret_scrubbing::SecretScrubber;
pub use sync_logger::{ActionsLogger, LogEntry, MemoryLogger, TracingLogger};
