use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Log level enumeration for structured logging
///
/// Levels are ordered from most verbose (Trace) to most severe (Error).
///
/// # Examples
///
/// ```
/// use issue_sync::domain::ports::Level;
///
/// assert!(Level::Error > Level::Info);
/// assert_eq!(Level::Warn.as_str(), "WARN");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Most verbose level
    Trace,
    /// Diagnostics, shown when debug output is enabled
    Debug,
    /// Progress of a normal run
    Info,
    /// Something was skipped or degraded but the run continues
    Warn,
    /// A failure the run reports
    Error,
}

impl Level {
    /// Returns the string representation of the log level
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

/// Port for the diagnostics a sync run emits.
///
/// The synchronizers only talk to this trait, so the same code path can log
/// through `tracing`, through workflow commands understood by the Actions
/// runner, or into memory for assertions.
///
/// Implementations must be `Send + Sync`; the synchronizers hold them behind
/// an `Arc<dyn Logger>`.
///
/// # Examples
///
/// ```
/// use issue_sync::domain::ports::{Level, Logger};
/// use serde_json::json;
/// use std::collections::HashMap;
///
/// async fn report(logger: &dyn Logger, path: &str) {
///     let mut fields = HashMap::new();
///     fields.insert("path".to_string(), json!(path));
///     logger.log(Level::Info, "Wrote issue file", fields).await;
///     logger.warn("Milestone not found").await;
/// }
/// ```
#[async_trait]
pub trait Logger: Send + Sync {
    /// Log a message with a specific level and structured fields
    async fn log(&self, level: Level, message: &str, fields: HashMap<String, Value>);

    /// Register a value that must never appear in output.
    ///
    /// The default does nothing; loggers writing to a shared console
    /// override it.
    async fn mask(&self, _secret: &str) {}

    /// Log a trace-level message
    async fn trace(&self, message: &str) {
        self.log(Level::Trace, message, HashMap::new()).await;
    }

    /// Log a debug-level message
    async fn debug(&self, message: &str) {
        self.log(Level::Debug, message, HashMap::new()).await;
    }

    /// Log an info-level message
    async fn info(&self, message: &str) {
        self.log(Level::Info, message, HashMap::new()).await;
    }

    /// Log a warning
    async fn warn(&self, message: &str) {
        self.log(Level::Warn, message, HashMap::new()).await;
    }

    /// Log an error
    async fn error(&self, message: &str) {
        self.log(Level::Error, message, HashMap::new()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_level_as_str() {
        assert_eq!(Level::Trace.as_str(), "TRACE");
        assert_eq!(Level::Error.as_str(), "ERROR");
    }
}
