//! Adapters for the [`Logger`] port.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use super::secret_scrubbing::SecretScrubber;
use crate::domain::ports::{Level, Logger};

fn render(message: &str, fields: &HashMap<String, Value>) -> String {
    if fields.is_empty() {
        return message.to_string();
    }
    let mut keys: Vec<&String> = fields.keys().collect();
    keys.sort();
    let rendered: Vec<String> = keys
        .into_iter()
        .map(|key| match &fields[key] {
            Value::String(s) => format!("{key}={s}"),
            other => format!("{key}={other}"),
        })
        .collect();
    format!("{message} ({})", rendered.join(", "))
}

/// Forwards to the `tracing` subscriber installed by `LoggerImpl`.
#[derive(Debug, Default)]
pub struct TracingLogger {
    scrubber: SecretScrubber,
    debug: bool,
}

impl TracingLogger {
    pub fn new(debug: bool) -> Self {
        Self {
            scrubber: SecretScrubber::new(),
            debug,
        }
    }
}

#[async_trait]
impl Logger for TracingLogger {
    async fn log(&self, level: Level, message: &str, fields: HashMap<String, Value>) {
        if level <= Level::Debug && !self.debug {
            return;
        }
        let line = self.scrubber.scrub(&render(message, &fields));
        match level {
            Level::Trace => tracing::trace!("{line}"),
            Level::Debug => tracing::debug!("{line}"),
            Level::Info => tracing::info!("{line}"),
            Level::Warn => tracing::warn!("{line}"),
            Level::Error => tracing::error!("{line}"),
        }
    }

    async fn mask(&self, secret: &str) {
        self.scrubber.mask(secret);
    }
}

/// Emits GitHub Actions workflow commands (`::warning::` and friends).
pub struct ActionsLogger {
    out: Mutex<Box<dyn Write + Send>>,
    scrubber: SecretScrubber,
    debug: bool,
}

impl ActionsLogger {
    /// Logger writing to stdout, where the runner picks commands up.
    pub fn new(debug: bool) -> Self {
        Self::with_writer(Box::new(io::stdout()), debug)
    }

    pub fn with_writer(out: Box<dyn Write + Send>, debug: bool) -> Self {
        Self {
            out: Mutex::new(out),
            scrubber: SecretScrubber::new(),
            debug,
        }
    }

    fn emit(&self, line: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        // Nowhere left to report a broken stdout.
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }
}

/// Escape a workflow command payload.
fn escape_data(text: &str) -> String {
    text.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[async_trait]
impl Logger for ActionsLogger {
    async fn log(&self, level: Level, message: &str, fields: HashMap<String, Value>) {
        if level <= Level::Debug && !self.debug {
            return;
        }
        let text = escape_data(&self.scrubber.scrub(&render(message, &fields)));
        let line = match level {
            Level::Trace | Level::Debug => format!("::debug::{text}"),
            Level::Info => text,
            Level::Warn => format!("::warning::{text}"),
            Level::Error => format!("::error::{text}"),
        };
        self.emit(&line);
    }

    async fn mask(&self, secret: &str) {
        if secret.trim().is_empty() {
            return;
        }
        self.scrubber.mask(secret);
        self.emit(&format!("::add-mask::{}", escape_data(secret)));
    }
}

/// A recorded log call.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
    pub fields: HashMap<String, Value>,
}

/// Records every entry in memory, for assertions.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages logged at exactly `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }

    /// True if some message at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.messages(level).iter().any(|m| m.contains(needle))
    }
}

#[async_trait]
impl Logger for MemoryLogger {
    async fn log(&self, level: Level, message: &str, fields: HashMap<String, Value>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogEntry {
                level,
                message: message.to_string(),
                fields,
            });
    }
}
