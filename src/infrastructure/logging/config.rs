use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::models::LoggingConfig;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Console output format
    pub format: LogFormat,

    /// Directory for a JSON log file (optional, console only when None)
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    /// Plain lines for the Actions log viewer; sync diagnostics go out as
    /// workflow commands.
    Github,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "github" => Ok(Self::Github),
            other => Err(format!(
                "Invalid log format: {other}. Must be one of: pretty, json, github"
            )),
        }
    }
}

impl LogConfig {
    /// Build from validated settings; `debug` raises the level to debug.
    pub fn from_settings(logging: &LoggingConfig, debug: bool) -> Self {
        let level = if debug && !matches!(logging.level.as_str(), "trace" | "debug") {
            "debug".to_string()
        } else {
            logging.level.clone()
        };

        Self {
            level,
            format: logging.format.parse().unwrap_or_default(),
            log_dir: logging.log_dir.as_ref().map(PathBuf::from),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            log_dir: None,
        }
    }
}
