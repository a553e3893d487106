use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::sync::{ConflictStrategy, SyncDirection};

/// Raw configuration as merged from defaults, files and the environment.
///
/// Every option is kept as supplied; [`SyncSettings`] is the validated form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// pull, push or both
    #[serde(default = "default_sync_direction")]
    pub sync_direction: String,

    /// Issues directory, relative to the workspace
    #[serde(default = "default_issues_path")]
    pub issues_path: String,

    /// fail, create-files or overwrite
    #[serde(default = "default_conflict_strategy")]
    pub conflict_strategy: String,

    /// Directory receiving conflict artifacts, relative to the workspace
    #[serde(default = "default_conflicts_path")]
    pub conflicts_path: String,

    #[serde(default)]
    pub github_token: String,

    /// `owner/name`
    #[serde(default)]
    pub repository: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Root the relative paths are resolved against
    #[serde(default = "default_workspace")]
    pub workspace: String,

    #[serde(default, deserialize_with = "deserialize_flag")]
    pub debug: bool,

    /// HTTP request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_sync_direction() -> String {
    SyncDirection::default().as_str().to_string()
}

fn default_issues_path() -> String {
    ".github/issues".to_string()
}

fn default_conflict_strategy() -> String {
    ConflictStrategy::default().as_str().to_string()
}

fn default_conflicts_path() -> String {
    ".conflicts".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_workspace() -> String {
    ".".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sync_direction: default_sync_direction(),
            issues_path: default_issues_path(),
            conflict_strategy: default_conflict_strategy(),
            conflicts_path: default_conflicts_path(),
            github_token: String::new(),
            repository: String::new(),
            api_url: default_api_url(),
            workspace: default_workspace(),
            debug: false,
            timeout_secs: default_timeout_secs(),
            logging: LoggingConfig::default(),
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: pretty, json or github
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Optional directory for a JSON log file
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RateLimitConfig {
    /// Authenticated GitHub budget
    #[serde(default = "default_requests_per_hour")]
    pub requests_per_hour: u32,
}

const fn default_requests_per_hour() -> u32 {
    5_000
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_hour: default_requests_per_hour(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryConfig {
    /// Retries after the first attempt; 0 disables retrying
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    1_000
}

const fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Accepts booleans, integers and the strings Actions inputs arrive as.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Int(value) => Ok(value != 0),
        Flag::Text(text) => match text.trim().to_lowercase().as_str() {
            "" | "false" | "0" | "no" | "off" => Ok(false),
            "true" | "1" | "yes" | "on" => Ok(true),
            other => Err(de::Error::custom(format!("invalid boolean: {other}"))),
        },
    }
}

/// GitHub repository coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl FromStr for Repository {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(format!("Invalid repository: {s}. Expected owner/name")),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Validated, typed configuration for a sync run.
#[derive(Clone)]
pub struct SyncSettings {
    pub direction: SyncDirection,
    pub issues_path: PathBuf,
    pub conflict_strategy: ConflictStrategy,
    pub conflicts_path: PathBuf,
    pub github_token: String,
    pub repository: Repository,
    pub api_url: String,
    pub workspace: PathBuf,
    pub debug: bool,
    pub timeout_secs: u64,
    pub logging: LoggingConfig,
    pub requests_per_hour: u32,
    pub retry: RetryConfig,
}

impl fmt::Debug for SyncSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncSettings")
            .field("direction", &self.direction)
            .field("issues_path", &self.issues_path)
            .field("conflict_strategy", &self.conflict_strategy)
            .field("conflicts_path", &self.conflicts_path)
            .field("github_token", &"[REDACTED]")
            .field("repository", &self.repository)
            .field("api_url", &self.api_url)
            .field("workspace", &self.workspace)
            .field("debug", &self.debug)
            .field("timeout_secs", &self.timeout_secs)
            .field("logging", &self.logging)
            .field("requests_per_hour", &self.requests_per_hour)
            .field("retry", &self.retry)
            .finish()
    }
}
