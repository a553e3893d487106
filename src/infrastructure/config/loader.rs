use std::path::{Component, Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::Serialize;
use thiserror::Error;

use crate::domain::models::config::{Config, SyncSettings};
use crate::domain::models::{ConflictStrategy, Repository, SyncDirection};

/// Configuration file read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = ".github/issue-sync.yaml";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 3] = ["pretty", "json", "github"];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    MissingFile(PathBuf),

    #[error("Failed to load configuration: {0}")]
    Load(#[source] Box<figment::Error>),

    #[error("Input validation failed:\n- {}", .0.join("\n- "))]
    Invalid(Vec<String>),
}

/// Values supplied on the command line; `None` leaves lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    pub logging: LoggingOverrides,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LoggingOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. YAML file (`config_file`, else [`DEFAULT_CONFIG_FILE`] when present)
    /// 3. `GITHUB_TOKEN`, `GITHUB_REPOSITORY`, `GITHUB_API_URL`
    /// 4. `ISSUE_SYNC_*` variables (`__` separates nested keys)
    /// 5. Actions inputs (`INPUT_*`)
    /// 6. Command-line overrides
    pub fn load(
        config_file: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<SyncSettings, ConfigError> {
        let config = Self::extract(config_file, overrides)?;
        Self::validate(&config)
    }

    /// Merge every layer into a raw [`Config`] without validating it.
    pub fn extract(
        config_file: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Config, ConfigError> {
        let file = match config_file {
            Some(path) if !path.exists() => {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(file))
            .merge(Env::raw().only(&["GITHUB_TOKEN"]).map(|_| "github-token".into()))
            .merge(Env::raw().only(&["GITHUB_REPOSITORY"]).map(|_| "repository".into()))
            .merge(Env::raw().only(&["GITHUB_API_URL"]).map(|_| "api-url".into()))
            .merge(Env::prefixed("ISSUE_SYNC_").map(|key| {
                key.as_str()
                    .to_ascii_lowercase()
                    .replace("__", ".")
                    .replace('_', "-")
                    .into()
            }))
            .merge(Env::prefixed("INPUT_").map(|key| key.as_str().to_ascii_lowercase().into()))
            .merge(Serialized::defaults(overrides))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Validate a raw configuration, reporting every problem at once.
    ///
    /// Blank strings fall back to their defaults, since unset Actions inputs
    /// arrive as empty values.
    pub fn validate(config: &Config) -> Result<SyncSettings, ConfigError> {
        let defaults = Config::default();
        let mut errors = Vec::new();

        let direction = collect(
            &mut errors,
            or_default(&config.sync_direction, &defaults.sync_direction).parse::<SyncDirection>(),
        );
        let conflict_strategy = collect(
            &mut errors,
            or_default(&config.conflict_strategy, &defaults.conflict_strategy)
                .parse::<ConflictStrategy>(),
        );
        let issues_path = collect(
            &mut errors,
            relative_path(
                "Issues path",
                or_default(&config.issues_path, &defaults.issues_path),
            ),
        );
        let conflicts_path = collect(
            &mut errors,
            relative_path(
                "Conflicts path",
                or_default(&config.conflicts_path, &defaults.conflicts_path),
            ),
        );

        let github_token = config.github_token.trim();
        if github_token.is_empty() {
            errors.push("GitHub token is required".to_string());
        }

        let repository = if config.repository.trim().is_empty() {
            errors.push("Repository is required (owner/name)".to_string());
            None
        } else {
            collect(&mut errors, config.repository.parse::<Repository>())
        };

        let api_url = or_default(&config.api_url, &defaults.api_url);
        if !(api_url.starts_with("https://") || api_url.starts_with("http://")) {
            errors.push(format!("Invalid API URL: {api_url}. Must start with http:// or https://"));
        }

        let level = or_default(&config.logging.level, &defaults.logging.level);
        if !LOG_LEVELS.contains(&level) {
            errors.push(format!(
                "Invalid log level: {level}. Must be one of: {}",
                LOG_LEVELS.join(", ")
            ));
        }
        let format = or_default(&config.logging.format, &defaults.logging.format);
        if !LOG_FORMATS.contains(&format) {
            errors.push(format!(
                "Invalid log format: {format}. Must be one of: {}",
                LOG_FORMATS.join(", ")
            ));
        }

        if config.rate_limit.requests_per_hour == 0 {
            errors.push("Invalid rate limit: requests-per-hour must be positive".to_string());
        }
        if config.retry.initial_backoff_ms == 0
            || config.retry.initial_backoff_ms > config.retry.max_backoff_ms
        {
            errors.push(format!(
                "Invalid backoff configuration: initial-backoff-ms ({}) must be positive and at most max-backoff-ms ({})",
                config.retry.initial_backoff_ms, config.retry.max_backoff_ms
            ));
        }
        if config.timeout_secs == 0 {
            errors.push("Invalid timeout: timeout-secs must be positive".to_string());
        }

        let (Some(direction), Some(conflict_strategy), Some(issues_path), Some(conflicts_path), Some(repository), true) = (
            direction,
            conflict_strategy,
            issues_path,
            conflicts_path,
            repository,
            errors.is_empty(),
        ) else {
            return Err(ConfigError::Invalid(errors));
        };

        let mut logging = config.logging.clone();
        logging.level = level.to_string();
        logging.format = format.to_string();
        logging.log_dir = logging.log_dir.filter(|dir| !dir.trim().is_empty());

        Ok(SyncSettings {
            direction,
            issues_path,
            conflict_strategy,
            conflicts_path,
            github_token: github_token.to_string(),
            repository,
            api_url: api_url.trim_end_matches('/').to_string(),
            workspace: PathBuf::from(or_default(&config.workspace, &defaults.workspace)),
            debug: config.debug,
            timeout_secs: config.timeout_secs,
            logging,
            requests_per_hour: config.rate_limit.requests_per_hour,
            retry: config.retry.clone(),
        })
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() {
        default
    } else {
        value
    }
}

fn collect<T>(errors: &mut Vec<String>, result: Result<T, String>) -> Option<T> {
    result.map_err(|e| errors.push(e)).ok()
}

fn relative_path(label: &str, value: &str) -> Result<PathBuf, String> {
    let path = Path::new(value);
    let escapes = path.is_absolute()
        || path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
    if escapes {
        return Err(format!(
            "{label} must be a relative path without parent directory references: {value}"
        ));
    }
    Ok(path.to_path_buf())
}
