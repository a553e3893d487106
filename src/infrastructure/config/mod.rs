//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading
//! - `GITHUB_*`, `ISSUE_SYNC_*` and Actions `INPUT_*` overrides
//! - Aggregated validation into typed `SyncSettings`

pub mod loader;

pub use loader::{ConfigError, ConfigLoader, ConfigOverrides, LoggingOverrides, DEFAULT_CONFIG_FILE};
