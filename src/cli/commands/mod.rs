//! CLI command implementations.

pub mod check;
pub mod sync;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::domain::models::SyncSettings;
use crate::domain::ports::Logger;
use crate::infrastructure::config::{ConfigLoader, ConfigOverrides};
use crate::infrastructure::logging::{
    ActionsLogger, LogConfig, LogFormat, LoggerImpl, TracingLogger,
};
use crate::infrastructure::store::FsIssueStore;

/// Settings and diagnostics shared by every command.
pub struct Session {
    pub settings: SyncSettings,
    pub logger: Arc<dyn Logger>,
    _tracing: LoggerImpl,
}

impl Session {
    /// Load configuration, install logging and mask the token.
    pub async fn start(config_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let settings = ConfigLoader::load(config_file, overrides)?;
        let log_config = LogConfig::from_settings(&settings.logging, settings.debug);
        let tracing = LoggerImpl::init(&log_config)?;

        let logger: Arc<dyn Logger> = match log_config.format {
            LogFormat::Github => Arc::new(ActionsLogger::new(settings.debug)),
            LogFormat::Pretty | LogFormat::Json => Arc::new(TracingLogger::new(settings.debug)),
        };
        logger.mask(&settings.github_token).await;
        logger
            .debug(&format!("Loaded settings: {settings:?}"))
            .await;

        Ok(Self {
            settings,
            logger,
            _tracing: tracing,
        })
    }

    pub fn store(&self) -> FsIssueStore {
        FsIssueStore::new(
            &self.settings.workspace,
            &self.settings.issues_path,
            &self.settings.conflicts_path,
        )
    }
}
