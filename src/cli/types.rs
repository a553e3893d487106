//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::infrastructure::config::{ConfigOverrides, LoggingOverrides};

#[derive(Parser, Debug)]
#[command(name = "issue-sync")]
#[command(about = "Sync GitHub issues with Markdown files", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .github/issue-sync.yaml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synchronize issues between GitHub and the local tree
    Sync(SyncArgs),

    /// Validate configuration and every local issue file
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct SyncArgs {
    /// Which phases to run: pull, push or both
    #[arg(short, long, value_name = "DIRECTION")]
    pub direction: Option<String>,

    /// What to do when a pull finds diverged versions: fail, create-files or overwrite
    #[arg(long, value_name = "STRATEGY")]
    pub conflict_strategy: Option<String>,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,
}

/// Flags shared by every command that loads settings.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Issues directory, relative to the workspace
    #[arg(long, value_name = "PATH")]
    pub issues_path: Option<String>,

    /// Conflict artifacts directory, relative to the workspace
    #[arg(long, value_name = "PATH")]
    pub conflicts_path: Option<String>,

    /// Workspace root
    #[arg(short, long, value_name = "DIR")]
    pub workspace: Option<String>,

    /// Repository as owner/name
    #[arg(short, long, value_name = "OWNER/NAME")]
    pub repository: Option<String>,

    /// GitHub API root
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log format (pretty, json, github)
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<String>,
}

impl SettingsArgs {
    /// Command-line layer of the configuration.
    ///
    /// Only flags that were given are set, so lower layers keep their values.
    /// The token is never taken from the command line.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            issues_path: self.issues_path.clone(),
            conflicts_path: self.conflicts_path.clone(),
            workspace: self.workspace.clone(),
            repository: self.repository.clone(),
            api_url: self.api_url.clone(),
            debug: self.debug.then_some(true),
            logging: LoggingOverrides {
                level: self.log_level.clone(),
                format: self.log_format.clone(),
            },
            ..ConfigOverrides::default()
        }
    }
}

impl SyncArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            sync_direction: self.direction.clone(),
            conflict_strategy: self.conflict_strategy.clone(),
            ..self.settings.overrides()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_flags_become_overrides() {
        let cli = Cli::parse_from([
            "issue-sync",
            "sync",
            "--direction",
            "pull",
            "--conflict-strategy",
            "overwrite",
            "--issues-path",
            "docs/issues",
            "--debug",
        ]);
        let Commands::Sync(args) = cli.command else {
            panic!("expected sync command");
        };

        let overrides = args.overrides();
        assert_eq!(overrides.sync_direction.as_deref(), Some("pull"));
        assert_eq!(overrides.conflict_strategy.as_deref(), Some("overwrite"));
        assert_eq!(overrides.issues_path.as_deref(), Some("docs/issues"));
        assert_eq!(overrides.debug, Some(true));
        assert!(overrides.repository.is_none());
    }

    #[test]
    fn test_absent_debug_flag_does_not_override() {
        let cli = Cli::parse_from(["issue-sync", "check", "--json", "-c", "sync.yaml"]);
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("sync.yaml")));
        let Commands::Check(args) = cli.command else {
            panic!("expected check command");
        };
        assert_eq!(args.settings.overrides().debug, None);
    }

    #[test]
    fn test_command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
