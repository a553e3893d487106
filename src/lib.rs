//! issue-sync - GitHub issues ↔ Markdown synchronization
//!
//! Keeps a repository's GitHub issues and a tree of Markdown files with YAML
//! front matter in step, in both directions, and surfaces divergence as
//! conflicts instead of losing edits.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Issue records, the Markdown codec, ports and errors
//! - **Service Layer** (`services`): Pull/push synchronizers, conflict resolution, orchestration
//! - **Infrastructure Layer** (`infrastructure`): GitHub client, filesystem store, config, logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use issue_sync::infrastructure::github::{GitHubClient, GitHubClientConfig};
//! use issue_sync::infrastructure::logging::TracingLogger;
//! use issue_sync::infrastructure::store::FsIssueStore;
//! use issue_sync::services::SyncOrchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = issue_sync::ConfigLoader::load(None, &Default::default())?;
//!     let orchestrator = SyncOrchestrator::new(
//!         Arc::new(GitHubClient::new(GitHubClientConfig::from_settings(&settings))?),
//!         Arc::new(FsIssueStore::new(".", ".github/issues", ".conflicts")),
//!         Arc::new(TracingLogger::new(false)),
//!         settings.conflict_strategy,
//!     );
//!     let report = orchestrator.run(settings.direction).await?;
//!     println!("{} synced", report.synced());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    decode, encode, slugify, ConflictStrategy, IssueRecord, IssueStatus, SyncDirection,
    SyncOutcome, SyncSettings,
};
pub use domain::ports::{IssueStore, IssueTracker, Logger};
pub use domain::{SyncError, SyncResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{PullSynchronizer, PushSynchronizer, SyncOrchestrator, SyncReport};
