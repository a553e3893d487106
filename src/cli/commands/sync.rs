//! Implementation of the `issue-sync sync` command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;

use super::Session;
use crate::cli::output::{count_cell, output, set_outputs, table, CommandOutput};
use crate::cli::types::SyncArgs;
use crate::domain::models::{SyncDirection, SyncOutcome};
use crate::infrastructure::github::{GitHubClient, GitHubClientConfig};
use crate::services::{SyncOrchestrator, SyncReport};

#[derive(Debug, Serialize)]
pub struct SyncOutput {
    pub direction: SyncDirection,
    pub pull: Option<SyncOutcome>,
    pub push: Option<SyncOutcome>,
    pub synced: usize,
    pub conflicts: usize,
    pub conflicts_path: PathBuf,
}

impl SyncOutput {
    pub fn new(report: &SyncReport, conflicts_path: PathBuf) -> Self {
        Self {
            direction: report.direction,
            pull: report.pull,
            push: report.push,
            synced: report.synced(),
            conflicts: report.conflicts(),
            conflicts_path,
        }
    }
}

impl CommandOutput for SyncOutput {
    fn to_human(&self) -> String {
        let mut summary = table(&["Phase", "Synced", "Conflicts"]);
        for (phase, outcome) in [("pull", self.pull), ("push", self.push)] {
            if let Some(outcome) = outcome {
                summary.add_row(vec![
                    phase.into(),
                    count_cell(outcome.synced),
                    count_cell(outcome.conflicts),
                ]);
            }
        }
        summary.add_row(vec![
            "total".into(),
            count_cell(self.synced),
            count_cell(self.conflicts),
        ]);

        let mut lines = vec![
            format!("{} ({})", style("Sync complete").green().bold(), self.direction),
            summary.to_string(),
        ];
        if self.conflicts > 0 {
            lines.push(format!(
                "{} {} conflicts need attention. See {}/",
                style("!").yellow().bold(),
                self.conflicts,
                self.conflicts_path.display()
            ));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: SyncArgs, config_file: Option<&Path>, json_mode: bool) -> Result<()> {
    let session = Session::start(config_file, &args.overrides()).await?;
    let settings = &session.settings;

    let tracker = GitHubClient::new(GitHubClientConfig::from_settings(settings))
        .context("Failed to create GitHub client")?;
    let orchestrator = SyncOrchestrator::new(
        Arc::new(tracker),
        Arc::new(session.store()),
        Arc::clone(&session.logger),
        settings.conflict_strategy,
    );

    session
        .logger
        .info(&format!(
            "Syncing {} ({}, conflicts: {})",
            settings.repository, settings.direction, settings.conflict_strategy
        ))
        .await;
    let report = orchestrator.run(settings.direction).await?;

    set_outputs(
        &[
            ("synced-count", report.synced().to_string()),
            ("conflicts-count", report.conflicts().to_string()),
        ],
        json_mode,
    )?;
    output(
        &SyncOutput::new(&report, settings.conflicts_path.clone()),
        json_mode,
    );
    Ok(())
}
