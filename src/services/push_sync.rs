//! Local → remote synchronization.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::domain::errors::{StoreError, SyncError, SyncResult};
use crate::domain::models::{IssueStatus, ParsedDocument, SyncOutcome};
use crate::domain::ports::{IssueDraft, IssueStore, IssueTracker, Level, Logger, Milestone};

/// Resolves milestone titles to numbers, listing milestones at most once.
pub struct MilestoneResolver {
    tracker: Arc<dyn IssueTracker>,
    logger: Arc<dyn Logger>,
    milestones: Option<Vec<Milestone>>,
}

impl MilestoneResolver {
    pub fn new(tracker: Arc<dyn IssueTracker>, logger: Arc<dyn Logger>) -> Self {
        Self {
            tracker,
            logger,
            milestones: None,
        }
    }

    /// Number of the milestone titled exactly `title`.
    ///
    /// A miss or a listing failure is logged as a warning and yields `None`.
    pub async fn resolve(&mut self, title: &str) -> Option<u64> {
        if self.milestones.is_none() {
            let listed = match self.tracker.list_milestones().await {
                Ok(milestones) => milestones,
                Err(err) => {
                    self.logger
                        .warn(&format!("Could not list milestones: {err}"))
                        .await;
                    Vec::new()
                }
            };
            self.milestones = Some(listed);
        }

        let number = self
            .milestones
            .iter()
            .flatten()
            .find(|m| m.title == title)
            .map(|m| m.number);

        if number.is_none() {
            self.logger
                .warn(&format!("Milestone not found: {title}"))
                .await;
        }
        number
    }
}

/// Creates or updates a remote issue for every local document.
pub struct PushSynchronizer {
    tracker: Arc<dyn IssueTracker>,
    store: Arc<dyn IssueStore>,
    logger: Arc<dyn Logger>,
}

impl PushSynchronizer {
    pub fn new(
        tracker: Arc<dyn IssueTracker>,
        store: Arc<dyn IssueStore>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            tracker,
            store,
            logger,
        }
    }

    /// Push every local document. Bound documents update their issue
    /// unconditionally; unbound ones create an issue and are rewritten with
    /// the new binding.
    ///
    /// Push has no conflict path, so the conflict count is always zero.
    pub async fn run(&self) -> SyncResult<SyncOutcome> {
        self.logger.info("Pushing local issues to GitHub").await;

        let files = self.store.list_issue_files().await?;
        self.logger
            .debug(&format!("Found {} local issue files", files.len()))
            .await;

        let mut milestones = MilestoneResolver::new(Arc::clone(&self.tracker), Arc::clone(&self.logger));
        let mut synced = 0;
        for path in &files {
            match self.push_file(path, &mut milestones).await {
                Ok(()) => synced += 1,
                Err(err) => {
                    let mut fields = HashMap::new();
                    fields.insert("path".to_string(), json!(path.display().to_string()));
                    self.logger
                        .log(
                            Level::Error,
                            &format!("Failed to push {}: {err}", path.display()),
                            fields,
                        )
                        .await;
                }
            }
        }

        self.logger
            .info(&format!("Push complete: {synced} synced"))
            .await;
        Ok(SyncOutcome::new(synced, 0))
    }

    async fn push_file(&self, path: &Path, milestones: &mut MilestoneResolver) -> SyncResult<()> {
        let display = path.display().to_string();
        let text = self.store.read(path).await?.ok_or_else(|| {
            StoreError::io(path, io::Error::new(io::ErrorKind::NotFound, "file disappeared"))
        })?;

        let document = ParsedDocument::parse(&text).map_err(|source| SyncError::Decode {
            path: display.clone(),
            source,
        })?;
        let record = document.to_record();
        record
            .validate()
            .map_err(|reason| SyncError::InvalidIssue {
                path: display.clone(),
                reason,
            })?;

        let mut draft = IssueDraft::from_record(&record);
        if let Some(title) = record.milestone.as_deref() {
            draft.milestone = milestones.resolve(title).await;
        }

        if let Some(number) = record.remote_id {
            self.tracker.update_issue(number, &draft).await?;
            self.logger
                .info(&format!("Updated issue #{number} from {display}"))
                .await;
            return Ok(());
        }

        let created = self
            .tracker
            .create_issue(&IssueDraft {
                state: None,
                ..draft.clone()
            })
            .await?;
        let number = created.number;

        let mut bound = document;
        bound.front_matter.github_id = Some(number);
        bound.front_matter.url = Some(created.html_url);
        bound.front_matter.created_at = Some(created.created_at);
        bound.front_matter.updated_at = Some(created.updated_at);
        let rewritten = bound.render().map_err(|source| SyncError::Encode {
            path: display.clone(),
            source,
        })?;
        self.store.write(path, &rewritten).await?;
        self.logger
            .info(&format!("Created issue #{number} from {display}"))
            .await;

        // New issues always open; close it to match the document.
        if record.status == IssueStatus::Closed {
            self.tracker.update_issue(number, &draft).await?;
            self.logger
                .debug(&format!("Closed issue #{number}"))
                .await;
        }

        Ok(())
    }
}
