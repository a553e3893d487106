//! Remote → local synchronization.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use super::conflict_resolver::{is_conflict, Conflict, ConflictResolver};
use crate::domain::errors::{SyncError, SyncResult};
use crate::domain::models::{
    encode, issue_file_name, render_content, ConflictStrategy, ParsedDocument, SyncOutcome,
};
use crate::domain::ports::{IssueStore, IssueTracker, Level, Logger, RemoteIssue};

/// What happened to a single pulled issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PullItem {
    Written,
    Conflict,
}

/// Writes every remote issue into the local tree.
pub struct PullSynchronizer {
    tracker: Arc<dyn IssueTracker>,
    store: Arc<dyn IssueStore>,
    resolver: ConflictResolver,
    logger: Arc<dyn Logger>,
}

impl PullSynchronizer {
    pub fn new(
        tracker: Arc<dyn IssueTracker>,
        store: Arc<dyn IssueStore>,
        strategy: ConflictStrategy,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let resolver = ConflictResolver::new(Arc::clone(&store), Arc::clone(&logger), strategy);
        Self {
            tracker,
            store,
            resolver,
            logger,
        }
    }

    /// Pull every issue, newest-created first.
    ///
    /// Per-issue failures are logged and skipped. A listing failure or a
    /// conflict under the `fail` strategy aborts the run.
    pub async fn run(&self) -> SyncResult<SyncOutcome> {
        self.logger.info("Pulling issues from GitHub").await;
        self.store.ensure_layout().await?;

        let issues = self.tracker.list_issues().await?;
        self.logger
            .debug(&format!("Fetched {} issues", issues.len()))
            .await;

        let mut outcome = SyncOutcome::default();
        for issue in issues {
            if issue.is_pull_request {
                self.logger
                    .debug(&format!("Skipping pull request #{}", issue.number))
                    .await;
                continue;
            }

            let number = issue.number;
            match self.pull_issue(issue).await {
                Ok(PullItem::Written) => outcome.synced += 1,
                Ok(PullItem::Conflict) => outcome.conflicts += 1,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    let mut fields = HashMap::new();
                    fields.insert("issue".to_string(), json!(number));
                    self.logger
                        .log(
                            Level::Error,
                            &format!("Failed to sync issue #{number}: {err}"),
                            fields,
                        )
                        .await;
                }
            }
        }

        self.logger
            .info(&format!(
                "Pull complete: {} synced, {} conflicts",
                outcome.synced, outcome.conflicts
            ))
            .await;
        Ok(outcome)
    }

    async fn pull_issue(&self, issue: RemoteIssue) -> SyncResult<PullItem> {
        let comments = if issue.comment_count > 0 {
            self.tracker.list_comments(issue.number).await?
        } else {
            Vec::new()
        };

        let number = issue.number;
        let record = issue.into_record(comments);
        let file_name = issue_file_name(number, &record.title);
        let path = self.store.issue_path(record.status, &file_name);
        let document = encode(&record).map_err(|source| SyncError::Encode {
            path: path.display().to_string(),
            source,
        })?;

        if let Some(existing) = self.store.read(&path).await? {
            let local = ParsedDocument::parse(&existing).map_err(|source| SyncError::Decode {
                path: path.display().to_string(),
                source,
            })?;

            if is_conflict(
                local.front_matter.last_modified(),
                &local.content,
                record.updated_at,
                &render_content(&record),
            ) {
                self.resolver
                    .resolve(&Conflict {
                        path: &path,
                        local_text: &existing,
                        remote_document: &document,
                    })
                    .await?;
                return Ok(PullItem::Conflict);
            }
        }

        self.store.write(&path, &document).await?;
        self.logger
            .debug(&format!("Wrote {}", path.display()))
            .await;
        Ok(PullItem::Written)
    }
}
