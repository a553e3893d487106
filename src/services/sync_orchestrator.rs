//! Runs the configured sync phases in order.

use std::sync::Arc;

use serde::Serialize;

use super::pull_sync::PullSynchronizer;
use super::push_sync::PushSynchronizer;
use crate::domain::errors::SyncResult;
use crate::domain::models::{ConflictStrategy, SyncDirection, SyncOutcome};
use crate::domain::ports::{IssueStore, IssueTracker, Logger};

/// Tallies of a finished run, one per phase that ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub direction: SyncDirection,
    pub pull: Option<SyncOutcome>,
    pub push: Option<SyncOutcome>,
}

impl SyncReport {
    pub fn total(&self) -> SyncOutcome {
        self.pull.unwrap_or_default() + self.push.unwrap_or_default()
    }

    pub fn synced(&self) -> usize {
        self.total().synced
    }

    pub fn conflicts(&self) -> usize {
        self.total().conflicts
    }
}

/// Pull then push, as selected by [`SyncDirection`].
///
/// The phases never overlap: push reads what pull has just written.
pub struct SyncOrchestrator {
    tracker: Arc<dyn IssueTracker>,
    store: Arc<dyn IssueStore>,
    logger: Arc<dyn Logger>,
    strategy: ConflictStrategy,
}

impl SyncOrchestrator {
    pub fn new(
        tracker: Arc<dyn IssueTracker>,
        store: Arc<dyn IssueStore>,
        logger: Arc<dyn Logger>,
        strategy: ConflictStrategy,
    ) -> Self {
        Self {
            tracker,
            store,
            logger,
            strategy,
        }
    }

    pub async fn run(&self, direction: SyncDirection) -> SyncResult<SyncReport> {
        let mut report = SyncReport {
            direction,
            ..SyncReport::default()
        };

        if direction.includes_pull() {
            let pull = PullSynchronizer::new(
                Arc::clone(&self.tracker),
                Arc::clone(&self.store),
                self.strategy,
                Arc::clone(&self.logger),
            );
            report.pull = Some(pull.run().await?);
        }

        if direction.includes_push() {
            let push = PushSynchronizer::new(
                Arc::clone(&self.tracker),
                Arc::clone(&self.store),
                Arc::clone(&self.logger),
            );
            report.push = Some(push.run().await?);
        }

        let total = report.total();
        self.logger
            .info(&format!(
                "Sync complete: {} synced, {} conflicts",
                total.synced, total.conflicts
            ))
            .await;
        if total.conflicts > 0 {
            self.logger
                .warn(&format!(
                    "{} conflicts detected. Check {}/ for resolution files.",
                    total.conflicts,
                    self.store.conflicts_dir().display()
                ))
                .await;
        }

        Ok(report)
    }
}
