//! Integration tests for phase ordering and reporting.

mod common;

use std::sync::Arc;

use common::{remote_issue, Call, FakeTracker, Workspace, CONFLICTS_DIR};
use issue_sync::domain::models::{decode, ConflictStrategy, SyncDirection, SyncOutcome};
use issue_sync::domain::ports::Level;
use issue_sync::services::SyncOrchestrator;
use issue_sync::SyncError;

fn orchestrator(
    ws: &Workspace,
    tracker: &Arc<FakeTracker>,
    strategy: ConflictStrategy,
) -> SyncOrchestrator {
    SyncOrchestrator::new(tracker.clone(), ws.store.clone(), ws.logger.clone(), strategy)
}

#[tokio::test]
async fn test_both_runs_pull_before_push() {
    let ws = Workspace::new();
    ws.write(
        ".github/issues/open/local-only.md",
        "---\nstatus: open\n---\n\n# Local only\n\nWritten offline.\n",
    );
    let tracker = FakeTracker::with_issues(vec![remote_issue(
        5,
        "Foo",
        "remote body",
        "2024-03-01T00:00:00Z",
    )]);

    let report = orchestrator(&ws, &tracker, ConflictStrategy::CreateFiles)
        .run(SyncDirection::Both)
        .await
        .unwrap();

    assert_eq!(report.direction, SyncDirection::Both);
    assert_eq!(report.pull, Some(SyncOutcome::new(1, 0)));
    assert_eq!(report.push, Some(SyncOutcome::new(2, 0)));
    assert_eq!(report.synced(), 3);
    assert_eq!(report.conflicts(), 0);

    let calls = tracker.calls();
    assert_eq!(calls[0], Call::ListIssues);
    // Push sees the file pull just wrote and updates it; the local-only
    // file is created.
    assert_eq!(tracker.updates().len(), 1);
    assert_eq!(tracker.updates()[0].0, 5);
    assert_eq!(tracker.creates().len(), 1);
    assert_eq!(tracker.creates()[0].title, "Local only");
    assert_eq!(
        decode(&ws.read(".github/issues/open/local-only.md"))
            .unwrap()
            .remote_id,
        Some(99)
    );
}

#[tokio::test]
async fn test_pull_only_never_writes_remote() {
    let ws = Workspace::new();
    ws.write(".github/issues/open/local-only.md", "# Local only\n");
    let tracker = FakeTracker::with_issues(vec![remote_issue(5, "Foo", "", "2024-03-01T00:00:00Z")]);

    let report = orchestrator(&ws, &tracker, ConflictStrategy::CreateFiles)
        .run(SyncDirection::Pull)
        .await
        .unwrap();

    assert_eq!(report.push, None);
    assert_eq!(report.synced(), 1);
    assert!(tracker.creates().is_empty());
    assert!(tracker.updates().is_empty());
}

#[tokio::test]
async fn test_push_only_never_lists_issues() {
    let ws = Workspace::new();
    ws.write(".github/issues/open/local-only.md", "# Local only\n");
    let tracker = FakeTracker::new();

    let report = orchestrator(&ws, &tracker, ConflictStrategy::CreateFiles)
        .run(SyncDirection::Push)
        .await
        .unwrap();

    assert_eq!(report.pull, None);
    assert_eq!(report.push, Some(SyncOutcome::new(1, 0)));
    assert_eq!(tracker.count(&Call::ListIssues), 0);
}

#[tokio::test]
async fn test_conflicts_are_reported_with_the_conflicts_directory() {
    let ws = Workspace::new();
    ws.write(
        ".github/issues/open/5-foo.md",
        "---\ngithub_id: 5\nstatus: open\nupdated_at: 2024-02-01T00:00:00Z\n---\n\n# Foo\n\nlocal edit\n",
    );
    let tracker = FakeTracker::with_issues(vec![remote_issue(
        5,
        "Foo",
        "remote body",
        "2024-03-01T00:00:00Z",
    )]);

    let report = orchestrator(&ws, &tracker, ConflictStrategy::CreateFiles)
        .run(SyncDirection::Pull)
        .await
        .unwrap();

    assert_eq!(report.conflicts(), 1);
    assert!(ws
        .logger
        .contains(Level::Warn, "1 conflicts detected. Check .conflicts/ for resolution files."));
}

#[tokio::test]
async fn test_fail_conflict_stops_the_run_before_push() {
    let ws = Workspace::new();
    ws.write(
        ".github/issues/open/5-foo.md",
        "---\ngithub_id: 5\nstatus: open\nupdated_at: 2024-02-01T00:00:00Z\n---\n\n# Foo\n\nlocal edit\n",
    );
    ws.write(".github/issues/open/local-only.md", "# Local only\n");
    let tracker = FakeTracker::with_issues(vec![remote_issue(
        5,
        "Foo",
        "remote body",
        "2024-03-01T00:00:00Z",
    )]);

    let err = orchestrator(&ws, &tracker, ConflictStrategy::Fail)
        .run(SyncDirection::Both)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Conflict { .. }));
    assert!(tracker.creates().is_empty());
    assert!(tracker.updates().is_empty());
}

#[tokio::test]
async fn test_repeated_sync_without_edits_stays_conflict_free() {
    let ws = Workspace::new();
    let body = "    let x = 1;\n\nPanics here.";
    let tracker = FakeTracker::with_issues(vec![remote_issue(
        5,
        "Crash",
        body,
        "2024-03-01T00:00:00Z",
    )]);
    let sync = orchestrator(&ws, &tracker, ConflictStrategy::CreateFiles);

    for _ in 0..3 {
        let report = sync.run(SyncDirection::Both).await.unwrap();
        assert_eq!(report.conflicts(), 0);
    }

    assert!(ws.files_in(CONFLICTS_DIR).is_empty());
    let updates = tracker.updates();
    assert_eq!(updates.len(), 3);
    assert!(updates.iter().all(|(number, draft)| *number == 5 && draft.body == body));
    assert_eq!(
        decode(&ws.read(".github/issues/open/5-crash.md")).unwrap().body,
        body
    );
}
