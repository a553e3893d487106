//! Common test utilities for integration tests
//!
//! Provides an in-memory issue tracker, a scratch workspace backed by
//! `FsIssueStore`, and helpers for building remote issues.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;

use issue_sync::domain::models::IssueStatus;
use issue_sync::domain::ports::{
    IssueDraft, IssueTracker, Milestone, RemoteComment, RemoteIssue, TrackerError, TrackerResult,
};
use issue_sync::infrastructure::logging::MemoryLogger;
use issue_sync::infrastructure::store::FsIssueStore;

pub const ISSUES_DIR: &str = ".github/issues";
pub const CONFLICTS_DIR: &str = ".conflicts";

/// Parse an RFC 3339 timestamp.
pub fn ts(s: &str) -> DateTime<Utc> {
    s.parse().expect("valid timestamp")
}

/// A remote issue with sensible defaults.
pub fn remote_issue(number: u64, title: &str, body: &str, updated_at: &str) -> RemoteIssue {
    RemoteIssue {
        number,
        title: title.to_string(),
        body: Some(body.to_string()),
        state: IssueStatus::Open,
        labels: vec![],
        assignees: vec![],
        author: "octocat".to_string(),
        milestone: None,
        html_url: format!("https://github.com/octo/widgets/issues/{number}"),
        comment_count: 0,
        is_pull_request: false,
        created_at: ts("2024-01-01T00:00:00Z"),
        updated_at: ts(updated_at),
    }
}

/// A recorded tracker call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListIssues,
    ListComments(u64),
    ListMilestones,
    Create(IssueDraft),
    Update(u64, IssueDraft),
}

/// In-memory `IssueTracker` recording every call.
pub struct FakeTracker {
    issues: Mutex<Vec<RemoteIssue>>,
    comments: Mutex<HashMap<u64, Vec<RemoteComment>>>,
    milestones: Mutex<Vec<Milestone>>,
    calls: Mutex<Vec<Call>>,
    failing_comments: Mutex<HashSet<u64>>,
    failing_updates: Mutex<HashSet<u64>>,
    fail_listing: Mutex<bool>,
    next_number: AtomicU64,
}

impl Default for FakeTracker {
    fn default() -> Self {
        Self {
            issues: Mutex::default(),
            comments: Mutex::default(),
            milestones: Mutex::default(),
            calls: Mutex::default(),
            failing_comments: Mutex::default(),
            failing_updates: Mutex::default(),
            fail_listing: Mutex::new(false),
            next_number: AtomicU64::new(99),
        }
    }
}

impl FakeTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_issues(issues: Vec<RemoteIssue>) -> Arc<Self> {
        let tracker = Self::default();
        *tracker.issues.lock().unwrap() = issues;
        Arc::new(tracker)
    }

    pub fn set_issues(&self, issues: Vec<RemoteIssue>) {
        *self.issues.lock().unwrap() = issues;
    }

    pub fn set_comments(&self, number: u64, comments: Vec<RemoteComment>) {
        self.comments.lock().unwrap().insert(number, comments);
    }

    pub fn set_milestones(&self, milestones: Vec<Milestone>) {
        *self.milestones.lock().unwrap() = milestones;
    }

    pub fn fail_comments_for(&self, number: u64) {
        self.failing_comments.lock().unwrap().insert(number);
    }

    pub fn fail_updates_for(&self, number: u64) {
        self.failing_updates.lock().unwrap().insert(number);
    }

    pub fn fail_listing(&self) {
        *self.fail_listing.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn creates(&self) -> Vec<IssueDraft> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(draft) => Some(draft),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<(u64, IssueDraft)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Update(number, draft) => Some((number, draft)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn list_issues(&self) -> TrackerResult<Vec<RemoteIssue>> {
        self.record(Call::ListIssues);
        if *self.fail_listing.lock().unwrap() {
            return Err(TrackerError::request("list issues", "HTTP 503"));
        }
        Ok(self.issues.lock().unwrap().clone())
    }

    async fn list_comments(&self, number: u64) -> TrackerResult<Vec<RemoteComment>> {
        self.record(Call::ListComments(number));
        if self.failing_comments.lock().unwrap().contains(&number) {
            return Err(TrackerError::request(
                format!("list comments for #{number}"),
                "HTTP 500",
            ));
        }
        Ok(self
            .comments
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_milestones(&self) -> TrackerResult<Vec<Milestone>> {
        self.record(Call::ListMilestones);
        Ok(self.milestones.lock().unwrap().clone())
    }

    async fn create_issue(&self, draft: &IssueDraft) -> TrackerResult<RemoteIssue> {
        self.record(Call::Create(draft.clone()));
        let number = self.next_number.fetch_add(1, Ordering::SeqCst);
        let mut issue = remote_issue(number, &draft.title, &draft.body, "2024-06-01T00:00:00Z");
        issue.created_at = ts("2024-06-01T00:00:00Z");
        issue.labels = draft.labels.clone();
        issue.assignees = draft.assignees.clone();
        self.issues.lock().unwrap().insert(0, issue.clone());
        Ok(issue)
    }

    async fn update_issue(&self, number: u64, draft: &IssueDraft) -> TrackerResult<RemoteIssue> {
        self.record(Call::Update(number, draft.clone()));
        if self.failing_updates.lock().unwrap().contains(&number) {
            return Err(TrackerError::request(
                format!("update issue #{number}"),
                "HTTP 422",
            ));
        }
        let mut issues = self.issues.lock().unwrap();
        let issue = issues
            .iter_mut()
            .find(|i| i.number == number)
            .ok_or_else(|| TrackerError::request(format!("update issue #{number}"), "HTTP 404"))?;
        issue.title = draft.title.clone();
        issue.body = Some(draft.body.clone());
        issue.labels = draft.labels.clone();
        issue.assignees = draft.assignees.clone();
        if let Some(state) = draft.state {
            issue.state = state;
        }
        issue.updated_at += Duration::minutes(1);
        Ok(issue.clone())
    }
}

/// Scratch workspace with a filesystem store and a recording logger.
pub struct Workspace {
    pub dir: TempDir,
    pub store: Arc<FsIssueStore>,
    pub logger: Arc<MemoryLogger>,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = Arc::new(FsIssueStore::new(dir.path(), ISSUES_DIR, CONFLICTS_DIR));
        Self {
            dir,
            store,
            logger: Arc::new(MemoryLogger::new()),
        }
    }

    /// Absolute path of a workspace-relative path.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn write(&self, rel: &str, text: &str) {
        let path = self.path(rel);
        std::fs::create_dir_all(path.parent().expect("file has a parent")).unwrap();
        std::fs::write(path, text).unwrap();
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).unwrap()
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    /// Sorted file names directly inside `rel`; empty when it does not exist.
    pub fn files_in(&self, rel: &str) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.path(rel)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| e.path().is_file())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn issue_path(&self, rel: &str) -> String {
        Path::new(ISSUES_DIR).join(rel).to_string_lossy().into_owned()
    }
}
