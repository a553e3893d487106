use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::models::{IssueComment, IssueRecord, IssueStatus};

/// Error returned by remote tracker operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The call failed; `message` carries the status and body when the
    /// failure was an HTTP response.
    #[error("{operation} failed: {message}")]
    Request { operation: String, message: String },
}

impl TrackerError {
    pub fn request(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Request {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Result type for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;

/// An issue as reported by the remote tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIssue {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: IssueStatus,
    /// Label names
    pub labels: Vec<String>,
    /// Assignee logins
    pub assignees: Vec<String>,
    pub author: String,
    /// Milestone title
    pub milestone: Option<String>,
    pub html_url: String,
    pub comment_count: u64,
    /// The issues listing also returns pull requests; they carry this marker.
    pub is_pull_request: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RemoteIssue {
    /// Convert into the canonical record, attaching its comment thread.
    pub fn into_record(self, comments: Vec<RemoteComment>) -> IssueRecord {
        IssueRecord {
            remote_id: Some(self.number),
            title: self.title,
            body: self.body.unwrap_or_default(),
            status: self.state,
            labels: self.labels,
            assignees: self.assignees,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
            author: Some(self.author),
            milestone: self.milestone,
            url: Some(self.html_url),
            comments: comments.into_iter().map(IssueComment::from).collect(),
        }
    }
}

/// A comment on a remote issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteComment {
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RemoteComment> for IssueComment {
    fn from(comment: RemoteComment) -> Self {
        Self {
            author: comment.author,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            body: comment.body,
        }
    }
}

/// A milestone, needed to resolve milestone titles into numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub number: u64,
    pub title: String,
}

/// Attributes sent when creating or updating an issue.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IssueDraft {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    /// `None` leaves the state untouched; creation always opens the issue.
    pub state: Option<IssueStatus>,
    /// Resolved milestone number; `None` omits the milestone.
    pub milestone: Option<u64>,
}

impl IssueDraft {
    /// Draft carrying the editable attributes of `record`.
    pub fn from_record(record: &IssueRecord) -> Self {
        Self {
            title: record.title.clone(),
            body: record.body.clone(),
            labels: record.labels.clone(),
            assignees: record.assignees.clone(),
            state: Some(record.status),
            milestone: None,
        }
    }
}

/// Port for the remote issue tracker.
///
/// Listing operations return the complete collection; adapters handle
/// pagination.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// All issues in every state, newest-created first. May include pull
    /// requests.
    async fn list_issues(&self) -> TrackerResult<Vec<RemoteIssue>>;

    /// Comment thread of issue `number`, oldest first.
    async fn list_comments(&self, number: u64) -> TrackerResult<Vec<RemoteComment>>;

    /// All milestones in every state.
    async fn list_milestones(&self) -> TrackerResult<Vec<Milestone>>;

    async fn create_issue(&self, draft: &IssueDraft) -> TrackerResult<RemoteIssue>;

    async fn update_issue(&self, number: u64, draft: &IssueDraft) -> TrackerResult<RemoteIssue>;
}
