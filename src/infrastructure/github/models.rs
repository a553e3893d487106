//! GitHub Issues API request and response models.
//!
//! These structs map to the GitHub REST API v3 JSON payloads and are
//! converted to the port types at the client boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::IssueStatus;
use crate::domain::ports::{IssueDraft, Milestone, RemoteComment, RemoteIssue};

/// Login shown for content whose author account was deleted.
const GHOST_LOGIN: &str = "ghost";

/// An issue returned by the GitHub API.
///
/// Issues and pull requests share the endpoint; pull requests carry a
/// non-null `pull_request` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubIssue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    /// "open" or "closed"
    pub state: String,
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    #[serde(default)]
    pub assignees: Vec<GitHubUser>,
    #[serde(default)]
    pub user: Option<GitHubUser>,
    #[serde(default)]
    pub milestone: Option<GitHubMilestone>,
    pub html_url: String,
    /// Comment count
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubLabel {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubMilestone {
    pub number: u64,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubComment {
    #[serde(default)]
    pub user: Option<GitHubUser>,
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating an issue. New issues are always open.
#[derive(Debug, Clone, Serialize)]
pub struct CreateIssueRequest<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub labels: &'a [String],
    pub assignees: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
}

/// Request body for patching an issue.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateIssueRequest<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub labels: &'a [String],
    pub assignees: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
}

impl<'a> From<&'a IssueDraft> for CreateIssueRequest<'a> {
    fn from(draft: &'a IssueDraft) -> Self {
        Self {
            title: &draft.title,
            body: &draft.body,
            labels: &draft.labels,
            assignees: &draft.assignees,
            milestone: draft.milestone,
        }
    }
}

impl<'a> From<&'a IssueDraft> for UpdateIssueRequest<'a> {
    fn from(draft: &'a IssueDraft) -> Self {
        Self {
            title: &draft.title,
            body: &draft.body,
            labels: &draft.labels,
            assignees: &draft.assignees,
            state: draft.state.map(|s| s.as_str()),
            milestone: draft.milestone,
        }
    }
}

fn login(user: Option<GitHubUser>) -> String {
    user.map_or_else(|| GHOST_LOGIN.to_string(), |u| u.login)
}

impl From<GitHubIssue> for RemoteIssue {
    fn from(issue: GitHubIssue) -> Self {
        Self {
            number: issue.number,
            title: issue.title,
            body: issue.body,
            state: if issue.state == "closed" {
                IssueStatus::Closed
            } else {
                IssueStatus::Open
            },
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            assignees: issue.assignees.into_iter().map(|a| a.login).collect(),
            author: login(issue.user),
            milestone: issue.milestone.map(|m| m.title),
            html_url: issue.html_url,
            comment_count: issue.comments,
            is_pull_request: issue.pull_request.is_some(),
            created_at: issue.created_at,
            updated_at: issue.updated_at,
        }
    }
}

impl From<GitHubComment> for RemoteComment {
    fn from(comment: GitHubComment) -> Self {
        Self {
            author: login(comment.user),
            body: comment.body.unwrap_or_default(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

impl From<GitHubMilestone> for Milestone {
    fn from(milestone: GitHubMilestone) -> Self {
        Self {
            number: milestone.number,
            title: milestone.title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_issue_conversion() {
        let json = r#"{
            "id": 1,
            "number": 42,
            "title": "Fix login bug",
            "body": "Users cannot log in after the last deploy.",
            "state": "closed",
            "labels": [
                { "name": "bug", "color": "d73a4a" },
                { "name": "priority: high", "color": "e4e669" }
            ],
            "assignees": [{ "login": "octocat", "id": 1 }],
            "user": { "login": "hubot" },
            "milestone": { "number": 3, "title": "v1.0" },
            "comments": 2,
            "pull_request": null,
            "updated_at": "2024-01-15T10:30:00Z",
            "html_url": "https://github.com/org/repo/issues/42",
            "created_at": "2024-01-14T08:00:00Z"
        }"#;
        let issue: GitHubIssue = serde_json::from_str(json).unwrap();
        let remote = RemoteIssue::from(issue);

        assert_eq!(remote.number, 42);
        assert_eq!(remote.state, IssueStatus::Closed);
        assert_eq!(remote.labels, vec!["bug", "priority: high"]);
        assert_eq!(remote.assignees, vec!["octocat"]);
        assert_eq!(remote.author, "hubot");
        assert_eq!(remote.milestone.as_deref(), Some("v1.0"));
        assert_eq!(remote.comment_count, 2);
        assert!(!remote.is_pull_request);
    }

    #[test]
    fn test_minimal_issue_and_pull_request_marker() {
        let json = r#"{
            "number": 99,
            "title": "Add feature X",
            "state": "open",
            "user": null,
            "pull_request": { "url": "https://api.github.com/repos/org/repo/pulls/99" },
            "updated_at": "2024-01-10T00:00:00Z",
            "html_url": "https://github.com/org/repo/pull/99",
            "created_at": "2024-01-09T00:00:00Z"
        }"#;
        let remote = RemoteIssue::from(serde_json::from_str::<GitHubIssue>(json).unwrap());
        assert!(remote.is_pull_request);
        assert!(remote.body.is_none());
        assert_eq!(remote.author, "ghost");
        assert_eq!(remote.state, IssueStatus::Open);
    }

    #[test]
    fn test_update_request_serialization() {
        let draft = IssueDraft {
            title: "T".into(),
            body: "B".into(),
            labels: vec!["bug".into()],
            assignees: vec![],
            state: Some(IssueStatus::Closed),
            milestone: None,
        };
        let value = serde_json::to_value(UpdateIssueRequest::from(&draft)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "title": "T",
                "body": "B",
                "labels": ["bug"],
                "assignees": [],
                "state": "closed"
            })
        );

        let create = serde_json::to_value(CreateIssueRequest::from(&draft)).unwrap();
        assert!(create.get("state").is_none());
        assert!(create.get("milestone").is_none());
    }
}
