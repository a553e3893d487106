//! Issue record model.
//!
//! [`IssueRecord`] is the unit of synchronization: the same shape is produced
//! by decoding a local Markdown file and by converting a remote issue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Title used when a document carries no level-1 heading.
pub const UNTITLED_ISSUE: &str = "Untitled Issue";

/// Maximum length of the slug part of an issue file name.
pub const SLUG_MAX_LEN: usize = 50;

/// Issue state on both sides of the sync.
///
/// The status also selects the subdirectory (`open/` or `closed/`) a
/// document lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    #[default]
    Open,
    Closed,
}

impl IssueStatus {
    /// Returns the wire and front-matter representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Name of the subdirectory holding documents with this status.
    pub const fn dir_name(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(format!(
                "Invalid issue status: {other}. Must be one of: open, closed"
            )),
        }
    }
}

/// A comment on a remote issue.
///
/// Comments are rendered into the document on pull and never pushed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
}

impl IssueComment {
    /// True when the comment was edited after it was posted.
    pub fn was_edited(&self) -> bool {
        self.updated_at != self.created_at
    }
}

/// Canonical in-memory representation of an issue.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Remote issue number; `None` until the issue has been created remotely.
    pub remote_id: Option<u64>,
    pub title: String,
    /// Editable description, without the title heading or comments section.
    pub body: String,
    pub status: IssueStatus,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Login of the author; set by the remote on creation.
    pub author: Option<String>,
    /// Milestone title. Resolved to a numeric id at push time.
    pub milestone: Option<String>,
    pub url: Option<String>,
    pub comments: Vec<IssueComment>,
}

impl IssueRecord {
    /// Create an unbound record with the given title and body.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    /// A record is bound once it carries a remote identifier.
    pub const fn is_bound(&self) -> bool {
        self.remote_id.is_some()
    }

    /// Check the record-level invariants that decoding cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Issue title is required and must be a non-empty string".to_string());
        }
        if self.labels.iter().any(|l| l.trim().is_empty()) {
            return Err("Labels must not contain empty names".to_string());
        }
        if self.assignees.iter().any(|a| a.trim().is_empty()) {
            return Err("Assignees must not contain empty logins".to_string());
        }
        Ok(())
    }
}

/// File name of the document bound to remote issue `remote_id`.
pub fn issue_file_name(remote_id: u64, title: &str) -> String {
    format!("{remote_id}-{}.md", slugify(title))
}

/// Normalize free text into a file-name-safe token sequence.
///
/// Lowercases, collapses every run of characters outside `[a-z0-9]` into a
/// single hyphen, trims hyphens at both ends and truncates to
/// [`SLUG_MAX_LEN`] characters.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    // ASCII only at this point, so byte truncation is char truncation.
    slug.truncate(SLUG_MAX_LEN);
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_slugify_collapses_punctuation() {
        assert_eq!(
            slugify("Fix: login/validation bug!!"),
            "fix-login-validation-bug"
        );
    }

    #[test]
    fn test_slugify_trims_edges() {
        assert_eq!(slugify("  --Hello World--  "), "hello-world");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_non_ascii_becomes_separator() {
        assert_eq!(slugify("Café crème"), "caf-cr-me");
    }

    #[test]
    fn test_slugify_truncates() {
        let title = "a".repeat(80);
        assert_eq!(slugify(&title).len(), SLUG_MAX_LEN);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("open".parse::<IssueStatus>(), Ok(IssueStatus::Open));
        assert_eq!(" Closed ".parse::<IssueStatus>(), Ok(IssueStatus::Closed));
        assert!("done".parse::<IssueStatus>().is_err());
        assert_eq!(IssueStatus::Closed.dir_name(), "closed");
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let record = IssueRecord::new("   ", "body");
        assert!(record.validate().is_err());
        assert!(IssueRecord::new("Title", "").validate().is_ok());
    }

    proptest! {
        #[test]
        fn prop_slug_is_bounded_and_safe(text in ".{0,200}") {
            let slug = slugify(&text);
            prop_assert!(slug.len() <= SLUG_MAX_LEN);
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.contains("--"));
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }
    }
}
