//! Markdown codec for issue documents.
//!
//! Issue files use YAML front matter followed by a Markdown body:
//! ```markdown
//! ---
//! assignees:
//! - octocat
//! github_id: 42
//! labels:
//! - bug
//! status: open
//! ---
//!
//! # Login fails after deploy
//!
//! Users cannot log in.
//!
//! ## Comments
//!
//! ### @octocat - 2024-01-15 10:30:00 UTC
//!
//! Confirmed on staging.
//! ```
//!
//! The first level-1 heading is the title. The `## Comments` section is a
//! pull-only rendering and is stripped when decoding.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::issue::{IssueComment, IssueRecord, IssueStatus, UNTITLED_ISSUE};

const DELIMITER: &str = "---";
const COMMENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

static TITLE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+(.+)$").expect("title pattern is valid"));

static COMMENTS_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^## Comments[ \t]*\r?$").expect("comments pattern is valid"));

/// Errors raised while decoding or encoding an issue document.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Missing closing --- for YAML front matter")]
    UnterminatedFrontMatter,

    #[error("Invalid front matter: {0}")]
    InvalidFrontMatter(#[source] serde_yaml::Error),

    #[error("Failed to serialize front matter: {0}")]
    Serialization(#[source] serde_yaml::Error),
}

/// Typed front-matter schema.
///
/// Every recognized key is optional; keys this tool does not know about are
/// kept in `extra` so rewriting a file does not lose them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IssueStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Front matter describing `record`.
    pub fn from_record(record: &IssueRecord) -> Self {
        Self {
            github_id: record.remote_id,
            status: Some(record.status),
            labels: Some(record.labels.clone()),
            assignees: Some(record.assignees.clone()),
            created_at: record.created_at,
            updated_at: record.updated_at,
            author: record.author.clone(),
            milestone: record.milestone.clone(),
            url: record.url.clone(),
            extra: BTreeMap::new(),
        }
    }

    /// Local modification time: `updated_at`, else `created_at`.
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }

    /// Serialize as a key-sorted YAML block with null values dropped.
    fn to_yaml(&self) -> Result<String, CodecError> {
        let value = serde_yaml::to_value(self).map_err(CodecError::Serialization)?;

        let sorted: BTreeMap<String, serde_yaml::Value> = value
            .as_mapping()
            .into_iter()
            .flatten()
            .filter(|(_, v)| !v.is_null())
            .filter_map(|(k, v)| k.as_str().map(|key| (key.to_string(), v.clone())))
            .collect();

        if sorted.is_empty() {
            return Ok(String::new());
        }
        serde_yaml::to_string(&sorted).map_err(CodecError::Serialization)
    }
}

/// A document split into its front matter and the Markdown that follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub front_matter: FrontMatter,
    /// Everything after the closing delimiter, untouched.
    pub content: String,
}

impl ParsedDocument {
    /// Split `text` into front matter and content.
    ///
    /// A document without a leading `---` line has empty front matter and is
    /// all content. An opening delimiter without a closing one is an error.
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let Some(rest) = text
            .strip_prefix("---\n")
            .or_else(|| text.strip_prefix("---\r\n"))
        else {
            return Ok(Self {
                front_matter: FrontMatter::default(),
                content: text.to_string(),
            });
        };

        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if line.trim_end_matches(['\r', '\n']) == DELIMITER {
                let yaml = &rest[..offset];
                let content = &rest[offset + line.len()..];
                let front_matter = if yaml.trim().is_empty() {
                    FrontMatter::default()
                } else {
                    serde_yaml::from_str(yaml).map_err(CodecError::InvalidFrontMatter)?
                };
                return Ok(Self {
                    front_matter,
                    content: content.to_string(),
                });
            }
            offset += line.len();
        }

        Err(CodecError::UnterminatedFrontMatter)
    }

    /// Serialize back into document text. Only the front matter is
    /// re-serialized; the content is emitted exactly as parsed.
    pub fn render(&self) -> Result<String, CodecError> {
        let yaml = self.front_matter.to_yaml()?;
        let separator = if self.content.starts_with('\n') || self.content.starts_with("\r\n") {
            ""
        } else {
            "\n"
        };
        Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n{separator}{}", self.content))
    }

    /// Interpret the document as an issue record.
    pub fn to_record(&self) -> IssueRecord {
        let (title, body) = split_title(&self.content);
        let fm = &self.front_matter;

        IssueRecord {
            remote_id: fm.github_id,
            title,
            body: strip_comments(&body),
            status: fm.status.unwrap_or_default(),
            labels: fm.labels.clone().unwrap_or_default(),
            assignees: fm.assignees.clone().unwrap_or_default(),
            created_at: fm.created_at,
            updated_at: fm.updated_at,
            author: fm.author.clone(),
            milestone: fm.milestone.clone(),
            url: fm.url.clone(),
            comments: Vec::new(),
        }
    }
}

/// Encode a record as document text.
pub fn encode(record: &IssueRecord) -> Result<String, CodecError> {
    compose(&FrontMatter::from_record(record), &render_content(record))
}

/// Decode document text into a record.
pub fn decode(text: &str) -> Result<IssueRecord, CodecError> {
    Ok(ParsedDocument::parse(text)?.to_record())
}

/// Render the Markdown that follows the front matter: title heading,
/// description and, when present, the comments section.
pub fn render_content(record: &IssueRecord) -> String {
    let mut content = format!("# {}\n\n", record.title);

    if !record.body.is_empty() {
        content.push_str(&record.body);
        content.push_str("\n\n");
    }

    if !record.comments.is_empty() {
        content.push_str("## Comments\n\n");
        for comment in &record.comments {
            render_comment(&mut content, comment);
        }
    }

    content.trim().to_string()
}

fn render_comment(out: &mut String, comment: &IssueComment) {
    out.push_str(&format!(
        "### @{} - {}\n\n{}\n\n",
        comment.author,
        comment.created_at.format(COMMENT_TIME_FORMAT),
        comment.body
    ));
    if comment.was_edited() {
        out.push_str(&format!(
            "*Updated: {}*\n\n",
            comment.updated_at.format(COMMENT_TIME_FORMAT)
        ));
    }
}

fn compose(front_matter: &FrontMatter, content: &str) -> Result<String, CodecError> {
    let yaml = front_matter.to_yaml()?;
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n\n{}\n", content.trim()))
}

/// Pull the first level-1 heading out of `content`.
///
/// Only the blank line separating the heading from the description is
/// dropped; leading indentation of the description is part of it.
fn split_title(content: &str) -> (String, String) {
    let Some(caps) = TITLE_LINE.captures(content) else {
        return (UNTITLED_ISSUE.to_string(), trim_lines(content).to_string());
    };

    let title = caps[1].trim();
    let title = if title.is_empty() { UNTITLED_ISSUE } else { title };
    let heading = caps.get(0).map_or(0..0, |m| m.range());

    let before = content[..heading.start].trim_start_matches(['\r', '\n']);
    let after = skip_separator(&content[heading.end..]);
    let body = if before.trim().is_empty() {
        after.trim_end().to_string()
    } else {
        format!("{before}{after}").trim_end().to_string()
    };
    (title.to_string(), body)
}

/// Skip the line break ending the heading and one blank line after it.
fn skip_separator(mut rest: &str) -> &str {
    for _ in 0..2 {
        match rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) {
            Some(next) => rest = next,
            None => break,
        }
    }
    rest
}

/// Drop leading blank lines and trailing whitespace.
fn trim_lines(text: &str) -> &str {
    text.trim_start_matches(['\r', '\n']).trim_end()
}

/// Drop the `## Comments` section and everything after it.
fn strip_comments(body: &str) -> String {
    COMMENTS_HEADING
        .find(body)
        .map_or(body, |m| &body[..m.start()])
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_record() -> IssueRecord {
        IssueRecord {
            remote_id: Some(42),
            title: "Login fails after deploy".to_string(),
            body: "Users cannot log in.\n\n- step one\n- step two".to_string(),
            status: IssueStatus::Open,
            labels: vec!["bug".to_string(), "auth".to_string()],
            assignees: vec!["octocat".to_string()],
            created_at: Some("2024-01-14T08:00:00Z".parse().unwrap()),
            updated_at: Some("2024-01-15T10:30:00Z".parse().unwrap()),
            author: Some("hubot".to_string()),
            milestone: Some("v1.0".to_string()),
            url: Some("https://github.com/org/repo/issues/42".to_string()),
            comments: vec![],
        }
    }

    #[test]
    fn test_encode_layout() {
        let text = encode(&sample_record()).unwrap();
        assert!(text.starts_with("---\n"));
        assert!(text.contains("\n---\n\n# Login fails after deploy\n\nUsers cannot log in."));
        assert!(text.ends_with("- step two\n"));
    }

    #[test]
    fn test_encode_sorts_keys() {
        let text = encode(&sample_record()).unwrap();
        let keys: Vec<&str> = text
            .lines()
            .skip(1)
            .take_while(|l| *l != "---")
            .filter(|l| !l.starts_with('-') && !l.starts_with(' '))
            .filter_map(|l| l.split(':').next())
            .collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
        assert_eq!(keys.first(), Some(&"assignees"));
        assert_eq!(keys.last(), Some(&"url"));
    }

    #[test]
    fn test_encode_omits_absent_fields() {
        let record = IssueRecord::new("Draft idea", "Just a thought");
        let text = encode(&record).unwrap();
        for key in ["github_id", "created_at", "updated_at", "author", "milestone", "url"] {
            assert!(!text.contains(key), "unexpected key {key} in:\n{text}");
        }
        assert!(!text.contains("null"));
        assert!(text.contains("status: open"));
    }

    #[test]
    fn test_round_trip_preserves_editable_fields() {
        let record = sample_record();
        let decoded = decode(&encode(&record).unwrap()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_decode_defaults_title() {
        let record = decode("---\nstatus: closed\n---\n\nNo heading here.").unwrap();
        assert_eq!(record.title, UNTITLED_ISSUE);
        assert_eq!(record.body, "No heading here.");
        assert_eq!(record.status, IssueStatus::Closed);
    }

    #[test]
    fn test_decode_title_must_start_line() {
        let record = decode("Some text # not a title\n\n# Real title\n\nBody").unwrap();
        assert_eq!(record.title, "Real title");
        assert_eq!(record.body, "Some text # not a title\n\nBody");
    }

    #[test]
    fn test_decode_strips_comments_section() {
        let mut record = sample_record();
        record.comments = vec![IssueComment {
            author: "octocat".to_string(),
            created_at: "2024-01-15T10:30:00Z".parse().unwrap(),
            updated_at: "2024-01-16T09:00:00Z".parse().unwrap(),
            body: "Confirmed on staging.".to_string(),
        }];
        let text = encode(&record).unwrap();
        assert!(text.contains("## Comments\n\n### @octocat - 2024-01-15 10:30:00 UTC\n\nConfirmed on staging."));
        assert!(text.contains("*Updated: 2024-01-16 09:00:00 UTC*"));

        let decoded = decode(&text).unwrap();
        assert_eq!(decoded.body, record.body);
        assert!(decoded.comments.is_empty());
    }

    #[test]
    fn test_unedited_comment_has_no_update_line() {
        let at: DateTime<Utc> = "2024-03-01T12:00:00Z".parse().unwrap();
        let mut record = IssueRecord::new("Title", "");
        record.comments = vec![IssueComment {
            author: "a".to_string(),
            created_at: at,
            updated_at: at,
            body: "hi".to_string(),
        }];
        let content = render_content(&record);
        assert_eq!(content, "# Title\n\n## Comments\n\n### @a - 2024-03-01 12:00:00 UTC\n\nhi");
    }

    #[test]
    fn test_decode_without_front_matter() {
        let record = decode("# New idea\n\nWrite it down.").unwrap();
        assert_eq!(record.title, "New idea");
        assert_eq!(record.body, "Write it down.");
        assert!(!record.is_bound());
        assert_eq!(record.status, IssueStatus::Open);
    }

    #[test]
    fn test_decode_unterminated_front_matter() {
        let err = decode("---\nstatus: open\n# Title\n").unwrap_err();
        assert!(matches!(err, CodecError::UnterminatedFrontMatter));
    }

    #[test]
    fn test_decode_rejects_mistyped_fields() {
        let err = decode("---\nlabels: bug\n---\n\n# T").unwrap_err();
        assert!(matches!(err, CodecError::InvalidFrontMatter(_)));

        let err = decode("---\nstatus: done\n---\n\n# T").unwrap_err();
        assert!(matches!(err, CodecError::InvalidFrontMatter(_)));

        let err = decode("---\n[not, a, mapping]\n---\n\n# T").unwrap_err();
        assert!(matches!(err, CodecError::InvalidFrontMatter(_)));
    }

    #[test]
    fn test_null_values_are_absent() {
        let record = decode("---\nmilestone: null\ngithub_id: 7\n---\n\n# T").unwrap();
        assert_eq!(record.milestone, None);
        assert_eq!(record.remote_id, Some(7));
    }

    #[test]
    fn test_unknown_keys_survive_rewrite() {
        let text = "---\ngithub_id: 3\npriority: high\nstatus: open\n---\n\n# Keep me\n\nBody";
        let mut doc = ParsedDocument::parse(text).unwrap();
        doc.front_matter.url = Some("https://example.test/3".to_string());
        let rewritten = doc.render().unwrap();
        assert!(rewritten.contains("priority: high"));
        assert!(rewritten.contains("url: https://example.test/3"));
        assert!(rewritten.contains("# Keep me\n\nBody"));
    }

    #[test]
    fn test_render_keeps_content_verbatim() {
        let text = "---\nstatus: open\n---\n\n\n# Spaced   \n\nBody with trailing spaces   \n\n\n";
        let mut doc = ParsedDocument::parse(text).unwrap();
        doc.front_matter.github_id = Some(9);
        let rewritten = doc.render().unwrap();
        assert_eq!(
            rewritten,
            "---\ngithub_id: 9\nstatus: open\n---\n\n\n# Spaced   \n\nBody with trailing spaces   \n\n\n"
        );

        let bare = ParsedDocument::parse("# New\n\nBody").unwrap();
        assert_eq!(bare.render().unwrap(), "---\n---\n\n# New\n\nBody");
    }

    #[test]
    fn test_round_trip_keeps_leading_indentation() {
        let record = IssueRecord::new("Crash", "    let x = 1;\n\nPanics here.");
        let text = encode(&record).unwrap();
        assert!(text.ends_with("# Crash\n\n    let x = 1;\n\nPanics here.\n"));
        assert_eq!(decode(&text).unwrap().body, record.body);

        let spaced = IssueRecord::new("Spaced", "\n\nStarts after blank lines");
        assert_eq!(decode(&encode(&spaced).unwrap()).unwrap().body, spaced.body);
    }

    #[test]
    fn test_decode_keeps_indented_body_before_comments() {
        let record = decode("# T\n\n    code\n\n## Comments\n\n### @a - 2024-01-01 00:00:00 UTC\n\nhi\n").unwrap();
        assert_eq!(record.body, "    code");
    }

    #[test]
    fn test_crlf_document() {
        let record = decode("---\r\nstatus: closed\r\n---\r\n\r\n# Windows\r\n\r\nBody\r\n").unwrap();
        assert_eq!(record.title, "Windows");
        assert_eq!(record.body, "Body");
        assert_eq!(record.status, IssueStatus::Closed);
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            title in "[A-Za-z0-9][A-Za-z0-9 ,.!?-]{0,40}[A-Za-z0-9]",
            body in "( {1,4}|\n{1,2}|\r\n)?[A-Za-z0-9 .\n]{0,80}",
            labels in proptest::collection::vec("[a-z][a-z0-9-]{0,10}", 0..4),
            assignees in proptest::collection::vec("[a-z][a-z0-9]{0,10}", 0..3),
            closed in any::<bool>(),
        ) {
            let record = IssueRecord {
                title: title.clone(),
                body: body.clone(),
                labels: labels.clone(),
                assignees: assignees.clone(),
                status: if closed { IssueStatus::Closed } else { IssueStatus::Open },
                ..Default::default()
            };
            let decoded = decode(&encode(&record).unwrap()).unwrap();
            prop_assert_eq!(decoded.title, title);
            prop_assert_eq!(decoded.body.trim_end(), body.trim_end());
            prop_assert_eq!(decoded.labels, labels);
            prop_assert_eq!(decoded.assignees, assignees);
            prop_assert_eq!(decoded.status, record.status);
        }
    }
}
