pub mod config;
pub mod issue;
pub mod markdown_codec;
pub mod sync;

pub use config::{
    Config, LoggingConfig, RateLimitConfig, Repository, RetryConfig, SyncSettings,
};
pub use issue::{issue_file_name, slugify, IssueComment, IssueRecord, IssueStatus, SLUG_MAX_LEN, UNTITLED_ISSUE};
pub use markdown_codec::{decode, encode, render_content, CodecError, FrontMatter, ParsedDocument};
pub use sync::{ConflictStrategy, SyncDirection, SyncOutcome};
