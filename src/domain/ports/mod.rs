//! Port trait definitions (Hexagonal Architecture)
//!
//! - `IssueTracker`: remote issue operations
//! - `IssueStore`: local issue files
//! - `Logger`: diagnostics emitted by the synchronizers

pub mod issue_store;
pub mod issue_tracker;
pub mod logger;

pub use issue_store::IssueStore;
pub use issue_tracker::{
    IssueDraft, IssueTracker, Milestone, RemoteComment, RemoteIssue, TrackerError, TrackerResult,
};
pub use logger::{Level, Logger};
