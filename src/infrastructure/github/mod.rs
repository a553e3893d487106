//! GitHub REST adapter for the `IssueTracker` port.

pub mod client;
pub mod errors;
pub mod models;

pub use client::{GitHubClient, GitHubClientConfig};
pub use errors::GitHubApiError;
