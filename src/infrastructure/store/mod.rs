//! Local issue store adapters.

pub mod fs_store;

pub use fs_store::FsIssueStore;
