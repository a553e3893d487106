use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::domain::errors::StoreError;
use crate::domain::models::IssueStatus;

/// Port for the local tree of issue documents.
///
/// Every path crossing this trait is relative to the workspace root, so the
/// same value can be logged, stored in a resolution guide and handed back to
/// the store.
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Issues directory, relative to the workspace.
    fn issues_dir(&self) -> &Path;

    /// Conflict artifact directory, relative to the workspace.
    fn conflicts_dir(&self) -> &Path;

    /// Create `open/` and `closed/` under the issues directory.
    async fn ensure_layout(&self) -> Result<(), StoreError>;

    /// Markdown files in `open/`, `closed/` and the issues directory itself,
    /// in that order, each group sorted by name.
    async fn list_issue_files(&self) -> Result<Vec<PathBuf>, StoreError>;

    /// Contents of `path`, or `None` when no such file exists.
    async fn read(&self, path: &Path) -> Result<Option<String>, StoreError>;

    /// Write `contents` to `path`, creating parent directories.
    async fn write(&self, path: &Path, contents: &str) -> Result<(), StoreError>;

    /// Location of an issue document with the given status.
    fn issue_path(&self, status: IssueStatus, file_name: &str) -> PathBuf {
        self.issues_dir().join(status.dir_name()).join(file_name)
    }

    /// Location of a conflict artifact.
    fn conflict_path(&self, file_name: &str) -> PathBuf {
        self.conflicts_dir().join(file_name)
    }
}
