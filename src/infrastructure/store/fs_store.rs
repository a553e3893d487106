//! Filesystem implementation of the [`IssueStore`] port.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::domain::errors::StoreError;
use crate::domain::models::IssueStatus;
use crate::domain::ports::IssueStore;

/// Issue files under a workspace directory, accessed with `tokio::fs`.
#[derive(Debug, Clone)]
pub struct FsIssueStore {
    workspace: PathBuf,
    issues_dir: PathBuf,
    conflicts_dir: PathBuf,
}

impl FsIssueStore {
    /// `issues_dir` and `conflicts_dir` are relative to `workspace`.
    pub fn new(
        workspace: impl Into<PathBuf>,
        issues_dir: impl Into<PathBuf>,
        conflicts_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            workspace: workspace.into(),
            issues_dir: issues_dir.into(),
            conflicts_dir: conflicts_dir.into(),
        }
    }

    /// Absolute (or cwd-relative) location of a workspace-relative path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.workspace.join(path)
    }

    /// Markdown files directly inside `dir`, sorted by name.
    async fn markdown_files(&self, dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
        let mut entries = match fs::read_dir(self.resolve(dir)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(dir, e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(dir, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| StoreError::io(entry.path(), e))?;
            let name = entry.file_name();
            let is_markdown = Path::new(&name)
                .extension()
                .is_some_and(|ext| ext == "md");
            if file_type.is_file() && is_markdown {
                names.push(name);
            }
        }

        names.sort();
        Ok(names.into_iter().map(|name| dir.join(name)).collect())
    }
}

#[async_trait]
impl IssueStore for FsIssueStore {
    fn issues_dir(&self) -> &Path {
        &self.issues_dir
    }

    fn conflicts_dir(&self) -> &Path {
        &self.conflicts_dir
    }

    async fn ensure_layout(&self) -> Result<(), StoreError> {
        for status in [IssueStatus::Open, IssueStatus::Closed] {
            let dir = self.issues_dir.join(status.dir_name());
            fs::create_dir_all(self.resolve(&dir))
                .await
                .map_err(|e| StoreError::io(&dir, e))?;
        }
        Ok(())
    }

    async fn list_issue_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut files = Vec::new();
        for status in [IssueStatus::Open, IssueStatus::Closed] {
            files.extend(
                self.markdown_files(&self.issues_dir.join(status.dir_name()))
                    .await?,
            );
        }
        files.extend(self.markdown_files(&self.issues_dir).await?);
        Ok(files)
    }

    async fn read(&self, path: &Path) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.resolve(path)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    async fn write(&self, path: &Path, contents: &str) -> Result<(), StoreError> {
        let target = self.resolve(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(path, e))?;
        }
        fs::write(&target, contents)
            .await
            .map_err(|e| StoreError::io(path, e))
    }
}
