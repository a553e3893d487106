//! Conflict detection and resolution for the pull direction.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;

use crate::domain::errors::{SyncError, SyncResult};
use crate::domain::models::ConflictStrategy;
use crate::domain::ports::{IssueStore, Level, Logger};

/// Timestamp embedded in artifact names: ISO-8601 with `:` and `.` made
/// file-name safe.
const ARTIFACT_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S-%3fZ";

/// True when the remote changed after the local file and the visible
/// content differs.
///
/// A local file without any timestamp is treated as older than the remote.
pub fn is_conflict(
    local_modified: Option<DateTime<Utc>>,
    local_content: &str,
    remote_updated: Option<DateTime<Utc>>,
    remote_content: &str,
) -> bool {
    let remote_newer = match (remote_updated, local_modified) {
        (Some(remote), Some(local)) => remote > local,
        (Some(_), None) => true,
        (None, _) => false,
    };
    remote_newer && local_content.trim() != remote_content.trim()
}

/// A divergence found while pulling.
#[derive(Debug, Clone, Copy)]
pub struct Conflict<'a> {
    /// Existing local document
    pub path: &'a Path,
    /// Its text, as read
    pub local_text: &'a str,
    /// Encoded remote version
    pub remote_document: &'a str,
}

/// Files written by the `create-files` strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictArtifacts {
    pub local: PathBuf,
    pub remote: PathBuf,
    pub resolution: PathBuf,
}

/// How a conflict was settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Overwritten,
    ArtifactsCreated(ConflictArtifacts),
}

/// Applies the configured [`ConflictStrategy`].
pub struct ConflictResolver {
    store: Arc<dyn IssueStore>,
    logger: Arc<dyn Logger>,
    strategy: ConflictStrategy,
}

impl ConflictResolver {
    pub fn new(
        store: Arc<dyn IssueStore>,
        logger: Arc<dyn Logger>,
        strategy: ConflictStrategy,
    ) -> Self {
        Self {
            store,
            logger,
            strategy,
        }
    }

    pub async fn resolve(&self, conflict: &Conflict<'_>) -> SyncResult<Resolution> {
        self.resolve_at(conflict, Utc::now()).await
    }

    /// Resolve using `now` for artifact names.
    ///
    /// `fail` returns [`SyncError::Conflict`] without writing anything.
    pub async fn resolve_at(
        &self,
        conflict: &Conflict<'_>,
        now: DateTime<Utc>,
    ) -> SyncResult<Resolution> {
        let path = conflict.path.display().to_string();

        match self.strategy {
            ConflictStrategy::Fail => Err(SyncError::Conflict { path }),
            ConflictStrategy::Overwrite => {
                self.store
                    .write(conflict.path, conflict.remote_document)
                    .await?;
                self.logger
                    .warn(&format!(
                        "Conflict in {path}: overwrote local changes with the remote version"
                    ))
                    .await;
                Ok(Resolution::Overwritten)
            }
            ConflictStrategy::CreateFiles => {
                let artifacts = self.create_artifacts(conflict, now).await?;
                let mut fields = HashMap::new();
                fields.insert("local".to_string(), json!(artifacts.local.display().to_string()));
                fields.insert("remote".to_string(), json!(artifacts.remote.display().to_string()));
                fields.insert(
                    "resolution".to_string(),
                    json!(artifacts.resolution.display().to_string()),
                );
                self.logger
                    .log(
                        Level::Warn,
                        &format!(
                            "Conflict detected in {path}. Resolution files created in {}/",
                            self.store.conflicts_dir().display()
                        ),
                        fields,
                    )
                    .await;
                Ok(Resolution::ArtifactsCreated(artifacts))
            }
        }
    }

    async fn create_artifacts(
        &self,
        conflict: &Conflict<'_>,
        now: DateTime<Utc>,
    ) -> SyncResult<ConflictArtifacts> {
        let stem = conflict
            .path
            .file_stem()
            .map_or_else(|| "issue".into(), |s| s.to_string_lossy());
        let stamp = now.format(ARTIFACT_TIME_FORMAT);

        let artifacts = ConflictArtifacts {
            local: self.store.conflict_path(&format!("{stem}-local-{stamp}.md")),
            remote: self.store.conflict_path(&format!("{stem}-remote-{stamp}.md")),
            resolution: self
                .store
                .conflict_path(&format!("{stem}-resolution-{stamp}.md")),
        };

        self.store
            .write(&artifacts.local, conflict.local_text)
            .await?;
        self.store
            .write(&artifacts.remote, conflict.remote_document)
            .await?;
        self.store
            .write(
                &artifacts.resolution,
                &resolution_guide(conflict.path, &artifacts, now),
            )
            .await?;

        Ok(artifacts)
    }
}

/// Human instructions for settling a conflict by hand.
pub fn resolution_guide(
    original: &Path,
    artifacts: &ConflictArtifacts,
    generated_at: DateTime<Utc>,
) -> String {
    let original = original.display();
    let local = artifacts.local.display();
    let remote = artifacts.remote.display();
    let resolution = artifacts.resolution.display();
    let generated_at = generated_at.to_rfc3339_opts(SecondsFormat::Millis, true);

    format!(
        r#"# Conflict Resolution for {original}

The issue changed on GitHub after the local file was last synced, and the two
versions no longer match. The local file was left untouched.

## Files
- **Original**: `{original}`
- **Local version**: `{local}`
- **Remote version**: `{remote}`
- **This guide**: `{resolution}`

## Resolution Options

### Keep the local version
```bash
cp "{local}" "{original}"
```

### Keep the remote version
```bash
cp "{remote}" "{original}"
```

### Merge by hand
Edit `{original}` and combine the changes from both versions.

## Next Steps
1. Pick one of the options above.
2. Remove the conflict files:
```bash
rm "{local}" "{remote}" "{resolution}"
```
3. Commit the result and run the sync again.

---
*Generated on {generated_at}*
"#
    )
}
