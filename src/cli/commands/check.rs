//! Implementation of the `issue-sync check` command.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use comfy_table::Cell;
use console::style;
use serde::Serialize;

use super::Session;
use crate::cli::output::{output, table, CommandOutput};
use crate::cli::types::CheckArgs;
use crate::domain::models::ParsedDocument;
use crate::domain::ports::IssueStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckProblem {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub issues_path: PathBuf,
    pub files_checked: usize,
    pub problems: Vec<CheckProblem>,
}

impl CommandOutput for CheckOutput {
    fn to_human(&self) -> String {
        if self.problems.is_empty() {
            return format!(
                "{} {} issue files in {} are valid",
                style("✓").green().bold(),
                self.files_checked,
                self.issues_path.display()
            );
        }

        let mut problems = table(&["File", "Problem"]);
        for problem in &self.problems {
            problems.add_row(vec![
                Cell::new(problem.path.display()),
                Cell::new(&problem.message),
            ]);
        }
        format!(
            "{} {} of {} issue files have problems\n{problems}",
            style("✗").red().bold(),
            self.problems.len(),
            self.files_checked
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Problem with a single document's text, if any.
pub fn check_document(text: &str) -> Option<String> {
    match ParsedDocument::parse(text) {
        Ok(document) => document.to_record().validate().err(),
        Err(err) => Some(err.to_string()),
    }
}

/// Check every local issue file.
pub async fn check_store(store: &dyn IssueStore) -> Result<CheckOutput> {
    let files = store.list_issue_files().await?;
    let mut problems = Vec::new();

    for path in &files {
        let message = match store.read(path).await? {
            Some(text) => check_document(&text),
            None => Some("file disappeared while checking".to_string()),
        };
        if let Some(message) = message {
            problems.push(CheckProblem {
                path: path.clone(),
                message,
            });
        }
    }

    Ok(CheckOutput {
        issues_path: store.issues_dir().to_path_buf(),
        files_checked: files.len(),
        problems,
    })
}

pub async fn execute(args: CheckArgs, config_file: Option<&Path>, json_mode: bool) -> Result<()> {
    let session = Session::start(config_file, &args.settings.overrides()).await?;
    let store = session.store();

    let report = check_store(&store).await?;
    output(&report, json_mode);

    if !report.problems.is_empty() {
        bail!("{} issue files failed validation", report.problems.len());
    }
    Ok(())
}
