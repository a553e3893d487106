//! Output formatting utilities for the CLI.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::{presets, Attribute, Cell, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

/// Environment variable naming the Actions step-output file.
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value;
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Base table used by every command: UTF-8 borders, bold header.
pub fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            header
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );
    table
}

/// Right-aligned numeric cell.
pub fn count_cell(value: usize) -> Cell {
    Cell::new(value).set_alignment(CellAlignment::Right)
}

/// Step outputs file, when running under Actions.
pub fn github_output_path() -> Option<PathBuf> {
    std::env::var_os(GITHUB_OUTPUT_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Append `name=value` lines to a step outputs file.
pub fn append_outputs(path: &Path, outputs: &[(&str, String)]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    for (name, value) in outputs {
        writeln!(file, "{name}={value}")
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

/// Publish step outputs: appended to `$GITHUB_OUTPUT` when set, otherwise
/// printed (unless stdout is reserved for JSON).
pub fn set_outputs(outputs: &[(&str, String)], json_mode: bool) -> Result<()> {
    match github_output_path() {
        Some(path) => append_outputs(&path, outputs),
        None => {
            if !json_mode {
                for (name, value) in outputs {
                    println!("{name}={value}");
                }
            }
            Ok(())
        }
    }
}
