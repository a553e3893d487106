//! Sync direction, conflict strategy and per-phase tallies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which phases a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncDirection {
    Pull,
    Push,
    #[default]
    Both,
}

impl SyncDirection {
    pub const VARIANTS: [&'static str; 3] = ["pull", "push", "both"];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pull => "pull",
            Self::Push => "push",
            Self::Both => "both",
        }
    }

    pub const fn includes_pull(&self) -> bool {
        matches!(self, Self::Pull | Self::Both)
    }

    pub const fn includes_push(&self) -> bool {
        matches!(self, Self::Push | Self::Both)
    }
}

impl fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pull" => Ok(Self::Pull),
            "push" => Ok(Self::Push),
            "both" => Ok(Self::Both),
            other => Err(format!(
                "Invalid sync direction: {other}. Must be one of: {}",
                Self::VARIANTS.join(", ")
            )),
        }
    }
}

/// Policy applied when a pull finds local and remote versions diverged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictStrategy {
    /// Abort the whole run.
    Fail,
    /// Keep the local file and write side-by-side artifacts.
    #[default]
    CreateFiles,
    /// Replace the local file with the remote version.
    Overwrite,
}

impl ConflictStrategy {
    pub const VARIANTS: [&'static str; 3] = ["fail", "create-files", "overwrite"];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::CreateFiles => "create-files",
            Self::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail" => Ok(Self::Fail),
            "create-files" => Ok(Self::CreateFiles),
            "overwrite" => Ok(Self::Overwrite),
            other => Err(format!(
                "Invalid conflict strategy: {other}. Must be one of: {}",
                Self::VARIANTS.join(", ")
            )),
        }
    }
}

/// Counts produced by one synchronizer phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub synced: usize,
    pub conflicts: usize,
}

impl SyncOutcome {
    pub const fn new(synced: usize, conflicts: usize) -> Self {
        Self { synced, conflicts }
    }
}

impl std::ops::Add for SyncOutcome {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            synced: self.synced + rhs.synced,
            conflicts: self.conflicts + rhs.conflicts,
        }
    }
}
