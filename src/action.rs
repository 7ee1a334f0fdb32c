//! Records produced by a reconciliation run.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    KeepCreated,
    KeepRemoved,
    ZombieDetected,
    GhostDetected,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::KeepCreated => "keep_created",
            ActionKind::KeepRemoved => "keep_removed",
            ActionKind::ZombieDetected => "zombie_detected",
            ActionKind::GhostDetected => "ghost_detected",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the append-only action log
#[derive(Debug, Clone, Serialize)]
pub struct BuddhaAction {
    pub action: ActionKind,
    pub path: PathBuf,
    pub reason: String,
    pub timestamp: DateTime<Local>,
}

impl BuddhaAction {
    pub fn new(action: ActionKind, path: &Path, reason: impl Into<String>) -> Self {
        BuddhaAction {
            action,
            path: path.to_path_buf(),
            reason: reason.into(),
            timestamp: Local::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailedOperation {
    Create,
    Remove,
}

/// A placeholder write or delete that did not go through
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub path: PathBuf,
    pub operation: FailedOperation,
    pub error: String,
}
