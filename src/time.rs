//! Staleness ("zombie") detection.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::{Duration, SystemTime};
use walkdir::WalkDir;

use crate::vcs::is_vcs_internal;

const HOUR: u64 = 60 * 60;
const DAY: u64 = 24 * HOUR;

/// Directories whose newest file is older than this are zombies
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(180 * DAY);

/// A frozen "now" and the staleness threshold it is compared against.
///
/// `now` is captured once per run so every directory is judged against the same instant.
#[derive(Debug, Clone, Copy)]
pub struct StaleClock {
    now: SystemTime,
    threshold: Duration,
}

impl StaleClock {
    /// Start a clock at the current time
    pub fn new(threshold: Duration) -> Self {
        Self::at(SystemTime::now(), threshold)
    }

    /// Start a clock at a fixed instant
    pub fn at(now: SystemTime, threshold: Duration) -> Self {
        StaleClock { now, threshold }
    }

    pub fn now(&self) -> SystemTime {
        self.now
    }

    /// Strictly older than the threshold. Timestamps in the future are never stale.
    pub fn is_stale(&self, last_modified: SystemTime) -> bool {
        match self.now.duration_since(last_modified) {
            Ok(age) => age > self.threshold,
            Err(_) => false,
        }
    }

    /// Latest modification time of any file below `dir`, or `now` when it holds no files
    pub fn latest_modification(&self, dir: &Path) -> SystemTime {
        WalkDir::new(dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || !entry.file_name().to_str().is_some_and(is_vcs_internal)
            })
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.metadata().ok()?.modified().ok())
            .max()
            .unwrap_or(self.now)
    }
}

/// Parse a duration string with optional unit suffix
/// Supports: h (hours), d (days), w (weeks), m (months of 30 days)
/// Plain numbers are days
/// Examples: "180", "180d", "26w", "6m", "48h"
pub fn parse_duration(duration_str: &str) -> Result<Duration> {
    let duration_str = duration_str.trim();

    let (num_str, unit) = match duration_str.find(|c: char| c.is_alphabetic()) {
        Some(pos) => duration_str.split_at(pos),
        None => (duration_str, "d"),
    };

    let value: u64 = num_str.trim().parse().with_context(|| {
        format!(
            "Invalid duration format. Expected a number, got: {}",
            num_str
        )
    })?;

    let unit_secs = match unit.to_ascii_lowercase().as_str() {
        "h" => HOUR,
        "d" => DAY,
        "w" => 7 * DAY,
        "m" => 30 * DAY,
        unknown => anyhow::bail!(
            "Invalid duration unit '{}'. Supported units: h (hours), d (days), w (weeks), m (months)",
            unknown
        ),
    };

    let seconds = value
        .checked_mul(unit_secs)
        .with_context(|| format!("Duration too large: {}", duration_str))?;

    Ok(Duration::from_secs(seconds))
}
