//! Per-directory classification.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, warn};

use crate::placeholder::{GENERIC, KEEP_FILE_NAMES, REMOVABLE_KEEP_FILES};
use crate::time::StaleClock;
use crate::vcs::VcsQuery;

/// Snapshot of one directory taken when the walk reached it
#[derive(Debug, Clone)]
pub struct DirectoryInsight {
    pub path: PathBuf,
    /// No direct children at all
    pub is_empty: bool,
    /// A direct child is named like a placeholder
    pub has_keep_file: bool,
    /// `.gitkeep` or else `README.md`, when present
    pub keep_file_path: Option<PathBuf>,
    /// A `placeholder` file, when present
    pub generic_file: Option<PathBuf>,
    /// Direct children that are not placeholders
    pub other_entries: usize,
    pub last_modified: SystemTime,
    pub git_tracked: bool,
    pub is_zombie: bool,
    pub is_ghost: bool,
}

impl DirectoryInsight {
    /// Holds a placeholder next to real content, so the placeholder is obsolete
    pub fn is_filled(&self) -> bool {
        self.has_keep_file && self.other_entries > 0
    }
}

pub struct InsightBuilder<'a> {
    vcs: &'a dyn VcsQuery,
    clock: StaleClock,
    detect_ghosts: bool,
}

impl<'a> InsightBuilder<'a> {
    pub fn new(vcs: &'a dyn VcsQuery, clock: StaleClock) -> Self {
        InsightBuilder {
            vcs,
            clock,
            detect_ghosts: false,
        }
    }

    /// Look up name references for untracked directories to flag ghosts
    pub fn with_ghost_detection(mut self, enabled: bool) -> Self {
        self.detect_ghosts = enabled;
        self
    }

    /// Classify `path`. Returns `None` when the directory vanished or cannot be listed.
    pub fn build(&self, path: &Path) -> Option<DirectoryInsight> {
        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Directory vanished before inspection");
                return None;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Could not list directory");
                return None;
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => names.push(entry.file_name()),
                Err(err) => {
                    debug!(path = %path.display(), error = %err, "Skipping unreadable entry")
                }
            }
        }

        let is_keep = |name: &std::ffi::OsStr| {
            name.to_str()
                .is_some_and(|name| KEEP_FILE_NAMES.contains(&name))
        };

        let keep_count = names.iter().filter(|name| is_keep(name.as_os_str())).count();
        let keep_file_path = REMOVABLE_KEEP_FILES
            .iter()
            .find(|keep| names.iter().any(|name| name.as_os_str() == **keep))
            .map(|keep| path.join(keep));
        let generic_file = names
            .iter()
            .any(|name| name.as_os_str() == GENERIC)
            .then(|| path.join(GENERIC));

        let last_modified = self.clock.latest_modification(path);
        let git_tracked = self.vcs.is_tracked(path);
        let is_ghost = self.detect_ghosts
            && !git_tracked
            && !self.vcs.find_references(path).is_empty();

        Some(DirectoryInsight {
            path: path.to_path_buf(),
            is_empty: names.is_empty(),
            has_keep_file: keep_count > 0,
            keep_file_path,
            generic_file,
            other_entries: names.len() - keep_count,
            last_modified,
            git_tracked,
            is_zombie: self.clock.is_stale(last_modified),
            is_ghost,
        })
    }
}
