//! VCS detection and tracking queries for Git and Jujutsu.
//!
//! Every query here degrades to a negative answer on failure: a missing binary, a path
//! outside any repository, or a non-zero exit all read as "not tracked" / "no references".

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::rc::Rc;

use tracing::debug;

/// VCS internal directories that should never be traversed or touched.
pub const VCS_INTERNALS: &[&str] = &[
    ".git", ".jj", ".svn", ".hg", ".bzr", "_darcs", ".pijul", "CVS", ".fossil",
];

/// Check whether a file name is a VCS internal directory
pub fn is_vcs_internal(name: &str) -> bool {
    VCS_INTERNALS.contains(&name)
}

/// VCS type detected in the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsType {
    Git,
    Jujutsu,
    None,
}

/// Detect which VCS is in use for a given path by walking up to find .jj or .git
/// Prefers Jujutsu if both .jj and .git exist
pub fn detect_vcs(path: &Path) -> (VcsType, Option<PathBuf>) {
    for ancestor in path.ancestors() {
        if ancestor.join(".jj").exists() {
            return (VcsType::Jujutsu, Some(ancestor.to_path_buf()));
        }
        if ancestor.join(".git").exists() {
            return (VcsType::Git, Some(ancestor.to_path_buf()));
        }
    }
    (VcsType::None, None)
}

/// Read-only questions the reconciler asks the version-control system.
pub trait VcsQuery {
    /// Whether the path (a file, or a directory holding tracked files) is under version control
    fn is_tracked(&self, path: &Path) -> bool;

    /// Tracked files outside `path` whose content mentions the path's base name
    fn find_references(&self, path: &Path) -> Vec<PathBuf>;
}

/// A query that knows no repository: nothing is tracked and nothing is referenced.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVcs;

impl VcsQuery for NoVcs {
    fn is_tracked(&self, _path: &Path) -> bool {
        false
    }

    fn find_references(&self, _path: &Path) -> Vec<PathBuf> {
        Vec::new()
    }
}

/// Tracked files of one repository, plus every directory that contains one of them.
#[derive(Debug, Default)]
struct TrackedIndex {
    files: HashSet<PathBuf>,
    dirs: HashSet<PathBuf>,
}

impl TrackedIndex {
    fn from_files(vcs_root: &Path, files: Vec<PathBuf>) -> Self {
        let mut index = TrackedIndex::default();
        for file in files {
            for dir in file.ancestors().skip(1) {
                if !index.dirs.insert(dir.to_path_buf()) || dir == vcs_root {
                    break;
                }
            }
            index.files.insert(file);
        }
        index
    }

    fn contains(&self, path: &Path) -> bool {
        self.files.contains(path) || self.dirs.contains(path)
    }
}

/// Answers [`VcsQuery`] by running `git` or `jj`.
///
/// The tracked-file list is fetched once per repository root with a single batch call and
/// cached for the rest of the run, so per-directory lookups never spawn a process.
#[derive(Debug, Default)]
pub struct CommandVcs {
    indexes: RefCell<HashMap<PathBuf, Rc<TrackedIndex>>>,
}

impl CommandVcs {
    pub fn new() -> Self {
        Self::default()
    }

    fn index_for(&self, vcs_type: VcsType, vcs_root: &Path) -> Rc<TrackedIndex> {
        if let Some(index) = self.indexes.borrow().get(vcs_root) {
            return Rc::clone(index);
        }

        let files = list_tracked_files(vcs_type, vcs_root);
        debug!(
            root = %vcs_root.display(),
            tracked = files.len(),
            "Loaded tracked file list"
        );
        let index = Rc::new(TrackedIndex::from_files(vcs_root, files));
        self.indexes
            .borrow_mut()
            .insert(vcs_root.to_path_buf(), Rc::clone(&index));
        index
    }
}

impl VcsQuery for CommandVcs {
    fn is_tracked(&self, path: &Path) -> bool {
        let (vcs_type, vcs_root) = detect_vcs(path);
        match vcs_root {
            Some(root) => self.index_for(vcs_type, &root).contains(path),
            None => false,
        }
    }

    fn find_references(&self, path: &Path) -> Vec<PathBuf> {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) if !name.is_empty() => name,
            _ => return Vec::new(),
        };

        match detect_vcs(path) {
            (VcsType::Git, Some(root)) => git_grep_files(&root, name)
                .into_iter()
                .filter(|file| !file.starts_with(path))
                .collect(),
            // jj has no content search; references are only looked up through git
            _ => Vec::new(),
        }
    }
}

/// Batch-list every tracked file of a repository as absolute paths.
fn list_tracked_files(vcs_type: VcsType, vcs_root: &Path) -> Vec<PathBuf> {
    match vcs_type {
        VcsType::Git => {
            // Use: git ls-files -z (NUL separated, so unusual names are never quoted)
            let output = Command::new("git")
                .arg("ls-files")
                .arg("-z")
                .current_dir(vcs_root)
                .output();

            match output {
                Ok(output) if output.status.success() => {
                    split_output(&output.stdout, b'\0', vcs_root)
                }
                Ok(output) => {
                    debug!(
                        root = %vcs_root.display(),
                        status = %output.status,
                        "git ls-files failed"
                    );
                    Vec::new()
                }
                Err(err) => {
                    debug!(error = %err, "Could not run git");
                    Vec::new()
                }
            }
        }
        VcsType::Jujutsu => {
            // Use: jj file list --ignore-working-copy (skips the snapshot, much faster)
            let output = Command::new("jj")
                .arg("file")
                .arg("list")
                .arg("--ignore-working-copy")
                .current_dir(vcs_root)
                .output();

            match output {
                Ok(output) if output.status.success() => {
                    split_output(&output.stdout, b'\n', vcs_root)
                }
                Ok(output) => {
                    debug!(
                        root = %vcs_root.display(),
                        status = %output.status,
                        "jj file list failed"
                    );
                    Vec::new()
                }
                Err(err) => {
                    debug!(error = %err, "Could not run jj");
                    Vec::new()
                }
            }
        }
        VcsType::None => Vec::new(),
    }
}

/// Tracked files whose content contains `needle` as a fixed string.
fn git_grep_files(vcs_root: &Path, needle: &str) -> Vec<PathBuf> {
    // git grep exits 1 when nothing matches, which lands in the empty branch below
    let output = Command::new("git")
        .arg("grep")
        .arg("-l")
        .arg("-z")
        .arg("-F")
        .arg("-e")
        .arg(needle)
        .current_dir(vcs_root)
        .output();

    match output {
        Ok(output) if output.status.success() => split_output(&output.stdout, b'\0', vcs_root),
        _ => Vec::new(),
    }
}

fn split_output(stdout: &[u8], separator: u8, vcs_root: &Path) -> Vec<PathBuf> {
    stdout
        .split(|byte| *byte == separator)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| vcs_root.join(String::from_utf8_lossy(chunk).trim_end_matches('\r')))
        .collect()
}
