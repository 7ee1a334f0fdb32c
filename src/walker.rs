//! Directory discovery under the configured roots.

use ignore::{Walk, WalkBuilder};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use crate::patterns::ExcludeSet;
use crate::vcs::is_vcs_internal;

/// A directory found by the walk, with the root it was reached from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedDir {
    pub root: PathBuf,
    pub path: PathBuf,
}

impl WalkedDir {
    /// Path relative to the root it was reached from
    pub fn relative(&self) -> &Path {
        self.path.strip_prefix(&self.root).unwrap_or(&self.path)
    }

    /// Number of components below the root
    pub fn depth(&self) -> usize {
        self.relative().components().count()
    }
}

/// Lazy, single-use walk over every directory below a list of roots.
///
/// Roots are walked in order, each depth-first with siblings sorted by name. The roots
/// themselves are not yielded. A directory reachable from several roots is yielded once,
/// attributed to the first root that reaches it.
pub struct DirectoryWalker {
    roots: VecDeque<PathBuf>,
    excludes: Arc<ExcludeSet>,
    current: Option<(PathBuf, Walk)>,
    seen: HashSet<PathBuf>,
}

impl DirectoryWalker {
    pub fn new(roots: &[PathBuf], excludes: ExcludeSet) -> Self {
        DirectoryWalker {
            roots: roots.iter().cloned().collect(),
            excludes: Arc::new(excludes),
            current: None,
            seen: HashSet::new(),
        }
    }
}

fn walk_root(root: &Path, excludes: Arc<ExcludeSet>) -> Walk {
    let root_buf = root.to_path_buf();

    WalkBuilder::new(root)
        .hidden(false)
        // Ignore files play no part here: every directory counts, ignored or not
        .git_ignore(false)
        .ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            // Only directories are of interest; dropping files here also avoids stat calls
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return false;
            }

            if entry.depth() == 0 {
                return true;
            }

            // Never traverse VCS internals
            if entry.file_name().to_str().is_some_and(is_vcs_internal) {
                return false;
            }

            let relative = entry.path().strip_prefix(&root_buf).unwrap_or(entry.path());
            !excludes.is_excluded(relative)
        })
        .build()
}

impl Iterator for DirectoryWalker {
    type Item = WalkedDir;

    fn next(&mut self) -> Option<WalkedDir> {
        loop {
            if self.current.is_none() {
                let root = self.roots.pop_front()?;
                let walk = walk_root(&root, Arc::clone(&self.excludes));
                self.current = Some((root, walk));
            }

            let Some((root, walk)) = self.current.as_mut() else {
                continue;
            };

            match walk.next() {
                None => {
                    self.current = None;
                }
                Some(Err(err)) => {
                    warn!(root = %root.display(), error = %err, "Failed to access entry");
                }
                Some(Ok(entry)) => {
                    if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                        continue;
                    }

                    let path = entry.into_path();
                    if self.seen.insert(path.clone()) {
                        return Some(WalkedDir {
                            root: root.clone(),
                            path,
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn walk(roots: &[PathBuf], patterns: &[&str]) -> Vec<PathBuf> {
        let excludes = ExcludeSet::new(patterns).unwrap();
        DirectoryWalker::new(roots, excludes)
            .map(|dir| dir.path)
            .collect()
    }

    #[test]
    fn test_yields_descendant_directories_only() {
        let dir = tempdir().unwrap();
        let root = dir.path().to_path_buf();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::create_dir_all(root.join("c")).unwrap();
        fs::write(root.join("a/file.txt"), "x").unwrap();

        let found = walk(&[root.clone()], &[]);
        assert_eq!(found, vec![root.join("a"), root.join("a/b"), root.join("c")]);
    }

    #[test]
    fn test_excluded_subtree_is_pruned() {
        let dir = tempdir().unwrap();
        let root = dir.path().to_path_buf();
        fs::create_dir_all(root.join("web/node_modules/pkg/lib")).unwrap();
        fs::create_dir_all(root.join("web/src")).unwrap();

        let found = walk(&[root.clone()], &["**/node_modules/**"]);
        assert_eq!(found, vec![root.join("web"), root.join("web/src")]);
    }

    #[test]
    fn test_vcs_internals_are_skipped() {
        let dir = tempdir().unwrap();
        let root = dir.path().to_path_buf();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::create_dir_all(root.join(".github")).unwrap();

        let found = walk(&[root.clone()], &[]);
        assert_eq!(found, vec![root.join(".github")]);
    }

    #[test]
    fn test_overlapping_roots_are_deduplicated() {
        let dir = tempdir().unwrap();
        let root = dir.path().to_path_buf();
        fs::create_dir_all(root.join("a/b/c")).unwrap();

        let found = walk(&[root.join("a"), root.clone(), root.join("a")], &[]);
        assert_eq!(
            found,
            vec![root.join("a/b"), root.join("a/b/c"), root.join("a")]
        );
    }

    #[test]
    fn test_relative_path_and_depth() {
        let walked = WalkedDir {
            root: PathBuf::from("/r"),
            path: PathBuf::from("/r/a/b/c"),
        };
        assert_eq!(walked.relative(), Path::new("a/b/c"));
        assert_eq!(walked.depth(), 3);
    }
}
