//! Exclude-glob compilation and matching.
//!
//! Globs are compiled with `globset` using `literal_separator(true)`: `*` and `?` stay inside
//! one path segment and `**` spans any number of whole segments. Patterns are matched against
//! a directory's path relative to the root it was reached from, joined with `/`.
//!
//! Two normalizations are applied before compiling:
//! - a trailing `/**` is dropped, so `**/node_modules/**` names the `node_modules` directory
//!   itself; the walker prunes it, which takes its whole subtree out of the scan
//! - a pattern with no `/` at all (e.g. `dist`) matches that name at any depth, like `**/dist`,
//!   while a leading `/` anchors a pattern at the root

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Component, Path};

/// Compiled set of exclude globs
#[derive(Debug, Clone)]
pub struct ExcludeSet {
    patterns: Vec<String>,
    globs: GlobSet,
}

impl ExcludeSet {
    /// Compile a list of exclude globs. Blank entries are ignored.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut kept = Vec::new();

        for pattern in patterns {
            let raw = pattern.as_ref().trim();
            if raw.is_empty() {
                continue;
            }

            let normalized = normalize_pattern(raw);
            let glob = GlobBuilder::new(&normalized)
                .literal_separator(true)
                .build()
                .with_context(|| format!("Invalid exclude pattern '{}'", raw))?;
            builder.add(glob);
            kept.push(raw.to_string());
        }

        let globs = builder
            .build()
            .context("Failed to compile exclude patterns")?;

        Ok(ExcludeSet {
            patterns: kept,
            globs,
        })
    }

    /// An exclude set that matches nothing
    pub fn empty() -> Self {
        ExcludeSet {
            patterns: Vec::new(),
            globs: GlobSet::empty(),
        }
    }

    /// The patterns as they were given, before normalization
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Check whether a root-relative directory path is excluded
    pub fn is_excluded(&self, relative: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        let key = slash_path(relative);
        !key.is_empty() && self.globs.is_match(key.as_str())
    }
}

/// Join the normal components of a path with `/`, dropping `.`, roots and prefixes
pub fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(os_str) => Some(os_str.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn normalize_pattern(pattern: &str) -> String {
    let mut normalized = pattern.strip_prefix("./").unwrap_or(pattern);

    loop {
        if let Some(stripped) = normalized.strip_suffix("/**") {
            normalized = stripped;
        } else if let Some(stripped) = normalized.strip_suffix('/') {
            normalized = stripped;
        } else {
            break;
        }
    }

    // A leading `/` anchors the pattern at the root
    let (anchored, normalized) = match normalized.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, normalized),
    };

    if anchored || normalized.contains('/') {
        normalized.to_string()
    } else {
        format!("**/{}", normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn excludes(patterns: &[&str]) -> ExcludeSet {
        ExcludeSet::new(patterns).unwrap()
    }

    #[test]
    fn test_double_star_excludes_directory_at_any_depth() {
        let set = excludes(&["**/node_modules/**"]);
        assert!(set.is_excluded(Path::new("node_modules")));
        assert!(set.is_excluded(Path::new("web/app/node_modules")));
        assert!(!set.is_excluded(Path::new("web/node_modules_backup")));
        assert!(!set.is_excluded(Path::new("web/my_node_modules")));
    }

    #[test]
    fn test_bare_name_matches_any_segment_name() {
        let set = excludes(&["dist"]);
        assert!(set.is_excluded(Path::new("dist")));
        assert!(set.is_excluded(Path::new("packages/ui/dist")));
        assert!(!set.is_excluded(Path::new("distribution")));
    }

    #[test]
    fn test_single_star_stays_within_segment() {
        let set = excludes(&["build/*"]);
        assert!(set.is_excluded(Path::new("build/debug")));
        assert!(!set.is_excluded(Path::new("build/debug/deps")));
        assert!(!set.is_excluded(Path::new("src/build/debug")));
    }

    #[test]
    fn test_anchored_pattern_and_trailing_slash() {
        let set = excludes(&["/generated/", "./vendor"]);
        assert!(set.is_excluded(Path::new("generated")));
        assert!(set.is_excluded(Path::new("lib/vendor")));
        assert!(!set.is_excluded(Path::new("lib/generated")));
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let set = ExcludeSet::empty();
        assert!(!set.is_excluded(Path::new("node_modules")));

        let blank = excludes(&["", "   "]);
        assert!(blank.patterns().is_empty());
        assert!(!blank.is_excluded(Path::new("anything")));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let result = ExcludeSet::new(&["assets/[icons"]);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid exclude pattern"));
    }

    #[test]
    fn test_slash_path_drops_non_normal_components() {
        assert_eq!(slash_path(Path::new("./a/b/c")), "a/b/c");
        assert_eq!(slash_path(Path::new("")), "");
    }
}
