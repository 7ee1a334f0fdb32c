//! Run configuration: embedded defaults, optional TOML overrides, CLI options.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::patterns::ExcludeSet;
use crate::placeholder::PlaceholderMode;
use crate::policy::{Policy, PolicyAction};
use crate::time::parse_duration;

// Embed the defaults directly in the binary at compile time
const DEFAULTS_TOML: &str = include_str!("../buddha.toml");

/// Name of the JSON run log written into the first root unless a path is given
pub const DEFAULT_LOG_FILE: &str = ".git-buddha.json";

/// Settings as they appear in a TOML file. Absent keys leave the lower layer untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub exclude: Option<Vec<String>>,
    pub stale_after: Option<String>,
    pub top_empty: Option<usize>,
    pub policy: Option<BTreeMap<String, PolicyAction>>,
}

impl Settings {
    /// Settings compiled into the binary
    pub fn defaults() -> Result<Self> {
        Self::parse(DEFAULTS_TOML).context("Failed to parse built-in defaults")
    }

    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid settings TOML")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Failed to load {}", path.display()))
    }

    /// Layer `overrides` on top of `self`; any key set in `overrides` wins
    pub fn merge(self, overrides: Settings) -> Settings {
        Settings {
            exclude: overrides.exclude.or(self.exclude),
            stale_after: overrides.stale_after.or(self.stale_after),
            top_empty: overrides.top_empty.or(self.top_empty),
            policy: overrides.policy.or(self.policy),
        }
    }
}

/// Options controlling a run (runtime flags)
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub paths: Vec<PathBuf>,
    pub mode: PlaceholderMode,
    pub zen: bool,
    pub diagram: bool,
    pub cleanup_on_fill: bool,
    pub detect_ghosts: bool,
    /// Appended to the configured exclude list
    pub extra_excludes: Vec<String>,
    /// Replaces the configured threshold
    pub stale_after: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            paths: vec![PathBuf::from(".")],
            mode: PlaceholderMode::default(),
            zen: false,
            diagram: false,
            cleanup_on_fill: true,
            detect_ghosts: false,
            extra_excludes: Vec::new(),
            stale_after: None,
            log_file: None,
        }
    }
}

/// Everything one run needs, validated up front and fixed for the run
#[derive(Debug, Clone)]
pub struct Config {
    /// Canonical and deduplicated. An ancestor root always comes before roots inside it.
    pub roots: Vec<PathBuf>,
    pub mode: PlaceholderMode,
    pub excludes: ExcludeSet,
    pub cleanup_on_fill: bool,
    pub zen: bool,
    pub diagram: bool,
    pub detect_ghosts: bool,
    pub stale_after: Duration,
    pub policy: Policy,
    /// JSON run log; `None` skips writing it
    pub log_file: Option<PathBuf>,
    pub top_empty: usize,
}

impl Config {
    /// Validate `options` against `settings`. Fails when no root is usable.
    pub fn from_parts(options: RunOptions, settings: Settings) -> Result<Self> {
        let roots = resolve_roots(&options.paths)?;

        let mut patterns = settings.exclude.unwrap_or_default();
        patterns.extend(options.extra_excludes);
        let excludes = ExcludeSet::new(&patterns)?;

        let stale_after = match options.stale_after.or(settings.stale_after) {
            Some(text) => parse_duration(&text)
                .with_context(|| format!("Invalid staleness threshold '{}'", text))?,
            None => crate::time::DEFAULT_STALE_AFTER,
        };

        let policy = Policy::new(settings.policy.unwrap_or_default());

        let log_file = options
            .log_file
            .or_else(|| roots.first().map(|root| root.join(DEFAULT_LOG_FILE)));

        Ok(Config {
            roots,
            mode: options.mode,
            excludes,
            cleanup_on_fill: options.cleanup_on_fill,
            zen: options.zen,
            diagram: options.diagram,
            detect_ghosts: options.detect_ghosts,
            stale_after,
            policy,
            log_file,
            top_empty: settings.top_empty.unwrap_or(10),
        })
    }

    /// Built-in defaults for the given roots, without a log file
    pub fn for_roots(paths: Vec<PathBuf>) -> Result<Self> {
        let options = RunOptions {
            paths,
            ..RunOptions::default()
        };
        let mut config = Self::from_parts(options, Settings::defaults()?)?;
        config.log_file = None;
        Ok(config)
    }
}

/// Canonicalize each root, dropping (with a warning) any that is missing or not a directory.
/// Roots nested inside another root are moved after it, so a shared directory is always
/// judged relative to the outermost root; otherwise the given order is kept.
fn resolve_roots(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut roots: Vec<PathBuf> = Vec::new();

    for path in paths {
        match path.canonicalize() {
            Ok(root) if root.is_dir() => {
                if !roots.contains(&root) {
                    roots.push(root);
                }
            }
            Ok(_) => warn!(path = %path.display(), "Skipping root: not a directory"),
            Err(err) => warn!(path = %path.display(), error = %err, "Skipping root"),
        }
    }

    if roots.is_empty() {
        let given = paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        anyhow::bail!("No valid root directory to scan (given: {})", given);
    }

    let nesting: Vec<usize> = roots
        .iter()
        .map(|root| {
            roots
                .iter()
                .filter(|other| *other != root && root.starts_with(other))
                .count()
        })
        .collect();
    let mut ordered: Vec<(usize, PathBuf)> = nesting.into_iter().zip(roots).collect();
    ordered.sort_by_key(|(depth, _)| *depth);

    Ok(ordered.into_iter().map(|(_, root)| root).collect())
}
