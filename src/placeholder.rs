//! Placeholder file names and content.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const GITKEEP: &str = ".gitkeep";
pub const README: &str = "README.md";
pub const GENERIC: &str = "placeholder";

/// Every file name recognised as a placeholder
pub const KEEP_FILE_NAMES: &[&str] = &[GITKEEP, README, GENERIC];

/// Placeholder names that cleanup may delete once a directory fills up
pub const REMOVABLE_KEEP_FILES: &[&str] = &[GITKEEP, README];

/// Every generated file ends with a line carrying this text
const MARKER: &str = "Managed by git-buddha";

/// Which placeholder file is written into an empty directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderMode {
    #[default]
    Gitkeep,
    Readme,
    Placeholder,
    /// Pick the file name from the directory name
    Intelligent,
}

impl PlaceholderMode {
    /// File names this mode can produce
    pub fn file_names(&self) -> &'static [&'static str] {
        match self {
            PlaceholderMode::Gitkeep => &[GITKEEP],
            PlaceholderMode::Readme => &[README],
            PlaceholderMode::Placeholder => &[GENERIC],
            PlaceholderMode::Intelligent => &[GITKEEP, README],
        }
    }
}

impl FromStr for PlaceholderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gitkeep" => Ok(PlaceholderMode::Gitkeep),
            "readme" => Ok(PlaceholderMode::Readme),
            "placeholder" => Ok(PlaceholderMode::Placeholder),
            "ai" | "intelligent" => Ok(PlaceholderMode::Intelligent),
            other => Err(format!(
                "Invalid mode '{}'. Use: gitkeep|readme|placeholder|ai",
                other
            )),
        }
    }
}

impl fmt::Display for PlaceholderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaceholderMode::Gitkeep => "gitkeep",
            PlaceholderMode::Readme => "readme",
            PlaceholderMode::Placeholder => "placeholder",
            PlaceholderMode::Intelligent => "ai",
        };
        f.write_str(name)
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Placeholder text tailored to what the directory name suggests it will hold
pub fn generate_for(path: &Path) -> String {
    let name = dir_name(path);
    let lower = name.to_lowercase();

    if ["image", "asset", "icon"].iter().any(|hint| lower.contains(hint)) {
        format!("# Image assets: drop icons, images and other visual files here\n# {MARKER}\n")
    } else if lower.contains("font") {
        format!("# Font files: .ttf, .otf, .woff and .woff2 live here\n# {MARKER}\n")
    } else if lower.contains("test") {
        format!("# Test files: test modules and fixtures go here\n# {MARKER}\n")
    } else if lower.contains("migration") {
        format!("-- SQL migrations: add versioned .sql files here\n-- {MARKER}\n")
    } else {
        format!("# This directory is intentionally preserved\n# Purpose: {name}\n# {MARKER}\n")
    }
}

/// File name and content chosen from the directory name alone
pub fn intelligent_placeholder(path: &Path) -> (&'static str, String) {
    let file_name = if dir_name(path) == "tests" {
        README
    } else {
        GITKEEP
    };
    (file_name, generate_for(path))
}

/// File name and content for `mode`
pub fn placeholder_for(mode: PlaceholderMode, path: &Path) -> (&'static str, String) {
    match mode {
        PlaceholderMode::Gitkeep => (GITKEEP, generate_for(path)),
        PlaceholderMode::Readme => (README, generate_for(path)),
        PlaceholderMode::Placeholder => (GENERIC, generate_for(path)),
        PlaceholderMode::Intelligent => intelligent_placeholder(path),
    }
}

/// Whether file content was written by [`generate_for`]
pub fn is_generated(content: &str) -> bool {
    content.contains(MARKER)
}
