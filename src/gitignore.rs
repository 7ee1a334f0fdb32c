//! Allow-rules for placeholder files in `.gitignore`.

use anyhow::{Context, Result};
use globset::Glob;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

pub const GITIGNORE: &str = ".gitignore";

/// Append `!name` to `<root>/.gitignore` for every placeholder name the file ignores
/// without already allowing it. Returns the rules added; a missing `.gitignore` is left
/// alone.
pub fn patch_gitignore(root: &Path, names: &[&str]) -> Result<Vec<String>> {
    let path = root.join(GITIGNORE);
    if !path.is_file() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let missing: Vec<String> = names
        .iter()
        .filter(|name| ignores(&content, name) && !allows(&content, name))
        .map(|name| format!("!{}", name))
        .collect();

    if missing.is_empty() {
        return Ok(missing);
    }

    let mut addition = String::new();
    if !content.is_empty() && !content.ends_with('\n') {
        addition.push('\n');
    }
    addition.push_str("# Keep git-buddha placeholders\n");
    for rule in &missing {
        addition.push_str(rule);
        addition.push('\n');
    }

    let mut file = OpenOptions::new()
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    file.write_all(addition.as_bytes())
        .with_context(|| format!("Failed to append to {}", path.display()))?;

    Ok(missing)
}

fn rules(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Final path segment of a pattern; that is the part a placeholder's own name must match
fn last_segment(pattern: &str) -> &str {
    pattern.rsplit('/').next().unwrap_or(pattern)
}

/// Whether a non-negated, file-applicable pattern matches `name`
pub fn ignores(content: &str, name: &str) -> bool {
    rules(content)
        .filter(|line| !line.starts_with('!') && !line.ends_with('/'))
        .any(|line| {
            let segment = last_segment(line);
            segment == name
                || Glob::new(segment)
                    .map(|glob| glob.compile_matcher().is_match(name))
                    .unwrap_or(false)
        })
}

/// Whether an allow-rule for `name` already exists
pub fn allows(content: &str, name: &str) -> bool {
    rules(content)
        .filter_map(|line| line.strip_prefix('!'))
        .any(|rule| last_segment(rule) == name)
}
