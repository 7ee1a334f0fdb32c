//! Plain-text directory tree, annotated with placeholder state.

use std::fs;
use std::path::{Path, PathBuf};

use crate::patterns::ExcludeSet;
use crate::placeholder::KEEP_FILE_NAMES;
use crate::walker::DirectoryWalker;

/// Render each root as an indented tree of its directories.
///
/// Directories holding a placeholder are tagged with its name, directories with no
/// entries at all are tagged `(empty)`.
pub fn render(roots: &[PathBuf], excludes: &ExcludeSet) -> String {
    let mut out = String::new();

    for root in roots {
        out.push_str(&format!("{}/\n", root.display()));

        for dir in DirectoryWalker::new(std::slice::from_ref(root), excludes.clone()) {
            let indent = "  ".repeat(dir.depth());
            let name = dir
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            out.push_str(&format!("{}{}/{}\n", indent, name, annotation(&dir.path)));
        }
    }

    out
}

fn annotation(dir: &Path) -> String {
    let names: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => return " (unreadable)".to_string(),
    };

    if names.is_empty() {
        return " (empty)".to_string();
    }

    match KEEP_FILE_NAMES
        .iter()
        .find(|keep| names.iter().any(|name| name == **keep))
    {
        Some(keep) => format!(" [{}]", keep),
        None => String::new(),
    }
}
