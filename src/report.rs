//! Run report: counts, failures, deepest empty directories, JSON log and console summary.

use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::action::{ActionKind, BuddhaAction, Failure};

/// An empty directory as seen at scan time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyDir {
    pub path: PathBuf,
    /// Components below the root it was found under
    pub depth: usize,
}

/// Everything a run did, in walk order
#[derive(Debug, Default)]
pub struct RunReport {
    pub actions: Vec<BuddhaAction>,
    pub failures: Vec<Failure>,
    /// Directories classified
    pub scanned: usize,
    /// Directories that vanished or could not be listed
    pub skipped: usize,
    pub deepest_empty: Vec<EmptyDir>,
    /// Empty directories a WARN rule matched that were left without a placeholder
    pub warned: Vec<PathBuf>,
    pub gitignore_patched: Vec<PathBuf>,
    pub diagram: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub scanned: usize,
    pub skipped: usize,
    pub keep_created: usize,
    pub keep_removed: usize,
    pub zombie_detected: usize,
    pub ghost_detected: usize,
    pub warned: usize,
    pub failures: usize,
}

#[derive(Serialize)]
struct RunLog<'a> {
    generated_at: String,
    roots: &'a [PathBuf],
    summary: Summary,
    actions: &'a [BuddhaAction],
    failures: &'a [Failure],
    warned: &'a [PathBuf],
    deepest_empty: &'a [EmptyDir],
}

impl RunReport {
    pub fn count(&self, kind: ActionKind) -> usize {
        self.actions.iter().filter(|a| a.action == kind).count()
    }

    pub fn actions_of(&self, kind: ActionKind) -> impl Iterator<Item = &BuddhaAction> {
        self.actions.iter().filter(move |a| a.action == kind)
    }

    pub fn summary(&self) -> Summary {
        Summary {
            scanned: self.scanned,
            skipped: self.skipped,
            keep_created: self.count(ActionKind::KeepCreated),
            keep_removed: self.count(ActionKind::KeepRemoved),
            zombie_detected: self.count(ActionKind::ZombieDetected),
            ghost_detected: self.count(ActionKind::GhostDetected),
            warned: self.warned.len(),
            failures: self.failures.len(),
        }
    }

    /// Write the run as pretty JSON, replacing any previous log at `path`
    pub fn write_log(&self, path: &Path, roots: &[PathBuf]) -> Result<()> {
        let log = RunLog {
            generated_at: Local::now().to_rfc3339(),
            roots,
            summary: self.summary(),
            actions: &self.actions,
            failures: &self.failures,
            warned: &self.warned,
            deepest_empty: &self.deepest_empty,
        };

        let json = serde_json::to_string_pretty(&log).context("Failed to serialize run log")?;
        fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write run log {}", path.display()))
    }

    /// Print the run to stdout. Zen drops the per-directory chatter but keeps failures,
    /// WARN-rule hits and a requested diagram.
    pub fn print(&self, zen: bool) {
        if !zen {
            for action in &self.actions {
                let path = action.path.display();
                match action.action {
                    ActionKind::KeepCreated => println!("{} {}", "Preserved:".green(), path),
                    ActionKind::KeepRemoved => println!("{} {}", "Released:".cyan(), path),
                    ActionKind::ZombieDetected => {
                        println!("{} {} ({})", "Zombie:".yellow(), path, action.reason)
                    }
                    ActionKind::GhostDetected => {
                        println!("{} {} ({})", "Ghost:".magenta(), path, action.reason)
                    }
                }
            }
        }

        for failure in &self.failures {
            println!("{} {}", "Failed:".red().bold(), failure.error);
        }

        for path in &self.warned {
            println!("{} {}", "Unpreserved:".yellow().bold(), path.display());
        }

        if !zen {
            for gitignore in &self.gitignore_patched {
                println!("{} {}", "Patched:".blue(), gitignore.display());
            }
        }

        if let Some(diagram) = &self.diagram {
            println!();
            print!("{}", diagram);
        }

        if !zen && !self.deepest_empty.is_empty() {
            println!();
            println!("{}", "Deepest empty directories:".bold());
            for empty in &self.deepest_empty {
                println!("  {:>3}  {}", empty.depth, empty.path.display());
            }
        }

        if zen {
            if !self.failures.is_empty() || !self.warned.is_empty() || self.diagram.is_some() {
                println!();
            }
            println!("Your project structure is now in harmony with the universe.");
            return;
        }

        println!();
        let preserved = self.count(ActionKind::KeepCreated);
        if preserved == 0 {
            println!("No empty directories found. Already enlightened.");
        } else {
            println!(
                "{}",
                format!("Enlightenment complete. {} directories preserved.", preserved).bold()
            );
        }
    }
}

/// The `limit` deepest directories, deepest first, ties broken by path
pub fn rank_deepest(mut empties: Vec<EmptyDir>, limit: usize) -> Vec<EmptyDir> {
    empties.sort_by(|a, b| b.depth.cmp(&a.depth).then_with(|| a.path.cmp(&b.path)));
    empties.truncate(limit);
    empties
}
