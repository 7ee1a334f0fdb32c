//! The enlightenment pass: walk, classify, act.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::action::{ActionKind, BuddhaAction, FailedOperation, Failure};
use crate::config::Config;
use crate::diagram;
use crate::gitignore;
use crate::insight::{DirectoryInsight, InsightBuilder};
use crate::placeholder::{is_generated, placeholder_for, GENERIC, README};
use crate::policy::Policy;
use crate::report::{rank_deepest, EmptyDir, RunReport};
use crate::time::StaleClock;
use crate::vcs::VcsQuery;
use crate::walker::{DirectoryWalker, WalkedDir};

const DAY_SECS: u64 = 24 * 60 * 60;

pub struct Reconciler<'a> {
    config: &'a Config,
    vcs: &'a dyn VcsQuery,
}

impl<'a> Reconciler<'a> {
    pub fn new(config: &'a Config, vcs: &'a dyn VcsQuery) -> Self {
        Reconciler { config, vcs }
    }

    /// Full run: reconcile every directory, then patch `.gitignore` files, render the
    /// diagram when asked, and write the run log
    pub fn enlighten(&self) -> RunReport {
        let mut report = self.reconcile_all();

        let names = self.config.mode.file_names();
        for root in &self.config.roots {
            match gitignore::patch_gitignore(root, names) {
                Ok(added) if !added.is_empty() => {
                    info!(root = %root.display(), rules = ?added, "Patched .gitignore");
                    report.gitignore_patched.push(root.join(gitignore::GITIGNORE));
                }
                Ok(_) => {}
                Err(err) => warn!(
                    root = %root.display(),
                    error = %format!("{:#}", err),
                    "Could not patch .gitignore"
                ),
            }
        }

        if self.config.diagram {
            report.diagram = Some(diagram::render(&self.config.roots, &self.config.excludes));
        }

        if let Some(log_file) = &self.config.log_file {
            if let Err(err) = report.write_log(log_file, &self.config.roots) {
                warn!(error = %format!("{:#}", err), "Could not write run log");
            }
        }

        report
    }

    /// Walk every root once and apply placeholder rules, without post-processing
    pub fn reconcile_all(&self) -> RunReport {
        let clock = StaleClock::new(self.config.stale_after);
        let builder =
            InsightBuilder::new(self.vcs, clock).with_ghost_detection(self.config.detect_ghosts);
        let progress = spinner(self.config.zen);

        let mut report = RunReport::default();
        let mut empties = Vec::new();

        let walker = DirectoryWalker::new(&self.config.roots, self.config.excludes.clone());
        for dir in walker {
            if report.scanned % 64 == 0 {
                progress.set_message(format!("Scanning: {} directories", report.scanned));
            }

            let Some(insight) = builder.build(&dir.path) else {
                report.skipped += 1;
                continue;
            };
            report.scanned += 1;

            if insight.is_empty {
                empties.push(EmptyDir {
                    path: dir.path.clone(),
                    depth: dir.depth(),
                });
            }

            self.reconcile(&dir, &insight, &clock, &mut report);
        }

        progress.finish_and_clear();
        report.deepest_empty = rank_deepest(empties, self.config.top_empty);
        report
    }

    fn reconcile(
        &self,
        dir: &WalkedDir,
        insight: &DirectoryInsight,
        clock: &StaleClock,
        report: &mut RunReport,
    ) {
        let key = Policy::directory_key(dir.relative());

        if insight.is_empty && !insight.has_keep_file {
            let enforced = self.config.policy.should_enforce(&key);
            if enforced || !self.config.zen {
                let reason = if enforced {
                    format!("empty directory, enforced by policy ({})", key)
                } else {
                    "empty directory".to_string()
                };
                match self.create_placeholder(&insight.path) {
                    Ok(file_name) => report.actions.push(BuddhaAction::new(
                        ActionKind::KeepCreated,
                        &insight.path,
                        format!("{}: wrote {}", reason, file_name),
                    )),
                    Err(err) => {
                        warn!(
                            path = %insight.path.display(),
                            error = %format!("{:#}", err),
                            "Placeholder not created"
                        );
                        report.failures.push(Failure {
                            path: insight.path.clone(),
                            operation: FailedOperation::Create,
                            error: format!("{:#}", err),
                        });
                    }
                }
            } else if self.config.policy.warns(&key) {
                warn!(path = %insight.path.display(), "Empty directory left without placeholder");
                report.warned.push(insight.path.clone());
            } else {
                debug!(path = %insight.path.display(), "Zen: leaving empty directory alone");
            }
        } else if insight.is_filled() && self.config.cleanup_on_fill {
            let targets = insight
                .keep_file_path
                .iter()
                .chain(insight.generic_file.iter());
            for keep_file in targets {
                match remove_placeholder(keep_file) {
                    Ok(true) => report.actions.push(BuddhaAction::new(
                        ActionKind::KeepRemoved,
                        &insight.path,
                        format!(
                            "directory has {} other entries: removed {}",
                            insight.other_entries,
                            keep_file.file_name().unwrap_or_default().to_string_lossy()
                        ),
                    )),
                    Ok(false) => {
                        debug!(path = %keep_file.display(), "Keeping hand-written placeholder")
                    }
                    Err(err) => {
                        warn!(
                            path = %keep_file.display(),
                            error = %format!("{:#}", err),
                            "Placeholder not removed"
                        );
                        report.failures.push(Failure {
                            path: insight.path.clone(),
                            operation: FailedOperation::Remove,
                            error: format!("{:#}", err),
                        });
                    }
                }
            }
        }

        if insight.is_zombie {
            let age_days = age_in_days(clock, insight);
            report.actions.push(BuddhaAction::new(
                ActionKind::ZombieDetected,
                &insight.path,
                format!("no file modified for {} days", age_days),
            ));
        }

        if insight.is_ghost {
            report.actions.push(BuddhaAction::new(
                ActionKind::GhostDetected,
                &insight.path,
                "referenced by tracked files but not tracked itself",
            ));
        }
    }

    fn create_placeholder(&self, dir: &Path) -> Result<&'static str> {
        let (file_name, content) = placeholder_for(self.config.mode, dir);
        let target = dir.join(file_name);
        fs::write(&target, content)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        debug!(path = %target.display(), "Created placeholder");
        Ok(file_name)
    }
}

/// Delete a placeholder. A README or `placeholder` file is only deleted when git-buddha
/// wrote it; returns `Ok(false)` when the file was left in place for that reason.
fn remove_placeholder(keep_file: &Path) -> Result<bool> {
    if keep_file
        .file_name()
        .is_some_and(|name| name == README || name == GENERIC)
    {
        let content = fs::read_to_string(keep_file)
            .with_context(|| format!("Failed to read {}", keep_file.display()))?;
        if !is_generated(&content) {
            return Ok(false);
        }
    }

    fs::remove_file(keep_file)
        .with_context(|| format!("Failed to remove {}", keep_file.display()))?;
    debug!(path = %keep_file.display(), "Removed placeholder");
    Ok(true)
}

/// Whole days between the newest file and the run's frozen "now"
fn age_in_days(clock: &StaleClock, insight: &DirectoryInsight) -> u64 {
    clock
        .now()
        .duration_since(insight.last_modified)
        .map(|age| age.as_secs() / DAY_SECS)
        .unwrap_or(0)
}

fn spinner(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
    {
        progress.set_style(style);
    }
    progress.enable_steady_tick(std::time::Duration::from_millis(100));
    progress
}
