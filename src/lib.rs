//! git-buddha - keeps empty directories alive in Git.
//!
//! Git does not track directories, only files. git-buddha walks a tree, classifies every
//! directory it finds, and reconciles placeholder files (`.gitkeep` and friends) so that
//! empty directories survive a commit and obsolete placeholders disappear once a directory
//! fills up.
//!
//! ## Pipeline
//!
//! - [`walker`] yields directories under the configured roots, pruning excluded globs
//! - [`insight`] turns each directory into a [`DirectoryInsight`] snapshot
//! - [`reconciler`] applies [`policy`] and [`placeholder`] rules and records [`BuddhaAction`]s
//! - [`report`], [`gitignore`] and [`diagram`] run once the walk is done

pub mod action;
pub mod config;
pub mod diagram;
pub mod gitignore;
pub mod insight;
pub mod patterns;
pub mod placeholder;
pub mod policy;
pub mod reconciler;
pub mod report;
pub mod time;
pub mod vcs;
pub mod walker;

// Re-export commonly used items
pub use action::{ActionKind, BuddhaAction, Failure, FailedOperation};
pub use config::{Config, RunOptions, Settings};
pub use insight::{DirectoryInsight, InsightBuilder};
pub use patterns::ExcludeSet;
pub use placeholder::{generate_for, intelligent_placeholder, placeholder_for, PlaceholderMode};
pub use policy::{Policy, PolicyAction};
pub use reconciler::Reconciler;
pub use report::RunReport;
pub use time::{parse_duration, StaleClock};
pub use vcs::{detect_vcs, CommandVcs, NoVcs, VcsQuery, VcsType};
pub use walker::{DirectoryWalker, WalkedDir};
