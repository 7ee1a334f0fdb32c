use anyhow::Result;
use clap::Parser;
use git_buddha::{CommandVcs, Config, PlaceholderMode, Reconciler, RunOptions, Settings};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "git-buddha",
    author,
    version,
    about = "Keep empty directories alive in Git with placeholder files",
    long_about = None
)]
struct Args {
    /// Directories to scan (defaults to current directory)
    #[arg(default_values_t = vec![String::from(".")])]
    paths: Vec<String>,

    /// Placeholder strategy: gitkeep, readme, placeholder or ai
    #[arg(long, default_value = "gitkeep")]
    mode: PlaceholderMode,

    /// Quiet mode: only policy-enforced directories receive placeholders
    #[arg(long)]
    zen: bool,

    /// Print a directory tree after reconciling
    #[arg(long)]
    diagram: bool,

    /// Keep placeholders in directories that are no longer empty
    #[arg(long)]
    no_cleanup: bool,

    /// Watch for changes (reserved, runs a single pass)
    #[arg(long)]
    watch: bool,

    /// TOML file overriding the built-in settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Additional glob of directories to skip (can be repeated)
    #[arg(long, short = 'x', value_name = "GLOB")]
    exclude: Vec<String>,

    /// Report directories untouched for longer than this (e.g. 180d, 26w, 6m)
    #[arg(long, value_name = "DURATION")]
    stale_after: Option<String>,

    /// Flag untracked directories that tracked files mention by name
    #[arg(long)]
    ghosts: bool,

    /// Where to write the JSON run log (defaults to .git-buddha.json in the first path)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Show debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn init_tracing(verbose: bool, zen: bool) {
    let default_level = if verbose {
        "debug"
    } else if zen {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose, args.zen);

    if args.watch {
        warn!("--watch is not implemented yet; running a single pass");
    }

    let mut settings = Settings::defaults()?;
    if let Some(path) = &args.config {
        settings = settings.merge(Settings::from_file(path)?);
    }

    let options = RunOptions {
        paths: args.paths.iter().map(PathBuf::from).collect(),
        mode: args.mode,
        zen: args.zen,
        diagram: args.diagram,
        cleanup_on_fill: !args.no_cleanup,
        detect_ghosts: args.ghosts,
        extra_excludes: args.exclude,
        stale_after: args.stale_after,
        log_file: args.log_file,
    };
    let config = Config::from_parts(options, settings)?;
    info!(roots = ?config.roots, mode = %config.mode, "Starting enlightenment pass");

    let vcs = CommandVcs::new();
    let report = Reconciler::new(&config, &vcs).enlighten();
    report.print(config.zen);

    Ok(())
}
