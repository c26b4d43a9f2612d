use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser};
use colored::Colorize;
use regex::Regex;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use yarn_sync::options::parse_pattern;
use yarn_sync::{SyncOptions, SyncReport, Synchronizer};

/// Keep workspace package dependency versions in sync with the root package.json.
#[derive(Debug, Parser)]
#[command(name = "yarn-sync", version, about)]
struct Cli {
    /// Extra workspace globs, processed after the ones the root declares
    #[arg(long, value_name = "GLOB", value_delimiter = ',', action = ArgAction::Append)]
    others: Vec<String>,

    /// Dependency names never reported or added when missing from root
    #[arg(long, value_name = "REGEX", env = "YARN_SYNC_IGNORE", value_parser = parse_pattern)]
    ignore: Option<Regex>,

    /// Dependency versions exempt from syncing
    #[arg(
        long = "ignoreVersion",
        visible_alias = "ignore-version",
        value_name = "REGEX",
        env = "YARN_SYNC_IGNORE_VERSION",
        value_parser = parse_pattern
    )]
    ignore_version: Option<Regex>,

    /// Package manifest paths excluded from discovery
    #[arg(long, value_name = "REGEX", env = "YARN_SYNC_SKIP", value_parser = parse_pattern)]
    skip: Option<Regex>,

    /// Add dependencies missing from root instead of reporting them
    #[arg(long, env = "YARN_SYNC_FIX", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
    fix: bool,

    /// Only rewrite package manifests whose versions changed
    #[arg(long, env = "YARN_SYNC_ONLY_CHANGED", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
    only_changed: bool,

    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Monorepo root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Show diagnostic output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> SyncOptions {
        SyncOptions {
            others: self.others.clone(),
            ignore: self.ignore.clone(),
            ignore_version: self.ignore_version.clone(),
            skip: self.skip.clone(),
            fix: self.fix,
            only_changed: self.only_changed,
            dry_run: self.dry_run,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "yarn_sync=debug" } else { "warn" })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    tracing::debug!(root = %root.display(), "syncing workspace dependencies");

    let mut report = SyncReport::default();
    let result = Synchronizer::new(&root, cli.options()).run(&mut report);
    report.print();

    let outcome = result?;
    if cli.dry_run || cli.verbose {
        outcome.print();
    }

    Ok(())
}
