//! Run log of a sync: what was synced, added, missing or suspicious.

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;

use crate::manifest::DependencyKind;

/// How loudly an event is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// Something the reconciler did or noticed for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A package version was rewritten to the root's version.
    Synced {
        dependency: String,
        from: String,
        to: String,
    },
    /// A dependency missing from root was added to it.
    AddedToRoot {
        dependency: String,
        version: String,
        kind: DependencyKind,
    },
    /// A dependency missing from root was left for the operator to add.
    MissingFromRoot { dependency: String },
    /// devDependencies that name sibling workspace packages.
    SiblingDevDependencies { names: Vec<String> },
    /// The package declares no dependency tables at all.
    NoDependencies,
}

impl EventKind {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Synced { .. } | Self::AddedToRoot { .. } | Self::NoDependencies => {
                Severity::Info
            }
            Self::SiblingDevDependencies { .. } => Severity::Warn,
            Self::MissingFromRoot { .. } => Severity::Error,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Synced {
                dependency,
                from,
                to,
            } => write!(f, "Sync dependency `{}`: {} -> {}", dependency, from, to),
            Self::AddedToRoot {
                dependency,
                version,
                kind,
            } => write!(
                f,
                "Add dependency `{}`: {} to root {}",
                dependency,
                version,
                kind.key()
            ),
            Self::MissingFromRoot { dependency } => write!(
                f,
                "Dependency `{}` not found in root dependencies, please add it. Run with --fix to add automatically",
                dependency
            ),
            Self::SiblingDevDependencies { names } => write!(
                f,
                "has sub packages in devDependencies: {}",
                names.join(", ")
            ),
            Self::NoDependencies => write!(f, "No dependencies"),
        }
    }
}

/// One line of the run log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEvent {
    pub package: String,
    pub kind: EventKind,
}

impl SyncEvent {
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.package, self.kind)
    }
}

/// Ordered log of everything a sync run reported.
#[derive(Debug, Default)]
pub struct SyncReport {
    events: Vec<SyncEvent>,
}

impl SyncReport {
    pub fn push(&mut self, package: impl Into<String>, kind: EventKind) {
        self.events.push(SyncEvent {
            package: package.into(),
            kind,
        });
    }

    pub fn events(&self) -> &[SyncEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events recorded for one package, in order.
    pub fn for_package<'a>(&'a self, package: &'a str) -> impl Iterator<Item = &'a SyncEvent> {
        self.events.iter().filter(move |e| e.package == package)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.events
            .iter()
            .filter(|e| e.severity() == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Print the log: info lines to stdout, warnings and errors to stderr.
    pub fn print(&self) {
        for event in &self.events {
            let tag = format!("[{}]", event.package);
            match event.severity() {
                Severity::Info => println!("{} {}", tag.cyan(), event.kind),
                Severity::Warn => eprintln!("{} {}", tag.yellow().bold(), event.kind),
                Severity::Error => eprintln!("{} {}", tag.red().bold(), event.kind),
            }
        }
    }
}

/// Files a sync run touched.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    pub packages_seen: usize,
    /// Package manifests written, or that would have been in a dry run.
    pub written: Vec<PathBuf>,
    /// Whether auto-fix added entries to the root manifest.
    pub root_changed: bool,
    pub dry_run: bool,
}

impl SyncOutcome {
    pub fn print(&self) {
        if self.dry_run {
            println!(
                "\n{} {} package manifest(s) would be written",
                "Dry run mode:".yellow().bold(),
                self.written.len()
            );
            for path in &self.written {
                println!("  {}", path.display().to_string().dimmed());
            }
            if self.root_changed {
                println!("  {}", "root package.json (sorted)".dimmed());
            }
        } else {
            println!(
                "{} {} package(s) checked, {} manifest(s) written{}",
                "✓".green().bold(),
                self.packages_seen,
                self.written.len(),
                if self.root_changed {
                    ", root package.json updated"
                } else {
                    ""
                }
            );
        }
    }
}
