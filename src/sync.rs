//! Dependency reconciliation against the root manifest.
//!
//! Workspaces and their packages are processed strictly in order. Entries that
//! auto-fix adds to the root are visible to every package processed after the
//! one that introduced them, so the first declaration of a new dependency
//! becomes the version all later packages sync to.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::manifest::{DependencyKind, DependencyMap, Manifest, RootManifest};
use crate::options::SyncOptions;
use crate::report::{EventKind, SyncOutcome, SyncReport};
use crate::workspace::{NameList, WorkspaceScanner};

/// What reconciling a single package amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageOutcome {
    /// The package declares no dependency tables and was left alone.
    NoDependencies,
    /// The package was reconciled; `changed` is true if a version was rewritten.
    Reconciled { changed: bool },
}

/// State shared by every package step of one run: the root dependency tables,
/// the options and the run log.
pub struct ReconciliationContext<'a> {
    root: &'a mut RootManifest,
    options: &'a SyncOptions,
    report: &'a mut SyncReport,
    root_changed: bool,
}

impl<'a> ReconciliationContext<'a> {
    pub fn new(
        root: &'a mut RootManifest,
        options: &'a SyncOptions,
        report: &'a mut SyncReport,
    ) -> Self {
        Self {
            root,
            options,
            report,
            root_changed: false,
        }
    }

    /// Whether auto-fix has added anything to the root so far.
    pub fn root_changed(&self) -> bool {
        self.root_changed
    }

    /// Reconcile both dependency tables of `package` against the root.
    pub fn reconcile_package(
        &mut self,
        package: &mut Manifest,
        siblings: &NameList,
    ) -> PackageOutcome {
        let name = package.display_name();

        if let Some(dev) = &package.dev_dependencies {
            let names: Vec<String> = dev
                .keys()
                .filter(|d| siblings.contains(d))
                .cloned()
                .collect();
            if !names.is_empty() {
                self.report
                    .push(&name, EventKind::SiblingDevDependencies { names });
            }
        }

        if package.has_no_dependencies() {
            if package.name.is_some() {
                self.report.push(&name, EventKind::NoDependencies);
            }
            return PackageOutcome::NoDependencies;
        }

        let mut changed = false;
        if let Some(deps) = package.dependencies.as_mut() {
            changed |= self.reconcile_map(&name, deps, siblings, DependencyKind::Normal);
        }
        if let Some(deps) = package.dev_dependencies.as_mut() {
            changed |= self.reconcile_map(&name, deps, siblings, DependencyKind::Dev);
        }

        PackageOutcome::Reconciled { changed }
    }

    /// Reconcile one dependency table. Returns true if any version changed.
    pub fn reconcile_map(
        &mut self,
        package: &str,
        deps: &mut DependencyMap,
        siblings: &NameList,
        kind: DependencyKind,
    ) -> bool {
        let mut changed = false;

        for (dependency, current) in deps.iter_mut() {
            if siblings.contains(dependency) {
                continue;
            }

            let Some(expected) = self.root.expected_version(dependency).map(str::to_string)
            else {
                self.handle_missing(package, dependency, current, kind);
                continue;
            };

            if self.options.is_ignored_version(current) || expected == *current {
                continue;
            }

            self.report.push(
                package,
                EventKind::Synced {
                    dependency: dependency.clone(),
                    from: current.clone(),
                    to: expected.clone(),
                },
            );
            *current = expected;
            changed = true;
        }

        changed
    }

    fn handle_missing(
        &mut self,
        package: &str,
        dependency: &str,
        version: &str,
        kind: DependencyKind,
    ) {
        if self.options.is_ignored_name(dependency) || self.options.is_ignored_version(version) {
            return;
        }

        if self.options.fix {
            self.root.manifest.insert_dependency(kind, dependency, version);
            self.root_changed = true;
            self.report.push(
                package,
                EventKind::AddedToRoot {
                    dependency: dependency.to_string(),
                    version: version.to_string(),
                    kind,
                },
            );
        } else {
            self.report.push(
                package,
                EventKind::MissingFromRoot {
                    dependency: dependency.to_string(),
                },
            );
        }
    }
}

/// Runs a full sync over a monorepo.
pub struct Synchronizer {
    root_dir: PathBuf,
    options: SyncOptions,
}

impl Synchronizer {
    /// Create a synchronizer for the monorepo rooted at `root_dir`.
    pub fn new(root_dir: impl AsRef<Path>, options: SyncOptions) -> Self {
        Self {
            root_dir: root_dir.as_ref().to_path_buf(),
            options,
        }
    }

    /// Globs in processing order: the root's own, then the extra ones.
    pub fn workspace_globs(&self, root: &RootManifest) -> Vec<String> {
        root.workspaces
            .iter()
            .chain(self.options.others.iter())
            .cloned()
            .collect()
    }

    /// Sync every workspace package with the root manifest.
    ///
    /// Events are appended to `report` as they happen, so a fatal error part
    /// way through still leaves the log of everything done before it.
    pub fn run(&self, report: &mut SyncReport) -> Result<SyncOutcome> {
        let mut root = RootManifest::load(&self.root_dir)?;
        let globs = self.workspace_globs(&root);
        let scanner = WorkspaceScanner::new(&self.root_dir, &self.options);

        let mut outcome = SyncOutcome {
            dry_run: self.options.dry_run,
            ..Default::default()
        };

        let mut context = ReconciliationContext::new(&mut root, &self.options, report);

        for glob in &globs {
            let workspace = scanner
                .load_workspace(glob)
                .with_context(|| format!("Failed to load workspace '{}'", glob))?;
            let siblings = workspace.names();

            for mut package in workspace.packages {
                outcome.packages_seen += 1;

                let changed = match context.reconcile_package(&mut package, &siblings) {
                    PackageOutcome::NoDependencies => continue,
                    PackageOutcome::Reconciled { changed } => changed,
                };

                if self.options.only_changed && !changed {
                    continue;
                }
                if !self.options.dry_run {
                    package.save()?;
                }
                outcome.written.push(package.path);
            }
        }

        outcome.root_changed = context.root_changed();

        if outcome.root_changed && !self.options.dry_run {
            root.save_sorted()?;
        }

        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
