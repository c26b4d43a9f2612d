//! Run options: filters and write policy for a sync run.

use regex::Regex;
use std::path::Path;

/// Options controlling a sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Workspace globs appended after the ones the root declares.
    pub others: Vec<String>,
    /// Dependency names that are never reported or added when missing from root.
    pub ignore: Option<Regex>,
    /// Dependency versions that are exempt from syncing and missing checks.
    pub ignore_version: Option<Regex>,
    /// Manifest paths excluded from discovery.
    pub skip: Option<Regex>,
    /// Add missing dependencies to the root manifest instead of reporting them.
    pub fix: bool,
    /// Only rewrite package manifests whose versions changed.
    pub only_changed: bool,
    /// Reconcile and report without writing anything.
    pub dry_run: bool,
}

impl SyncOptions {
    pub fn is_ignored_name(&self, name: &str) -> bool {
        self.ignore.as_ref().is_some_and(|re| re.is_match(name))
    }

    pub fn is_ignored_version(&self, version: &str) -> bool {
        self.ignore_version
            .as_ref()
            .is_some_and(|re| re.is_match(version))
    }

    pub fn is_skipped(&self, manifest_path: &Path) -> bool {
        self.skip
            .as_ref()
            .is_some_and(|re| re.is_match(&manifest_path.to_string_lossy()))
    }
}

/// Compile a user supplied filter pattern.
pub fn parse_pattern(pattern: &str) -> Result<Regex, String> {
    Regex::new(pattern).map_err(|e| format!("invalid pattern '{}': {}", pattern, e))
}
