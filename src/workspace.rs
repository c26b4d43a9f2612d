//! Workspace glob expansion and package discovery.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::manifest::{Manifest, MANIFEST_FILE};
use crate::options::SyncOptions;

/// Packages discovered by expanding one workspace glob.
#[derive(Debug)]
pub struct Workspace {
    pub glob: String,
    pub packages: Vec<Manifest>,
}

impl Workspace {
    /// Names of the packages in this workspace. Dependencies on these are
    /// sibling references and are never synced against the root.
    pub fn names(&self) -> NameList {
        NameList(
            self.packages
                .iter()
                .filter_map(|p| p.name.clone())
                .collect(),
        )
    }
}

/// Names of the sibling packages of one glob expansion.
#[derive(Debug, Clone, Default)]
pub struct NameList(HashSet<String>);

impl NameList {
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for NameList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Resolves workspace globs to package manifests below the monorepo root.
#[derive(Debug)]
pub struct WorkspaceScanner<'a> {
    root: PathBuf,
    options: &'a SyncOptions,
}

impl<'a> WorkspaceScanner<'a> {
    /// Create a new workspace scanner.
    pub fn new(root: impl AsRef<Path>, options: &'a SyncOptions) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            options,
        }
    }

    /// Manifest paths a glob expands to, in processing order.
    ///
    /// `dir/*` lists the immediate entries of `dir` sorted by file name;
    /// anything else names a single package directory. Paths without a
    /// manifest, and paths matching the skip pattern, are left out.
    pub fn find_manifests(&self, glob: &str) -> Result<Vec<PathBuf>> {
        let candidates = if glob.ends_with('*') {
            let dir = normalize(&self.root.join(glob.trim_end_matches('*')));
            let mut candidates = Vec::new();

            for entry in WalkDir::new(&dir)
                .min_depth(1)
                .max_depth(1)
                // Links are resolved by the manifest existence check below, so
                // a dangling one is just a directory without a package.
                .follow_links(false)
                .sort_by_file_name()
            {
                let entry = entry
                    .with_context(|| format!("Failed to list workspace {}", dir.display()))?;
                candidates.push(entry.path().join(MANIFEST_FILE));
            }
            candidates
        } else {
            vec![normalize(&self.root.join(glob).join(MANIFEST_FILE))]
        };

        Ok(candidates
            .into_iter()
            .filter(|path| {
                if !path.exists() {
                    return false;
                }
                if self.options.is_skipped(path) {
                    tracing::debug!(path = %path.display(), "skipping manifest");
                    return false;
                }
                true
            })
            .collect())
    }

    /// Expand a glob and load every manifest it names. Any manifest that fails
    /// to parse aborts the load.
    pub fn load_workspace(&self, glob: &str) -> Result<Workspace> {
        let packages = self
            .find_manifests(glob)?
            .into_iter()
            .map(Manifest::load)
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(glob, packages = packages.len(), "loaded workspace");

        Ok(Workspace {
            glob: glob.to_string(),
            packages,
        })
    }
}

/// Drop `.` components so skip patterns see a clean path.
fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
