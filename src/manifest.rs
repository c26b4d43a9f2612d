//! package.json parsing and serialization utilities.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// File name of a package manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// Dependency name to version string, in declaration order.
pub type DependencyMap = IndexMap<String, String>;

/// Which dependency table of a manifest an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Normal,
    Dev,
}

impl DependencyKind {
    /// The manifest key holding this table.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Normal => "dependencies",
            Self::Dev => "devDependencies",
        }
    }
}

/// Fields of a manifest that the synchronizer reads. Everything else stays in
/// the document untouched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestFields {
    name: Option<String>,
    dependencies: Option<DependencyMap>,
    dev_dependencies: Option<DependencyMap>,
}

/// `workspaces` is either a plain list or yarn's `{ "packages": [...] }` form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WorkspacesField {
    List(Vec<String>),
    Config {
        #[serde(default)]
        packages: Vec<String>,
    },
}

/// Represents a package.json manifest file.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub path: PathBuf,
    pub name: Option<String>,
    pub dependencies: Option<DependencyMap>,
    pub dev_dependencies: Option<DependencyMap>,
    document: Map<String, Value>,
}

impl Manifest {
    /// Load a package.json file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(path, &content)
    }

    /// Parse manifest text that was read from `path`.
    pub fn parse(path: impl AsRef<Path>, content: &str) -> Result<Self> {
        let path = path.as_ref();
        let document: Map<String, Value> = serde_json::from_str(content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let fields: ManifestFields = serde_json::from_value(Value::Object(document.clone()))
            .with_context(|| format!("Invalid manifest fields in {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            name: fields.name,
            dependencies: fields.dependencies,
            dev_dependencies: fields.dev_dependencies,
            document,
        })
    }

    /// Name used to tag log lines for this package.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self
                .path
                .parent()
                .unwrap_or(self.path.as_path())
                .display()
                .to_string(),
        }
    }

    /// True when the manifest declares neither dependency table.
    pub fn has_no_dependencies(&self) -> bool {
        self.dependencies.is_none() && self.dev_dependencies.is_none()
    }

    /// Dependency table of the given kind, if declared.
    pub fn dependencies_of(&self, kind: DependencyKind) -> Option<&DependencyMap> {
        match kind {
            DependencyKind::Normal => self.dependencies.as_ref(),
            DependencyKind::Dev => self.dev_dependencies.as_ref(),
        }
    }

    /// Add or replace a dependency, creating the table when it is missing.
    pub fn insert_dependency(&mut self, kind: DependencyKind, name: &str, version: &str) {
        let table = match kind {
            DependencyKind::Normal => &mut self.dependencies,
            DependencyKind::Dev => &mut self.dev_dependencies,
        };
        table
            .get_or_insert_with(DependencyMap::new)
            .insert(name.to_string(), version.to_string());
    }

    /// Sort both dependency tables by name.
    pub fn sort_dependencies(&mut self) {
        for table in [&mut self.dependencies, &mut self.dev_dependencies]
            .into_iter()
            .flatten()
        {
            table.sort_keys();
        }
    }

    /// Render the manifest as 2-space indented JSON with a trailing newline.
    ///
    /// Keys keep their original position in the document; a table that did
    /// not exist before is appended at the end.
    pub fn to_json_string(&self) -> Result<String> {
        let mut document = self.document.clone();

        for kind in [DependencyKind::Normal, DependencyKind::Dev] {
            if let Some(table) = self.dependencies_of(kind) {
                let table = serde_json::to_value(table)
                    .with_context(|| format!("Failed to serialize {}", kind.key()))?;
                document.insert(kind.key().to_string(), table);
            }
        }

        let mut output = serde_json::to_string_pretty(&Value::Object(document))
            .with_context(|| format!("Failed to serialize {}", self.path.display()))?;
        output.push('\n');
        Ok(output)
    }

    /// Save the manifest back to disk.
    pub fn save(&self) -> Result<()> {
        let content = self.to_json_string()?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), "wrote manifest");
        Ok(())
    }
}

/// The top-level package.json of a monorepo.
#[derive(Debug, Clone)]
pub struct RootManifest {
    pub manifest: Manifest,
    pub workspaces: Vec<String>,
}

impl RootManifest {
    /// Load `package.json` from the monorepo root directory.
    pub fn load(root_dir: impl AsRef<Path>) -> Result<Self> {
        let path = root_dir.as_ref().join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read root manifest {}", path.display()))?;
        Self::parse(&path, &content)
    }

    /// Parse root manifest text that was read from `path`.
    pub fn parse(path: impl AsRef<Path>, content: &str) -> Result<Self> {
        let path = path.as_ref();
        let manifest = Manifest::parse(path, content)?;

        let workspaces = match manifest.document.get("workspaces") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => match WorkspacesField::deserialize(value)
                .with_context(|| format!("Invalid workspaces in {}", path.display()))?
            {
                WorkspacesField::List(globs) => globs,
                WorkspacesField::Config { packages } => packages,
            },
        };

        Ok(Self {
            manifest,
            workspaces,
        })
    }

    /// Version the root expects for `name`. devDependencies win over
    /// dependencies when both declare it.
    pub fn expected_version(&self, name: &str) -> Option<&str> {
        self.manifest
            .dev_dependencies
            .as_ref()
            .and_then(|deps| deps.get(name))
            .or_else(|| {
                self.manifest
                    .dependencies
                    .as_ref()
                    .and_then(|deps| deps.get(name))
            })
            .map(String::as_str)
    }

    /// Sort both dependency tables and save.
    pub fn save_sorted(&mut self) -> Result<()> {
        self.manifest.sort_dependencies();
        self.manifest.save()
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
