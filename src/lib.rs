//! Dependency version synchronization for yarn workspaces.
//!
//! Every workspace package should declare the same version of a shared
//! dependency as the root `package.json`. This crate discovers the workspace
//! packages, rewrites their versions to match the root and, when asked, adds
//! dependencies the root does not know about yet.

pub mod manifest;
pub mod options;
pub mod report;
pub mod sync;
pub mod workspace;

pub use manifest::{DependencyKind, DependencyMap, Manifest, RootManifest};
pub use options::SyncOptions;
pub use report::{EventKind, Severity, SyncEvent, SyncOutcome, SyncReport};
pub use sync::{PackageOutcome, ReconciliationContext, Synchronizer};
pub use workspace::{NameList, Workspace, WorkspaceScanner};
