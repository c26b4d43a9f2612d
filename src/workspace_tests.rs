use crate::manifest::MANIFEST_FILE;
use crate::options::{parse_pattern, SyncOptions};
use crate::workspace::{NameList, WorkspaceScanner};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn create_package(root: &Path, relative: &str, name: &str) {
    let dir = root.join(relative);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join(MANIFEST_FILE),
        format!(r#"{{"name":"{}","dependencies":{{}}}}"#, name),
    )
    .unwrap();
}

fn create_test_workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    create_package(root, "packages/web", "web");
    create_package(root, "packages/api", "api");
    create_package(root, "packages/legacy", "legacy");
    create_package(root, "tools/cli", "cli");

    // Directory without a manifest and a stray file are not packages
    fs::create_dir_all(root.join("packages/docs")).unwrap();
    fs::write(root.join("packages/README.md"), "# packages").unwrap();

    temp_dir
}

#[test]
fn test_wildcard_lists_packages_sorted() {
    let temp_dir = create_test_workspace();
    let options = SyncOptions::default();
    let scanner = WorkspaceScanner::new(temp_dir.path(), &options);

    let paths = scanner.find_manifests("packages/*").unwrap();

    let expected: Vec<_> = ["api", "legacy", "web"]
        .iter()
        .map(|name| temp_dir.path().join("packages").join(name).join(MANIFEST_FILE))
        .collect();
    assert_eq!(paths, expected);
}

#[test]
fn test_exact_glob_resolves_single_package() {
    let temp_dir = create_test_workspace();
    let options = SyncOptions::default();
    let scanner = WorkspaceScanner::new(temp_dir.path(), &options);

    let workspace = scanner.load_workspace("tools/cli").unwrap();

    assert_eq!(workspace.glob, "tools/cli");
    assert_eq!(workspace.packages.len(), 1);
    assert_eq!(workspace.packages[0].name.as_deref(), Some("cli"));
}

#[test]
fn test_exact_glob_without_manifest_is_empty() {
    let temp_dir = create_test_workspace();
    let options = SyncOptions::default();
    let scanner = WorkspaceScanner::new(temp_dir.path(), &options);

    assert!(scanner.find_manifests("packages/docs").unwrap().is_empty());
    assert!(scanner.find_manifests("missing/pkg").unwrap().is_empty());
}

#[test]
fn test_skip_pattern_excludes_paths() {
    let temp_dir = create_test_workspace();
    let options = SyncOptions {
        skip: Some(parse_pattern("legacy").unwrap()),
        ..Default::default()
    };
    let scanner = WorkspaceScanner::new(temp_dir.path(), &options);

    let workspace = scanner.load_workspace("packages/*").unwrap();
    let names: Vec<_> = workspace
        .packages
        .iter()
        .filter_map(|p| p.name.as_deref())
        .collect();

    assert_eq!(names, ["api", "web"]);
}

#[test]
fn test_missing_wildcard_directory_is_an_error() {
    let temp_dir = create_test_workspace();
    let options = SyncOptions::default();
    let scanner = WorkspaceScanner::new(temp_dir.path(), &options);

    let err = scanner.find_manifests("apps/*").unwrap_err();
    assert!(err.to_string().contains("Failed to list workspace"));
}

#[test]
fn test_malformed_package_aborts_load() {
    let temp_dir = create_test_workspace();
    fs::write(
        temp_dir.path().join("packages/web").join(MANIFEST_FILE),
        "{ not json",
    )
    .unwrap();
    let options = SyncOptions::default();
    let scanner = WorkspaceScanner::new(temp_dir.path(), &options);

    assert!(scanner.load_workspace("packages/*").is_err());
}

#[test]
fn test_workspace_names() {
    let temp_dir = create_test_workspace();
    let options = SyncOptions::default();
    let scanner = WorkspaceScanner::new(temp_dir.path(), &options);

    let names = scanner.load_workspace("packages/*").unwrap().names();

    assert!(names.contains("web"));
    assert!(names.contains("api"));
    assert!(!names.contains("cli"));
}

#[test]
fn test_name_list_from_iter() {
    let names: NameList = ["a", "b"].into_iter().collect();

    assert!(names.contains("a"));
    assert!(!names.contains("c"));
    assert!(NameList::default().is_empty());
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_is_not_a_package() {
    let temp_dir = create_test_workspace();
    let packages = temp_dir.path().join("packages");
    std::os::unix::fs::symlink(packages.join("nowhere"), packages.join("dangling")).unwrap();
    let options = SyncOptions::default();
    let scanner = WorkspaceScanner::new(temp_dir.path(), &options);

    let paths = scanner.find_manifests("packages/*").unwrap();

    assert_eq!(paths.len(), 3);
    assert!(!paths.iter().any(|p| p.starts_with(packages.join("dangling"))));
}

#[cfg(unix)]
#[test]
fn test_symlinked_package_directory_is_found() {
    let temp_dir = create_test_workspace();
    let packages = temp_dir.path().join("packages");
    std::os::unix::fs::symlink(temp_dir.path().join("tools/cli"), packages.join("linked-cli"))
        .unwrap();
    let options = SyncOptions::default();
    let scanner = WorkspaceScanner::new(temp_dir.path(), &options);

    let workspace = scanner.load_workspace("packages/*").unwrap();

    assert!(workspace.names().contains("cli"));
}
