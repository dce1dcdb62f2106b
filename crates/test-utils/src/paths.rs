//! Path utilities for locating optional test assets.

use std::path::PathBuf;

/// Returns the workspace root directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Searches for a test asset such as a TrueType font.
///
/// Checks, in order:
/// 1. `$TEST_DATA_DIR/<name>`
/// 2. `<workspace>/testdata/<name>`
/// 3. `/usr/share/fonts/truetype/dejavu/<name>` (system font location)
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(dir) = std::env::var("TEST_DATA_DIR") {
        candidates.push(PathBuf::from(dir).join(name));
    }
    candidates.push(workspace_root().join("testdata").join(name));
    candidates.push(PathBuf::from("/usr/share/fonts/truetype/dejavu").join(name));

    candidates.into_iter().find(|p| p.exists())
}

/// Creates a temporary directory for test output, removed on drop.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}
