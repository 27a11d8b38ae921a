use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates a unique temporary directory and sets `SUBMISSION_ROOT`
/// to its absolute path for the duration of the test. The directory is
/// automatically cleaned up when the returned `TempDir` is dropped.
///
/// Keep the returned `TempDir` in scope for as long as you need the files.
pub fn setup_test_submission_root() -> TempDir {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let abs = tmp
        .path()
        .canonicalize()
        .unwrap_or_else(|_| tmp.path().to_path_buf());
    unsafe {
        env::set_var("SUBMISSION_ROOT", &abs);
    }
    tmp
}

/// Write a file inside a submission tree, creating parent directories as
/// needed, and return its full path. `relative` may use either separator.
pub fn write_submission_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for component in relative.split(['/', '\\']).filter(|c| !c.is_empty()) {
        path.push(component);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create parent directories");
    }
    fs::write(&path, content).expect("failed to write submission file");
    path
}
