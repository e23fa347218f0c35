//! Git integration
//!
//! Renumbering is meant to run on a clean working tree so the result can be
//! reviewed with `git diff` and reverted with `git checkout`.

use std::path::Path;
use std::process::Command;

/// Check if a path is in a git repository
pub fn is_git_repo(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    let dir = if path.is_dir() { path } else { path.parent().unwrap_or(path) };

    Command::new("git")
        .args(["rev-parse", "--git-dir"])
        .current_dir(dir)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Whether the directory has uncommitted changes under it
///
/// Returns `None` when git is unavailable or the directory is not in a
/// repository.
pub fn has_uncommitted_changes(dir: impl AsRef<Path>) -> Option<bool> {
    let dir = dir.as_ref();
    if !is_git_repo(dir) {
        return None;
    }

    let output = Command::new("git")
        .args(["status", "--porcelain", "--", "."])
        .current_dir(dir)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }
    Some(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) -> bool {
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[test]
    fn test_dirty_tree_is_detected() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        if !git(dir, &["init"]) {
            // git not installed
            return;
        }
        git(dir, &["config", "user.name", "Test User"]);
        git(dir, &["config", "user.email", "test@example.com"]);

        fs::write(dir.join("8.3.md"), "intro").unwrap();
        assert!(is_git_repo(dir));
        assert_eq!(has_uncommitted_changes(dir), Some(true));

        git(dir, &["add", "."]);
        git(dir, &["commit", "-m", "Initial"]);
        assert_eq!(has_uncommitted_changes(dir), Some(false));
    }
}
