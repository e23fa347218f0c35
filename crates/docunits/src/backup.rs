//! Whole-tree backup taken before any mutation

use crate::errors::RenumberError;
use chrono::Local;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// `<parent>/<root-name>__backup__<stamp>`
pub fn backup_path(root: &Path, stamp: &str) -> PathBuf {
    let mut name: OsString =
        root.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| OsString::from("docs"));
    name.push(format!("__backup__{}", stamp));
    match root.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Copy the whole root next to itself, stamped with the current local time
pub fn create_backup(root: &Path) -> Result<PathBuf, RenumberError> {
    let stamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
    let dest = backup_path(root, &stamp);
    copy_tree(root, &dest)?;
    Ok(dest)
}

/// Recursively copy `src` to `dest`, which must not exist yet
///
/// Returns the number of files copied. Symlinks are recreated, not followed.
pub fn copy_tree(src: &Path, dest: &Path) -> Result<usize, RenumberError> {
    if dest.symlink_metadata().is_ok() {
        return Err(RenumberError::BackupExists(dest.to_path_buf()));
    }

    let mut files = 0;
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dest.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| RenumberError::io(&target, e))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| RenumberError::io(entry.path(), e))?;
            files += 1;
        }
    }
    Ok(files)
}

#[cfg(unix)]
fn copy_symlink(src: &Path, target: &Path) -> Result<(), RenumberError> {
    let link = fs::read_link(src).map_err(|e| RenumberError::io(src, e))?;
    std::os::unix::fs::symlink(&link, target).map_err(|e| RenumberError::io(target, e))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, target: &Path) -> Result<(), RenumberError> {
    if src.is_dir() {
        fs::create_dir_all(target).map_err(|e| RenumberError::io(target, e))
    } else {
        fs::copy(src, target).map(|_| ()).map_err(|e| RenumberError::io(src, e))
    }
}
