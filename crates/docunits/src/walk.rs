//! Docs tree traversal shared by the planner, the rewriter and `list`

use crate::errors::RenumberError;
use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Document extensions, compared case-insensitively
pub const DOC_EXTENSIONS: [&str; 4] = ["md", "mdx", "markdown", "mdown"];

/// Compiled exclude patterns
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    patterns: Vec<Pattern>,
}

impl ExcludeSet {
    pub fn new(patterns: &[String]) -> Result<Self, RenumberError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p)
                    .map_err(|source| RenumberError::Pattern { pattern: p.clone(), source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// True when the base name or the root-relative path matches a pattern
    pub fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let relative = path.strip_prefix(root).unwrap_or(path);
        self.patterns.iter().any(|p| p.matches(&name) || p.matches_path(relative))
    }
}

/// Check that the docs root exists and is a directory, and make it absolute
pub fn resolve_root(root: &Path) -> Result<PathBuf, RenumberError> {
    let metadata = match root.metadata() {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RenumberError::RootNotFound(root.to_path_buf()))
        }
        Err(e) => return Err(RenumberError::io(root, e)),
    };
    if !metadata.is_dir() {
        return Err(RenumberError::NotADirectory(root.to_path_buf()));
    }
    root.canonicalize().map_err(|e| RenumberError::io(root, e))
}

/// Walk every entry below `root` (not `root` itself), skipping excluded
/// subtrees. Entries come out in a stable, name-sorted order.
pub fn entries<'a>(
    root: &'a Path,
    excludes: &'a ExcludeSet,
) -> impl Iterator<Item = Result<DirEntry, walkdir::Error>> + 'a {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| !excludes.is_excluded(root, e.path()))
}

/// True for files with one of the document extensions
pub fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| DOC_EXTENSIONS.iter().any(|d| e.eq_ignore_ascii_case(d)))
        .unwrap_or(false)
}

/// All document files below `root`
pub fn documents(root: &Path, excludes: &ExcludeSet) -> Result<Vec<PathBuf>, RenumberError> {
    let mut docs = Vec::new();
    for entry in entries(root, excludes) {
        let entry = entry?;
        if entry.file_type().is_file() && is_document(entry.path()) {
            docs.push(entry.into_path());
        }
    }
    Ok(docs)
}
