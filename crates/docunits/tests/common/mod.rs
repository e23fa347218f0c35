// Test infrastructure and utilities for docunits tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// A document with a front-matter block built from `key: value` pairs
pub fn doc_with_frontmatter(fields: &[(&str, &str)], body: &str) -> String {
    let mut doc = String::from("---\n");
    for (key, value) in fields {
        doc.push_str(&format!("{}: {}\n", key, value));
    }
    doc.push_str("---\n");
    doc.push_str(body);
    doc
}

/// Assert that a document starts with front matter that parses as YAML
pub fn assert_valid_yaml(content: &str) {
    assert!(content.starts_with("---\n"), "Content should start with a front-matter marker");
    let parts: Vec<&str> = content.splitn(3, "---").collect();
    assert_eq!(parts.len(), 3, "Content should have front matter between --- markers");

    let frontmatter = parts[1].trim();
    let _: serde_yaml::Value =
        serde_yaml::from_str(frontmatter).expect("Front matter should be valid YAML");
}

/// A docs tree in a temporary directory
///
/// The docs root is `<tmp>/docs`, so backups made next to it stay inside the
/// temporary directory.
pub struct TestTree {
    pub temp: TempDir,
}

impl TestTree {
    pub fn new() -> std::io::Result<Self> {
        let temp = TempDir::new()?;
        fs::create_dir_all(temp.path().join("docs"))?;
        Ok(Self { temp })
    }

    /// The docs root
    pub fn root(&self) -> PathBuf {
        self.temp.path().join("docs")
    }

    /// Create a directory (and its parents) under the root
    pub fn dir(&self, path: &str) -> &Self {
        fs::create_dir_all(self.root().join(path)).expect("Failed to create directory");
        self
    }

    /// Create a file (and its parents) under the root
    pub fn file(&self, path: &str, content: impl AsRef<[u8]>) -> &Self {
        let file_path = self.root().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        self
    }

    pub fn read(&self, path: &str) -> String {
        fs::read_to_string(self.root().join(path)).expect("Failed to read file")
    }

    pub fn read_bytes(&self, path: &str) -> Vec<u8> {
        fs::read(self.root().join(path)).expect("Failed to read file")
    }

    pub fn exists(&self, path: &str) -> bool {
        self.root().join(path).exists()
    }

    /// Every entry below the root as a sorted list of relative paths
    pub fn listing(&self) -> Vec<String> {
        let root = self.root();
        let mut entries: Vec<String> = WalkDir::new(&root)
            .min_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .map(|e| e.path().strip_prefix(&root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        entries.sort();
        entries
    }

    /// Every entry below the root with its contents, for before/after checks
    pub fn snapshot(&self) -> Vec<(String, Option<Vec<u8>>)> {
        self.listing()
            .into_iter()
            .map(|rel| {
                let path = self.root().join(&rel);
                let content = if path.is_file() { fs::read(&path).ok() } else { None };
                (rel, content)
            })
            .collect()
    }

    /// Names of backup directories created next to the root
    pub fn backups(&self) -> Vec<String> {
        fs::read_dir(self.temp.path())
            .expect("Failed to read temporary directory")
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("docs__backup__"))
            .collect()
    }

    pub fn backup_path(&self, name: &str) -> PathBuf {
        self.temp.path().join(name)
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new().expect("Failed to create test tree")
    }
}

pub fn exists_under(root: &Path, path: &str) -> bool {
    root.join(path).exists()
}
