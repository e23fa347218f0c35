//! Path renumbering planner
//!
//! Scans a docs tree for files and folders whose base name starts with a unit
//! of the chosen major at or above the insertion minor, and computes where
//! each of them ends up once its minor is incremented.

use crate::errors::RenumberError;
use crate::unit::{UnitId, UnitMatcher};
use crate::walk::{self, ExcludeSet};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// What to scan and which units shift
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub root: &'a Path,
    pub major: u32,
    pub insert_minor: u32,
    pub excludes: &'a ExcludeSet,
}

/// A filesystem entry whose name carries a unit that has to shift
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameTarget {
    pub path: PathBuf,
    pub unit: UnitId,
}

/// One planned rename, from the original path to its final path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Move {
    pub original: PathBuf,
    #[serde(rename = "final")]
    pub final_path: PathBuf,
    pub unit: UnitId,
}

/// The complete original -> final mapping for one insertion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenameMapping {
    moves: Vec<Move>,
}

impl RenameMapping {
    pub fn from_moves(moves: Vec<Move>) -> Self {
        Self { moves }
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn originals(&self) -> HashSet<&Path> {
        self.moves.iter().map(|m| m.original.as_path()).collect()
    }

    /// Units carried by the original names, lowest first
    pub fn units(&self) -> BTreeSet<UnitId> {
        self.moves.iter().map(|m| m.unit).collect()
    }

    pub fn final_for(&self, original: &Path) -> Option<&Path> {
        self.moves.iter().find(|m| m.original == original).map(|m| m.final_path.as_path())
    }
}

/// Find every entry under the scope's root that has to be renamed
///
/// Results are ordered by minor (highest first), then by path length
/// (longest first). Renaming one at a time in that order never hits a
/// sibling that has not moved yet.
pub fn find_targets(scope: &Scope<'_>) -> Result<Vec<RenameTarget>, RenumberError> {
    let matcher = UnitMatcher::new(scope.major);
    let mut targets = Vec::new();

    for entry in walk::entries(scope.root, scope.excludes) {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if let Some(parsed) = matcher.parse(name) {
            if parsed.unit.minor >= scope.insert_minor {
                targets.push(RenameTarget { path: entry.path().to_path_buf(), unit: parsed.unit });
            }
        }
    }

    targets.sort_by(|a, b| {
        b.unit
            .minor
            .cmp(&a.unit.minor)
            .then_with(|| b.path.as_os_str().len().cmp(&a.path.as_os_str().len()))
            .then_with(|| b.path.cmp(&a.path))
    });
    Ok(targets)
}

/// Compute the final path of every target
///
/// A target nested inside another target ends up inside the renamed parent:
/// `8.3/8.3-intro.md` becomes `8.4/8.4-intro.md`.
pub fn plan_moves(root: &Path, targets: &[RenameTarget]) -> RenameMapping {
    let renamed: HashMap<&Path, String> = targets
        .iter()
        .filter_map(|t| {
            let name = t.path.file_name()?.to_str()?;
            let matcher = UnitMatcher::new(t.unit.major);
            Some((t.path.as_path(), matcher.parse(name)?.bumped()))
        })
        .collect();

    let moves = targets
        .iter()
        .filter(|t| renamed.contains_key(t.path.as_path()))
        .map(|t| Move {
            original: t.path.clone(),
            final_path: final_path(root, &t.path, &renamed),
            unit: t.unit,
        })
        .collect();

    RenameMapping { moves }
}

fn final_path(root: &Path, path: &Path, renamed: &HashMap<&Path, String>) -> PathBuf {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut original = root.to_path_buf();
    let mut result = root.to_path_buf();
    for component in relative.components() {
        original.push(component);
        match renamed.get(original.as_path()) {
            Some(name) => result.push(name),
            None => result.push(component),
        }
    }
    result
}

/// Convenience wrapper: scan and plan in one go
pub fn plan(scope: &Scope<'_>) -> Result<RenameMapping, RenumberError> {
    let targets = find_targets(scope)?;
    Ok(plan_moves(scope.root, &targets))
}
