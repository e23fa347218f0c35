//! Collision-safe two-phase renamer
//!
//! Every original path is first moved to a unique temporary sibling, then
//! every temporary path is moved to its final name. Shifting a contiguous
//! range (8.3 -> 8.4, 8.4 -> 8.5, ...) therefore never needs a target that is
//! still occupied by a sibling waiting for its own rename.

use crate::errors::RenumberError;
use crate::planner::RenameMapping;
use chrono::Local;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Marker placed between the original name and the uniqueness suffix
pub const TEMP_MARKER: &str = ".__tmp__";

/// Builds temporary names: `<name>.__tmp__<timestamp>__<uuid>`
#[derive(Debug, Clone)]
pub struct TempNamer {
    stamp: String,
}

impl TempNamer {
    pub fn now() -> Self {
        Self::with_stamp(Local::now().format("%Y%m%d-%H%M%S").to_string())
    }

    pub fn with_stamp(stamp: impl Into<String>) -> Self {
        Self { stamp: stamp.into() }
    }

    /// Human-readable description of the naming scheme
    pub fn scheme(&self) -> String {
        format!("<name>{}{}__<uuid>", TEMP_MARKER, self.stamp)
    }

    pub fn temp_name(&self, path: &Path) -> OsString {
        let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(format!("{}{}__{}", TEMP_MARKER, self.stamp, Uuid::new_v4().simple()));
        name
    }
}

/// One entry's path through both phases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedMove {
    pub original: PathBuf,
    /// Where phase one puts the entry
    pub temp: PathBuf,
    /// Where the entry sits when phase two reaches it (inside its promoted
    /// parent if the parent was renamed too)
    pub promote_from: PathBuf,
    pub final_path: PathBuf,
}

/// Both phases, each in the order it has to run
#[derive(Debug, Clone)]
pub struct StagedPlan {
    moves: Vec<StagedMove>,
    promote_order: Vec<usize>,
}

impl StagedPlan {
    /// Phase one order: deepest paths first
    pub fn stage_steps(&self) -> impl Iterator<Item = &StagedMove> {
        self.moves.iter()
    }

    /// Phase two order: shallowest paths first
    pub fn promote_steps(&self) -> impl Iterator<Item = &StagedMove> {
        self.promote_order.iter().map(move |&i| &self.moves[i])
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// A rename that has been carried out
#[derive(Debug, Clone, Copy)]
pub enum Step<'a> {
    Staged { from: &'a Path, to: &'a Path },
    Promoted { from: &'a Path, to: &'a Path },
}

fn occupied(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

fn depth(path: &Path) -> usize {
    path.components().count()
}

/// Final paths that already exist and would be overwritten
///
/// An existing entry is not a collision when it, or one of its ancestors, is
/// itself scheduled to move away.
pub fn find_collisions(mapping: &RenameMapping) -> Vec<(PathBuf, PathBuf)> {
    let originals = mapping.originals();
    mapping
        .moves()
        .iter()
        .filter(|m| occupied(&m.final_path))
        .filter(|m| !m.final_path.ancestors().any(|a| originals.contains(a)))
        .map(|m| (m.original.clone(), m.final_path.clone()))
        .collect()
}

/// Abort before any mutation if the mapping is not safe to execute
pub fn check_collisions(mapping: &RenameMapping) -> Result<(), RenumberError> {
    let mut seen = HashSet::new();
    for m in mapping.moves() {
        if !seen.insert(m.final_path.as_path()) {
            return Err(RenumberError::DuplicateTarget(m.final_path.clone()));
        }
    }

    let pairs = find_collisions(mapping);
    if pairs.is_empty() {
        Ok(())
    } else {
        Err(RenumberError::Collision { pairs })
    }
}

/// Derive temporary names and the order of both phases
pub fn stage(mapping: &RenameMapping, namer: &TempNamer) -> StagedPlan {
    let mut moves: Vec<StagedMove> = mapping
        .moves()
        .iter()
        .map(|m| {
            let temp_name = namer.temp_name(&m.original);
            StagedMove {
                original: m.original.clone(),
                temp: m.original.with_file_name(&temp_name),
                promote_from: m.final_path.with_file_name(&temp_name),
                final_path: m.final_path.clone(),
            }
        })
        .collect();

    moves.sort_by(|a, b| {
        depth(&b.original).cmp(&depth(&a.original)).then_with(|| b.original.cmp(&a.original))
    });

    let mut promote_order: Vec<usize> = (0..moves.len()).collect();
    promote_order.sort_by(|&a, &b| {
        let (a, b) = (&moves[a], &moves[b]);
        depth(&a.final_path)
            .cmp(&depth(&b.final_path))
            .then_with(|| a.final_path.cmp(&b.final_path))
    });

    StagedPlan { moves, promote_order }
}

/// Run both phases, reporting each executed rename to `observer`
///
/// Returns the number of entries moved. Any unexpected occupant of a
/// temporary or final path aborts the run.
pub fn execute<F>(plan: &StagedPlan, mut observer: F) -> Result<usize, RenumberError>
where
    F: FnMut(Step<'_>),
{
    for m in plan.stage_steps() {
        if occupied(&m.temp) {
            return Err(RenumberError::Inconsistent { path: m.temp.clone(), phase: "Temporary" });
        }
    }
    for m in plan.stage_steps() {
        fs::rename(&m.original, &m.temp).map_err(|e| RenumberError::io(&m.original, e))?;
        observer(Step::Staged { from: &m.original, to: &m.temp });
    }

    for m in plan.promote_steps() {
        if occupied(&m.final_path) {
            return Err(RenumberError::Inconsistent { path: m.final_path.clone(), phase: "Final" });
        }
    }
    for m in plan.promote_steps() {
        if occupied(&m.final_path) {
            return Err(RenumberError::Inconsistent { path: m.final_path.clone(), phase: "Final" });
        }
        fs::rename(&m.promote_from, &m.final_path)
            .map_err(|e| RenumberError::io(&m.promote_from, e))?;
        observer(Step::Promoted { from: &m.promote_from, to: &m.final_path });
    }

    Ok(plan.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{self, Move, Scope};
    use crate::unit::UnitId;
    use crate::walk::ExcludeSet;
    use tempfile::TempDir;

    fn mapping_for(root: &Path, insert_minor: u32) -> RenameMapping {
        let excludes = ExcludeSet::default();
        planner::plan(&Scope { root, major: 8, insert_minor, excludes: &excludes }).unwrap()
    }

    fn listing(root: &Path) -> Vec<String> {
        let mut names: Vec<String> = walkdir::WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .map(|e| e.unwrap().path().strip_prefix(root).unwrap().display().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_temp_name_format() {
        let namer = TempNamer::with_stamp("20250923-001805");
        let name = namer.temp_name(Path::new("docs/8.3-intro.md"));
        let name = name.to_str().unwrap();
        assert!(name.starts_with("8.3-intro.md.__tmp__20250923-001805__"));
        assert_eq!(name.len(), "8.3-intro.md.__tmp__20250923-001805__".len() + 32);
        assert_ne!(namer.temp_name(Path::new("a")), namer.temp_name(Path::new("a")));
        assert_eq!(namer.scheme(), "<name>.__tmp__20250923-001805__<uuid>");
    }

    #[test]
    fn test_shifts_contiguous_range() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        for name in ["8.2", "8.3", "8.4", "8.5"] {
            fs::create_dir(root.join(name)).unwrap();
            fs::write(root.join(name).join("marker.txt"), name).unwrap();
        }

        let mapping = mapping_for(root, 3);
        check_collisions(&mapping).unwrap();
        let plan = stage(&mapping, &TempNamer::now());
        let moved = execute(&plan, |_| {}).unwrap();

        assert_eq!(moved, 3);
        assert_eq!(fs::read_to_string(root.join("8.2/marker.txt")).unwrap(), "8.2");
        assert_eq!(fs::read_to_string(root.join("8.4/marker.txt")).unwrap(), "8.3");
        assert_eq!(fs::read_to_string(root.join("8.5/marker.txt")).unwrap(), "8.4");
        assert_eq!(fs::read_to_string(root.join("8.6/marker.txt")).unwrap(), "8.5");
        assert!(!root.join("8.3").exists());
        assert!(!listing(root).iter().any(|n| n.contains(TEMP_MARKER)));
    }

    #[test]
    fn test_nested_targets_land_in_renamed_parent() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("8.3/8.3-Images")).unwrap();
        fs::write(root.join("8.3/8.3-intro.md"), "intro").unwrap();
        fs::write(root.join("8.3/8.3-Images/fig1.png"), "png").unwrap();
        fs::write(root.join("8.3/notes.md"), "notes").unwrap();

        let mapping = mapping_for(root, 3);
        let plan = stage(&mapping, &TempNamer::now());
        let mut staged = 0;
        let mut promoted = 0;
        execute(&plan, |step| match step {
            Step::Staged { .. } => staged += 1,
            Step::Promoted { .. } => promoted += 1,
        })
        .unwrap();

        assert_eq!((staged, promoted), (3, 3));
        assert_eq!(
            listing(root),
            vec![
                "8.4",
                "8.4/8.4-Images",
                "8.4/8.4-Images/fig1.png",
                "8.4/8.4-intro.md",
                "8.4/notes.md"
            ]
        );
    }

    #[test]
    fn test_stage_orders_deepest_first_and_promotes_shallowest_first() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("8.3/8.3.1")).unwrap();

        let plan = stage(&mapping_for(root, 3), &TempNamer::now());
        let staged: Vec<_> = plan.stage_steps().map(|m| m.original.clone()).collect();
        let promoted: Vec<_> = plan.promote_steps().map(|m| m.final_path.clone()).collect();
        assert_eq!(staged, vec![root.join("8.3/8.3.1"), root.join("8.3")]);
        assert_eq!(promoted, vec![root.join("8.4"), root.join("8.4/8.4.1")]);

        let child = plan.stage_steps().next().unwrap();
        assert_eq!(child.temp.parent(), Some(root.join("8.3").as_path()));
        assert_eq!(child.promote_from.parent(), Some(root.join("8.4").as_path()));
    }

    #[test]
    fn test_collision_with_unplanned_entry_is_reported() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("8.3")).unwrap();
        fs::create_dir(root.join("8.4")).unwrap();

        // 8.4 is hidden from the planner, so it is not part of the rename set
        let excludes = ExcludeSet::new(&["8.4".to_string()]).unwrap();
        let mapping =
            planner::plan(&Scope { root, major: 8, insert_minor: 3, excludes: &excludes }).unwrap();

        let err = check_collisions(&mapping).unwrap_err();
        match err {
            RenumberError::Collision { pairs } => {
                assert_eq!(pairs, vec![(root.join("8.3"), root.join("8.4"))]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_entry_inside_moving_parent_is_not_a_collision() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("8.3")).unwrap();
        fs::write(root.join("8.3/8.3-a.md"), "a").unwrap();
        fs::create_dir_all(root.join("8.4")).unwrap();
        fs::write(root.join("8.4/8.4-a.md"), "b").unwrap();

        let mapping = mapping_for(root, 3);
        assert!(find_collisions(&mapping).is_empty());
        execute(&stage(&mapping, &TempNamer::now()), |_| {}).unwrap();

        assert_eq!(fs::read_to_string(root.join("8.4/8.4-a.md")).unwrap(), "a");
        assert_eq!(fs::read_to_string(root.join("8.5/8.5-a.md")).unwrap(), "b");
    }

    #[test]
    fn test_execute_refuses_occupied_final_path() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("8.3")).unwrap();

        let plan = stage(&mapping_for(root, 3), &TempNamer::now());
        // Something appears at the final path after planning
        fs::create_dir(root.join("8.4")).unwrap();

        let err = execute(&plan, |_| {}).unwrap_err();
        assert!(matches!(err, RenumberError::Inconsistent { phase: "Final", .. }));
    }

    #[test]
    fn test_duplicate_final_paths_rejected() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("8.3")).unwrap();

        let mapping = mapping_for(root, 3);
        assert!(check_collisions(&mapping).is_ok());

        let mut doubled = mapping.moves().to_vec();
        doubled.push(Move {
            original: root.join("8.3-copy"),
            final_path: root.join("8.4"),
            unit: UnitId::new(8, 3),
        });
        let err = check_collisions(&RenameMapping::from_moves(doubled)).unwrap_err();
        assert!(matches!(err, RenumberError::DuplicateTarget(p) if p == root.join("8.4")));
    }
}
