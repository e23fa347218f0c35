//! List command implementation

use super::relative;
use anyhow::{Context, Result};
use colored::*;
use docunits::config::Config;
use docunits::planner::{self, Scope};
use docunits::walk::{self, ExcludeSet};
use docunits::{theme, UnitId};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub fn list_units(root: &Path, major: u32) -> Result<()> {
    let root = walk::resolve_root(root)?;
    let config = Config::load(&root)?;
    let excludes = ExcludeSet::new(&config.exclude)?;
    let scope = Scope { root: &root, major, insert_minor: 0, excludes: &excludes };
    let targets = planner::find_targets(&scope).context("Failed to scan docs root")?;

    let mut units: BTreeMap<UnitId, Vec<PathBuf>> = BTreeMap::new();
    for target in targets {
        units.entry(target.unit).or_default().push(target.path);
    }

    println!("\n{}", format!("Units of major {}", major).bold().underline());
    println!();

    if units.is_empty() {
        println!("  {} No units found under {}", theme::info_symbol().cyan(), root.display());
        return Ok(());
    }

    for (unit, mut paths) in units {
        paths.sort();
        println!("{}", theme::token(&unit.token()));
        for path in &paths {
            println!("  {}", relative(&root, path).display());
        }
    }

    println!();
    Ok(())
}
