//! Plan command - preview an insertion without touching the tree

use super::relative;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use docunits::config::Config;
use docunits::planner::{self, Scope};
use docunits::renamer;
use docunits::walk::{self, ExcludeSet};
use docunits::{theme, UnitId};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct PlannedMove {
    original: PathBuf,
    #[serde(rename = "final")]
    final_path: PathBuf,
    unit: UnitId,
}

#[derive(Debug, Serialize)]
struct Collision {
    original: PathBuf,
    existing: PathBuf,
}

#[derive(Debug, Serialize)]
struct PlanOutput {
    root: PathBuf,
    insert_at: UnitId,
    moves: Vec<PlannedMove>,
    collisions: Vec<Collision>,
}

/// Execute the plan command
pub fn show_plan(root: &Path, major: u32, insert_minor: u32, format: &str) -> Result<()> {
    if format != "text" && format != "json" {
        bail!("Unknown format '{}'. Use 'text' or 'json'", format);
    }

    let root = walk::resolve_root(root)?;
    let config = Config::load(&root)?;
    let excludes = ExcludeSet::new(&config.exclude)?;
    let scope = Scope { root: &root, major, insert_minor, excludes: &excludes };
    let mapping = planner::plan(&scope).context("Failed to scan docs root")?;
    let collisions = renamer::find_collisions(&mapping);

    let output = PlanOutput {
        root: root.clone(),
        insert_at: UnitId::new(major, insert_minor),
        moves: mapping
            .moves()
            .iter()
            .map(|m| PlannedMove {
                original: relative(&root, &m.original).to_path_buf(),
                final_path: relative(&root, &m.final_path).to_path_buf(),
                unit: m.unit,
            })
            .collect(),
        collisions: collisions
            .iter()
            .map(|(original, existing)| Collision {
                original: relative(&root, original).to_path_buf(),
                existing: relative(&root, existing).to_path_buf(),
            })
            .collect(),
    };

    if format == "json" {
        let json =
            serde_json::to_string_pretty(&output).context("Failed to serialize rename plan")?;
        println!("{}", json);
        return Ok(());
    }

    println!(
        "{} {} in {}",
        "Inserting at".cyan().bold(),
        theme::token(&output.insert_at.token()),
        root.display()
    );
    println!();

    if output.moves.is_empty() {
        println!("  {} Nothing to renumber", theme::info_symbol().cyan());
        return Ok(());
    }

    println!("Renames ({}):", output.moves.len());
    for m in &output.moves {
        println!("  {} -> {}", theme::old_path(&m.original), theme::new_path(&m.final_path));
    }

    println!();
    if output.collisions.is_empty() {
        println!("{} {}", theme::success_symbol().green(), theme::success("No collisions"));
    } else {
        println!(
            "{} {}",
            theme::warning_symbol().yellow(),
            theme::warning(&format!("{} collision(s):", output.collisions.len()))
        );
        for c in &output.collisions {
            println!("  {} -> {} {}", c.original.display(), c.existing.display(), "(exists)".red());
        }
    }

    Ok(())
}
