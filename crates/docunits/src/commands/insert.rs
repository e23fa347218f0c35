//! Insert command - shift every unit at or above the insertion point
//!
//! Renames happen first, in two phases through temporary names, then every
//! document is rewritten against the renamed tree.

use super::relative;
use anyhow::{Context, Result};
use colored::Colorize;
use docunits::config::{Config, PairSource};
use docunits::errors::print_warning;
use docunits::planner::{self, RenameMapping, Scope};
use docunits::renamer::{self, StagedPlan, Step, TempNamer};
use docunits::rewriter::{self, RewriteOptions, RewriteReport};
use docunits::walk::{self, ExcludeSet};
use docunits::{backup, git, theme, UnitId};
use std::path::{Path, PathBuf};

/// Everything the insert command was asked to do
#[derive(Debug, Clone)]
pub struct InsertOptions {
    pub root: PathBuf,
    pub major: u32,
    pub insert_minor: u32,
    pub dry_run: bool,
    pub no_backup: bool,
    pub sidebar_threshold: Option<u64>,
    pub bump_sidebar_position: bool,
    pub keep_sidebar_position: bool,
    pub pairs_from: Option<PairSource>,
}

impl InsertOptions {
    /// Command-line flags take precedence over the config file
    fn apply(&self, mut config: Config) -> Config {
        if self.no_backup {
            config.backup = false;
        }
        if self.bump_sidebar_position {
            config.bump_sidebar_position = true;
        }
        if self.keep_sidebar_position {
            config.bump_sidebar_position = false;
        }
        if let Some(source) = self.pairs_from {
            config.pair_source = source;
        }
        config
    }

    fn rewrite_options(&self, config: &Config) -> RewriteOptions {
        let defaults = RewriteOptions::for_insert(self.insert_minor);
        RewriteOptions {
            sidebar_threshold: self.sidebar_threshold.unwrap_or(defaults.sidebar_threshold),
            bump_sidebar_position: config.bump_sidebar_position,
        }
    }
}

/// Execute the insert command
pub fn insert_unit(opts: &InsertOptions) -> Result<()> {
    let root = walk::resolve_root(&opts.root)?;
    let config = opts.apply(Config::load(&root)?);
    let excludes = ExcludeSet::new(&config.exclude)?;
    let rewrite_options = opts.rewrite_options(&config);
    let at = UnitId::new(opts.major, opts.insert_minor);

    if opts.dry_run {
        println!("{} {}", theme::dry_run_badge(), "Planning unit insertion...".cyan().bold());
    } else {
        println!("{}", "Inserting unit...".cyan().bold());
    }
    println!();
    println!("  Root: {}", root.display());
    println!("  Insert at: {}", theme::token(&at.token()));
    println!(
        "  Sidebar positions: {}",
        if rewrite_options.bump_sidebar_position {
            format!("bump at or above {}", rewrite_options.sidebar_threshold)
        } else {
            "kept".to_string()
        }
    );
    println!("  Replacement tokens from: {}", pair_source_name(config.pair_source));
    println!();

    if config.warn_dirty_worktree && git::has_uncommitted_changes(&root) == Some(true) {
        print_warning(&format!(
            "{} has uncommitted changes; review the result with care",
            root.display()
        ));
    }

    let scope = Scope {
        root: &root,
        major: opts.major,
        insert_minor: opts.insert_minor,
        excludes: &excludes,
    };
    let mapping = planner::plan(&scope).context("Failed to scan docs root")?;

    if mapping.is_empty() && config.pair_source == PairSource::Mapping {
        println!(
            "{} No entries at or above {}; nothing to renumber",
            theme::info_symbol().cyan(),
            theme::token(&at.token())
        );
        return Ok(());
    }

    print_mapping(&root, &mapping);
    renamer::check_collisions(&mapping)?;

    if !config.backup {
        println!("  Backup: disabled");
    } else if opts.dry_run {
        println!("  {} Backup skipped", theme::dry_run_badge());
    } else {
        let dest = backup::create_backup(&root).context("Failed to create backup")?;
        println!(
            "  {} Backup created: {}",
            theme::success_symbol().green(),
            theme::success(&dest.display().to_string())
        );
    }
    println!();

    let namer = TempNamer::now();
    let staged = renamer::stage(&mapping, &namer);
    let renamed = if opts.dry_run {
        print_staged(&root, &staged, &namer);
        0
    } else {
        run_renames(&root, &staged)?
    };

    let pairs = rewriter::replacement_pairs(
        config.pair_source,
        &root,
        &excludes,
        opts.major,
        opts.insert_minor,
        &mapping,
    )
    .context("Failed to collect replacement tokens")?;

    if !pairs.is_empty() {
        let listed: Vec<String> =
            pairs.pairs().iter().map(|(old, new)| format!("{} -> {}", old, new)).collect();
        println!("Replacement tokens: {}", listed.join(", "));
    }

    let report = rewriter::rewrite_tree(&root, &excludes, &pairs, &rewrite_options, opts.dry_run)
        .context("Failed to rewrite documents")?;
    print_report(&root, &report, opts.dry_run);

    println!();
    if opts.dry_run {
        println!(
            "{} Would rename {} entr{} and rewrite {} of {} document(s)",
            theme::dry_run_badge(),
            mapping.len(),
            if mapping.len() == 1 { "y" } else { "ies" },
            report.changed.len(),
            report.scanned
        );
    } else {
        println!(
            "{}",
            format!(
                "Renamed {} entr{} and rewrote {} of {} document(s)",
                renamed,
                if renamed == 1 { "y" } else { "ies" },
                report.changed.len(),
                report.scanned
            )
            .green()
            .bold()
        );
    }

    Ok(())
}

fn pair_source_name(source: PairSource) -> &'static str {
    match source {
        PairSource::Mapping => "renamed entries",
        PairSource::Content => "document contents",
    }
}

fn print_mapping(root: &Path, mapping: &RenameMapping) {
    println!("Planned renames ({}):", mapping.len());
    for m in mapping.moves() {
        println!(
            "  {} -> {}",
            theme::old_path(relative(root, &m.original)),
            theme::new_path(relative(root, &m.final_path))
        );
    }
    println!();
}

fn print_staged(root: &Path, staged: &StagedPlan, namer: &TempNamer) {
    println!("{} Temporary names: {}", theme::dry_run_badge(), namer.scheme());
    println!("{} Phase 1, original -> temporary:", theme::dry_run_badge());
    for m in staged.stage_steps() {
        println!(
            "  {} -> {}",
            theme::old_path(relative(root, &m.original)),
            theme::temp_path(relative(root, &m.temp))
        );
    }
    println!("{} Phase 2, temporary -> final:", theme::dry_run_badge());
    for m in staged.promote_steps() {
        println!(
            "  {} -> {}",
            theme::temp_path(relative(root, &m.promote_from)),
            theme::new_path(relative(root, &m.final_path))
        );
    }
    println!();
}

fn run_renames(root: &Path, staged: &StagedPlan) -> Result<usize> {
    println!("Renaming...");
    let count = renamer::execute(staged, |step| match step {
        Step::Staged { from, to } => println!(
            "  {} {} -> {}",
            theme::info_symbol().cyan(),
            theme::old_path(relative(root, from)),
            theme::temp_path(relative(root, to))
        ),
        Step::Promoted { from, to } => println!(
            "  {} {} -> {}",
            theme::success_symbol().green(),
            theme::temp_path(relative(root, from)),
            theme::new_path(relative(root, to))
        ),
    })
    .context("Rename failed part-way; restore from the backup if needed")?;
    println!();
    Ok(count)
}

fn print_report(root: &Path, report: &RewriteReport, dry_run: bool) {
    for change in &report.changed {
        let verb = if dry_run { "Would update" } else { "Updated" };
        println!(
            "  {} {} {}",
            theme::success_symbol().green(),
            verb,
            theme::new_path(relative(root, &change.path))
        );
        for field in &change.fields {
            println!("      {}: {} -> {}", field.field, field.old, theme::info(&field.new));
        }
        if change.references > 0 || change.image_folders > 0 {
            println!(
                "      {} reference(s), {} image folder reference(s)",
                change.references, change.image_folders
            );
        }
        if change.lossy {
            println!(
                "      {} not valid UTF-8; undecodable bytes kept as-is",
                theme::warning_symbol().yellow()
            );
        }
    }

    for (path, message) in &report.failures {
        print_warning(&format!(
            "Could not rewrite {}: {}",
            relative(root, path).display(),
            message
        ));
    }
}
