//! CLI argument parsing

use clap::{Parser, Subcommand};
use docunits::PairSource;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docunits")]
#[command(about = "Insert a unit into a major.minor numbered documentation tree", long_about = None)]
#[command(version)]
#[command(after_help = "Use 'docunits <command> --help' for more information about a command.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Insert a unit at MAJOR.AT, shifting every later unit up by one
    Insert {
        /// Root of the docs tree
        root: PathBuf,

        /// Major number of the units to shift
        #[arg(short, long)]
        major: u32,

        /// Minor number to insert at; units at or above it move up
        #[arg(short, long)]
        at: u32,

        /// Show what would be done without making changes
        #[arg(long)]
        dry_run: bool,

        /// Skip the whole-tree backup
        #[arg(long)]
        no_backup: bool,

        /// Bump sidebar_position values at or above this (defaults to AT + 1)
        #[arg(long)]
        sidebar_threshold: Option<u64>,

        /// Increment sidebar_position values at or above the threshold
        #[arg(long, conflicts_with = "keep_sidebar_position")]
        bump_sidebar_position: bool,

        /// Leave sidebar_position values alone, even if the config bumps them
        #[arg(long)]
        keep_sidebar_position: bool,

        /// Where the replacement tokens come from
        #[arg(long, value_enum)]
        pairs_from: Option<PairSource>,
    },

    /// Show the rename plan and any collisions without touching anything
    #[command(visible_alias = "preview")]
    Plan {
        /// Root of the docs tree
        root: PathBuf,

        /// Major number of the units to shift
        #[arg(short, long)]
        major: u32,

        /// Minor number to insert at
        #[arg(short, long)]
        at: u32,

        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List the units of a major found in the tree
    #[command(visible_alias = "ls")]
    List {
        /// Root of the docs tree
        root: PathBuf,

        /// Major number to list
        #[arg(short, long)]
        major: u32,
    },
}
