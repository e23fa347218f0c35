//! Documentation unit renumbering CLI

use clap::Parser;
use docunits::errors;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::*;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Insert {
            root,
            major,
            at,
            dry_run,
            no_backup,
            sidebar_threshold,
            bump_sidebar_position,
            keep_sidebar_position,
            pairs_from,
        } => insert_unit(&InsertOptions {
            root,
            major,
            insert_minor: at,
            dry_run,
            no_backup,
            sidebar_threshold,
            bump_sidebar_position,
            keep_sidebar_position,
            pairs_from,
        }),
        Commands::Plan { root, major, at, format } => show_plan(&root, major, at, &format),
        Commands::List { root, major } => list_units(&root, major),
    };

    if let Err(e) = result {
        match e.downcast_ref::<docunits::RenumberError>() {
            Some(docunits::RenumberError::RootNotFound(_)) => errors::print_error_with_suggestion(
                "Command failed",
                &e,
                "Pass the directory that holds the numbered units, e.g. ./docs",
            ),
            Some(docunits::RenumberError::Collision { .. }) => errors::print_error_with_suggestion(
                "Nothing was changed",
                &e,
                "Move or exclude the conflicting entries, then run again",
            ),
            _ => errors::print_error("Command failed", &e),
        }
        std::process::exit(errors::exit_code_for(&e));
    }
}
