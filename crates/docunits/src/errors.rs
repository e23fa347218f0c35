//! Error types and error reporting utilities

use colored::*;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions raised while renumbering a tree.
///
/// Everything here aborts the run. Per-document rewrite problems are not
/// errors; they are collected as warnings in the rewrite report instead.
#[derive(Debug, Error)]
pub enum RenumberError {
    #[error("Docs root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Docs root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("{} planned rename(s) collide with existing entries outside the rename set", .pairs.len())]
    Collision { pairs: Vec<(PathBuf, PathBuf)> },

    #[error("Two planned renames share the final path {}", .0.display())]
    DuplicateTarget(PathBuf),

    #[error("{phase} path unexpectedly exists: {}", .path.display())]
    Inconsistent { path: PathBuf, phase: &'static str },

    #[error("Backup destination already exists: {}", .0.display())]
    BackupExists(PathBuf),

    #[error("Invalid exclude pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to walk the docs tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenumberError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RenumberError::Io { path: path.into(), source }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RenumberError::Collision { .. } => 2,
            _ => 1,
        }
    }
}

/// Exit status for any error bubbling out of a command
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error.downcast_ref::<RenumberError>().map(RenumberError::exit_code).unwrap_or(1)
}

/// Print a formatted error message
pub fn print_error(context: &str, error: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), context);
    eprintln!("  {}", error.to_string().red());

    if let Some(RenumberError::Collision { pairs }) = error.downcast_ref::<RenumberError>() {
        for (original, target) in pairs {
            eprintln!(
                "    {} -> {} {}",
                original.display(),
                target.display().to_string().yellow(),
                "(conflict)".red()
            );
        }
    }

    // Show chain of causes
    let mut current = error.source();
    while let Some(cause) = current {
        eprintln!("  {} {}", "Caused by:".dimmed(), cause.to_string().dimmed());
        current = std::error::Error::source(cause);
    }
}

/// Print an error with a suggestion
pub fn print_error_with_suggestion(context: &str, error: &anyhow::Error, suggestion: &str) {
    print_error(context, error);
    eprintln!("\n{} {}", "Suggestion:".cyan().bold(), suggestion);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "Warning:".yellow().bold(), message);
}
