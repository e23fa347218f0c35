//! Color theme for consistent output

use colored::*;
use std::path::Path;

/// Color for success messages
pub fn success(msg: &str) -> ColoredString {
    msg.green()
}

/// Color for warning messages
pub fn warning(msg: &str) -> ColoredString {
    msg.yellow()
}

/// Color for info messages
pub fn info(msg: &str) -> ColoredString {
    msg.cyan()
}

/// Color for a unit token such as `8.3`
pub fn token(tok: &str) -> ColoredString {
    tok.yellow().bold()
}

/// Source side of a rename or rewrite
pub fn old_path(path: &Path) -> ColoredString {
    path.display().to_string().white()
}

/// Destination side of a rename or rewrite
pub fn new_path(path: &Path) -> ColoredString {
    path.display().to_string().cyan()
}

/// Temporary path used while staging a rename
pub fn temp_path(path: &Path) -> ColoredString {
    path.display().to_string().dimmed()
}

/// Banner shown on every dry-run section
pub fn dry_run_badge() -> ColoredString {
    "[dry-run]".magenta().bold()
}

/// Symbol for success
pub fn success_symbol() -> &'static str {
    "✓"
}

/// Symbol for warning
pub fn warning_symbol() -> &'static str {
    "⚠"
}

/// Symbol for info
pub fn info_symbol() -> &'static str {
    "→"
}
