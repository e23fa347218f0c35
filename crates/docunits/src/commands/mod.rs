//! Command implementations

pub mod insert;
pub mod list;
pub mod plan;

pub use insert::{insert_unit, InsertOptions};
pub use list::list_units;
pub use plan::show_plan;

use std::path::Path;

/// `path` relative to the docs root, for display
pub(crate) fn relative<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}
