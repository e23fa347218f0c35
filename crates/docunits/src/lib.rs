//! Renumbering library for `major.minor` documentation trees
//!
//! Inserting a unit at `M.T` shifts every existing unit `M.k` with `k >= T`
//! to `M.(k+1)`: file and folder names first, then the references and
//! front-matter fields inside the documents.

pub mod backup;
pub mod config;
pub mod errors;
pub mod frontmatter;
pub mod git;
pub mod planner;
pub mod renamer;
pub mod rewriter;
pub mod theme;
pub mod unit;
pub mod walk;

pub use config::{Config, PairSource};
pub use errors::RenumberError;
pub use planner::{Move, RenameMapping, Scope};
pub use rewriter::{ReplacementPairs, RewriteOptions, RewriteReport};
pub use unit::{UnitId, UnitMatcher};
pub use walk::ExcludeSet;

/// Re-export common error types
pub use anyhow::{Error, Result};
