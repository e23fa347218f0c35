use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the optional per-tree configuration file
pub const CONFIG_FILENAME: &str = ".docunits.toml";

/// Where the replacement pairs for content rewriting come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PairSource {
    /// Minors of the entries actually renamed on disk
    #[default]
    Mapping,
    /// Minors found by scanning document contents
    Content,
}

/// Application configuration with layered defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Copy the whole docs root before changing anything
    pub backup: bool,

    /// Increment `sidebar_position` values at or above the threshold.
    /// Off by default so positions only move when asked.
    pub bump_sidebar_position: bool,

    /// Source of the replacement pairs
    pub pair_source: PairSource,

    /// Glob patterns for entries to leave alone (matched against the base
    /// name and the root-relative path)
    pub exclude: Vec<String>,

    /// Warn when the docs root has uncommitted git changes
    pub warn_dirty_worktree: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backup: true,
            bump_sidebar_position: false,
            pair_source: PairSource::Mapping,
            exclude: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                ".docusaurus".to_string(),
            ],
            warn_dirty_worktree: true,
        }
    }
}

impl Config {
    /// Load configuration: defaults, then `<root>/.docunits.toml` if present
    pub fn load(root: &Path) -> Result<Self> {
        let mut config = Config::default();

        if let Some(file_config) = Self::load_from_file(root)? {
            config.merge(file_config);
        }

        Ok(config)
    }

    /// Load configuration from .docunits.toml
    fn load_from_file(root: &Path) -> Result<Option<PartialConfig>> {
        let config_path: PathBuf = root.join(CONFIG_FILENAME);
        if !config_path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: PartialConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// Merge partial config into this one (partial takes precedence for specified fields)
    fn merge(&mut self, other: PartialConfig) {
        if let Some(val) = other.backup {
            self.backup = val;
        }
        if let Some(val) = other.bump_sidebar_position {
            self.bump_sidebar_position = val;
        }
        if let Some(val) = other.pair_source {
            self.pair_source = val;
        }
        if let Some(val) = other.exclude {
            self.exclude = val;
        }
        if let Some(val) = other.warn_dirty_worktree {
            self.warn_dirty_worktree = val;
        }
    }
}

/// Partial configuration for deserializing from TOML with optional fields
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    backup: Option<bool>,
    bump_sidebar_position: Option<bool>,
    pair_source: Option<PairSource>,
    exclude: Option<Vec<String>>,
    warn_dirty_worktree: Option<bool>,
}
