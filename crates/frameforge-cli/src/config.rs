//! `frameforge.toml` settings.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_FILE: &str = "frameforge.toml";

/// Defaults for command-line options. Flags override every value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory of `<material>.json` catalog tables.
    pub catalog_dir: PathBuf,
    /// Catalog material.
    pub material: String,
    /// Catalog family.
    pub family: String,
    /// Catalog size.
    pub size: Option<String>,
    /// Force sharp (`false`) or filleted (`true`) corners.
    pub fillet: Option<bool>,
    /// Cut-list settings.
    pub nesting: NestingConfig,
}

/// Stock bar settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NestingConfig {
    /// Stock bar length (mm).
    pub stock_length: f64,
    /// Saw kerf per cut (mm).
    pub kerf: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_dir: PathBuf::from("catalog"),
            material: "Steel".to_string(),
            family: "Square Hollow".to_string(),
            size: None,
            fillet: None,
            nesting: NestingConfig::default(),
        }
    }
}

impl Default for NestingConfig {
    fn default() -> Self {
        Self {
            stock_length: 6000.0,
            kerf: 3.0,
        }
    }
}

impl Config {
    /// Read `path`, or `frameforge.toml` when present, or use the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let p = PathBuf::from(DEFAULT_FILE);
                if !p.exists() {
                    return Ok(Self::default());
                }
                p
            }
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = Self::parse(&text).with_context(|| format!("parsing {}", path.display()))?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
