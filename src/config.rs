//! User configuration
//!
//! Optional TOML file at `$TAXA_CONFIG` or `<config_home>/taxa/config.toml`.
//! A missing file means defaults.

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Local};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::reports::DEFAULT_EXPORT_FILE;

pub const CONFIG_ENV: &str = "TAXA_CONFIG";
pub const YEAR_ENV: &str = "TAXA_YEAR";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Year assigned to PL file dates (file names carry only DD.MM)
    pub year: Option<i32>,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    #[serde(default = "default_export_file")]
    pub file_name: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: default_export_file(),
        }
    }
}

fn default_export_file() -> PathBuf {
    PathBuf::from(DEFAULT_EXPORT_FILE)
}

impl Config {
    /// Load from `$TAXA_CONFIG` or the default location, if present
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load_from_path(PathBuf::from(path));
        }

        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn default_config_path() -> Option<PathBuf> {
        dir_spec::config_home().map(|dir| dir.join("taxa").join("config.toml"))
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Processing year: explicit override, then `$TAXA_YEAR`, then the
    /// config file, then the current year
    pub fn processing_year(&self, cli_year: Option<i32>) -> Result<i32> {
        if let Some(year) = cli_year {
            return Ok(year);
        }
        if let Ok(raw) = std::env::var(YEAR_ENV) {
            return raw
                .trim()
                .parse()
                .map_err(|_| anyhow!("Invalid {} value: {}", YEAR_ENV, raw));
        }
        Ok(self.year.unwrap_or_else(|| Local::now().year()))
    }
}
