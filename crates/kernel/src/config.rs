//! Configuration loaded from environment variables.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Kernel configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to plugins directory (default: ./plugins).
    pub plugins_dir: PathBuf,

    /// Maximum number of transients held in memory (default: 10000).
    pub transient_max_capacity: u64,

    /// Directory holding gettext `.po` files. When None, strings are
    /// rendered untranslated.
    pub locale_dir: Option<PathBuf>,

    /// Site language code used to pick catalog files (default: en).
    pub language: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plugins_dir: PathBuf::from("./plugins"),
            transient_max_capacity: 10_000,
            locale_dir: None,
            language: "en".to_string(),
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read variables from a dotenv file without touching the process
    /// environment. Variables already set in the environment win.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        let file: HashMap<String, String> = dotenvy::from_path_iter(path)
            .with_context(|| format!("failed to open env file: {}", path.display()))?
            .collect::<Result<_, _>>()
            .with_context(|| format!("failed to parse env file: {}", path.display()))?;

        Self::from_lookup(|key| env::var(key).ok().or_else(|| file.get(key).cloned()))
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let plugins_dir = lookup("PLUGINS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./plugins"));

        let transient_max_capacity = lookup("TRANSIENT_MAX_CAPACITY")
            .unwrap_or_else(|| "10000".to_string())
            .parse()
            .context("TRANSIENT_MAX_CAPACITY must be a valid u64")?;

        let locale_dir = lookup("LOCALE_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let language = lookup("SITE_LANGUAGE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "en".to_string());

        Ok(Self {
            plugins_dir,
            transient_max_capacity,
            locale_dir,
            language,
        })
    }
}
