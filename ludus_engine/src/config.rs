//! Engine configuration (`ludus.toml`).
//!
//! Configuration is optional. Every value has a default, and a file that cannot be read or parsed
//! is reported with `warn!` and replaced by defaults.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::roster::StatSetMode;

pub const CONFIG_FILE_NAME: &str = "ludus.toml";

/// Where each file lives inside a dataset directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetLayout {
    pub lookup: String,
    pub classes: String,
    pub skills: String,
    pub items: String,
    pub prizes: String,
    pub roster: String,
    pub stat_sets: String,
    /// Folder holding one league/encounter file per location.
    pub locations: String,
    /// Extension (without the dot) of location files inside `locations`.
    pub location_extension: String,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            lookup: "data/config/lookuptext_eng.txt".to_string(),
            classes: "data/config/classdefs.tok".to_string(),
            skills: "data/config/skills.tok".to_string(),
            items: "data/config/items.tok".to_string(),
            prizes: "data/config/prizes.tok".to_string(),
            roster: "data/units/gladiators.txt".to_string(),
            stat_sets: "data/units/statsets.txt".to_string(),
            locations: "data/towns/leagues".to_string(),
            location_extension: "tok".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LudusConfig {
    /// Directory containing one sub-directory per dataset.
    pub datasets_root: Option<PathBuf>,
    pub default_stat_mode: StatSetMode,
    pub layout: DatasetLayout,
}

/// Load configuration from `path`, falling back to defaults on any error.
///
/// A missing file is normal and only logged at `info!`.
pub fn load_config(path: &Path) -> LudusConfig {
    if !path.exists() {
        info!("no configuration at '{}', using defaults", path.display());
        return LudusConfig::default();
    }
    match try_load_config(path) {
        Ok(config) => {
            info!("configuration loaded from '{}'", path.display());
            config
        },
        Err(e) => {
            warn!("Could not load configuration from '{}': {e:#}. Using defaults.", path.display());
            LudusConfig::default()
        },
    }
}

/// Read and parse a configuration file.
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid configuration TOML.
pub fn try_load_config(path: &Path) -> Result<LudusConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("reading configuration from '{}'", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing configuration from '{}'", path.display()))
}

/// Default location for the configuration file: the working directory first, then the user config dir.
pub fn default_config_path() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    dirs::config_dir()
        .map(|dir| dir.join("ludus").join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
        .unwrap_or(local)
}
