//! Application configuration management utilities.

use crate::errors::CliError;
use camino::Utf8PathBuf;
use lumpfs::LoadSettings;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

/// Application-wide configuration stored in lumpfs.toml.
///
/// ```toml
/// files = ["doom2.wad", "mods/brightmaps.pk3"]
///
/// [settings]
/// iwadIndex = 0
/// maxIwadIndex = 0
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Load order used when no files are given on the command line.
    pub files: Vec<String>,
    pub settings: LoadSettings,
}

/// Returns the directory where the current executable resides.
pub fn install_dir() -> Option<Utf8PathBuf> {
    let exe = env::current_exe().ok()?;
    let parent = exe.parent()?;
    Utf8PathBuf::from_path_buf(parent.to_path_buf()).ok()
}

/// Returns the default configuration file path (lumpfs.toml next to the executable).
pub fn default_config_path() -> Option<Utf8PathBuf> {
    install_dir().map(|dir| dir.join("lumpfs.toml"))
}

/// Parses configuration text.
pub fn parse_config(content: &str) -> Result<AppConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Loads the application configuration.
///
/// An explicit path must exist and parse. The default file is optional: when it
/// is missing the default configuration is returned.
pub fn load_config(explicit: Option<&str>) -> Result<AppConfig, CliError> {
    let (path, required) = match explicit {
        Some(path) => (Utf8PathBuf::from(path), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(AppConfig::default()),
        },
    };

    if !path.exists() {
        if required {
            return Err(CliError::config_not_found(path));
        }
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(&path)?;
    let cfg = parse_config(&content).map_err(|e| CliError::config_parse_error(path.clone(), e))?;
    tracing::debug!("Loaded configuration from '{}'", path);
    Ok(cfg)
}
