//! Platform-specific configuration paths.

use crate::constants::APP_NAME;
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "BIRDNETLIB_CONFIG";

/// Configuration directory for the current platform.
///
/// - Linux: `~/.config/birdnetlib/`
/// - macOS: `~/Library/Application Support/birdnetlib/`
/// - Windows: `%APPDATA%\birdnetlib\`
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(Error::ConfigDirNotFound)
}

/// Full path to the config file, honouring `BIRDNETLIB_CONFIG`.
pub fn config_file_path() -> Result<PathBuf> {
    match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(config_dir()?.join("config.toml")),
    }
}
