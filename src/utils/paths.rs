//! Path Utilities
//!
//! Resolves where the relay reads its configuration from.

use std::path::PathBuf;

use crate::utils::error::{AppError, AppResult};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "SCRIPT_RELAY_CONFIG";

/// Default config file name, resolved against the working directory.
pub const CONFIG_FILENAME: &str = "config.json";

/// Get the config file path.
///
/// `$SCRIPT_RELAY_CONFIG` if set and non-empty, otherwise `./config.json`.
pub fn config_path() -> AppResult<PathBuf> {
    config_path_from(std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
}

fn config_path_from(overridden: Option<PathBuf>) -> AppResult<PathBuf> {
    match overridden {
        Some(path) if !path.as_os_str().is_empty() => Ok(path),
        _ => {
            let cwd = std::env::current_dir().map_err(|e| {
                AppError::config(format!("Could not determine working directory: {}", e))
            })?;
            Ok(cwd.join(CONFIG_FILENAME))
        }
    }
}
