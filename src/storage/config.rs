//! JSON Configuration Loading
//!
//! Reads the bot configuration file once at startup.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::settings::BotConfig;
use crate::utils::error::{AppError, AppResult};

/// Configuration service holding the loaded bot settings
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    config: BotConfig,
}

impl ConfigService {
    /// Load and validate the configuration at `path`.
    ///
    /// Unlike a settings store, a missing file is an error: the bot cannot
    /// run without a token and a script.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let config_path = path.as_ref().to_path_buf();
        let config = Self::load_from_file(&config_path)?;
        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<BotConfig> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: BotConfig = serde_json::from_str(&content)?;
        config.validate().map_err(AppError::validation)?;
        Ok(config)
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &BotConfig {
        &self.config
    }

    /// Take ownership of the configuration
    pub fn into_config(self) -> BotConfig {
        self.config
    }

    /// Path the configuration was read from
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
