//! Settings Models
//!
//! Bot configuration as stored in config.json.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use script_relay_core::Identity;

/// Poll interval used when `monitor_interval` is zero or negative.
pub const DEFAULT_MONITOR_INTERVAL_SECS: u64 = 5;

/// Bot configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Telegram bot API token
    pub api_token: String,
    /// Usernames allowed to talk to the bot
    pub allowed_ids: Vec<Identity>,
    /// Update poll interval in seconds (<= 0 means default)
    #[serde(default)]
    pub monitor_interval: i64,
    /// Executable run by /execute and shown by /showcode
    pub script_path: PathBuf,
    /// Enable verbose platform-client logging
    #[serde(default)]
    pub is_verbose: bool,
}

impl BotConfig {
    /// Poll interval with the default applied.
    pub fn effective_monitor_interval(&self) -> Duration {
        if self.monitor_interval <= 0 {
            Duration::from_secs(DEFAULT_MONITOR_INTERVAL_SECS)
        } else {
            Duration::from_secs(self.monitor_interval as u64)
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.api_token.trim().is_empty() {
            return Err("api_token must not be empty".to_string());
        }

        if self.script_path.as_os_str().is_empty() {
            return Err("script_path must not be empty".to_string());
        }

        Ok(())
    }
}
