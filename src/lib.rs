//! Script Relay - Rust Library
//!
//! A Telegram bot that lets allow-listed users run a local script and get
//! its output back. It includes:
//! - Configuration models and the JSON config loader
//! - The relay services (adapter, dispatcher, queue, worker)
//! - Error types and path helpers

pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use models::settings::BotConfig;
pub use services::remote::gateway::RelayGateway;
pub use storage::config::ConfigService;
pub use utils::error::{AppError, AppResult};
