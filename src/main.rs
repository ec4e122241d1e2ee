// Script Relay - Telegram bot entry point

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use script_relay::services::remote::adapters::telegram::TelegramAdapter;
use script_relay::services::remote::TelegramAdapterConfig;
use script_relay::storage::config::ConfigService;
use script_relay::utils::paths::config_path;
use script_relay::RelayGateway;

#[tokio::main]
async fn main() -> Result<()> {
    let path = config_path()?;
    let config = ConfigService::load(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))?
        .into_config();

    let default_filter = if config.is_verbose {
        "script_relay=debug,teloxide=debug"
    } else {
        "script_relay=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    info!(
        script = %config.script_path.display(),
        allowed = config.allowed_ids.len(),
        "Loaded config from {}",
        path.display()
    );

    let adapter = TelegramAdapter::new(TelegramAdapterConfig {
        bot_token: Some(config.api_token.clone()),
        ..Default::default()
    })?;
    let gateway = RelayGateway::new(config, Arc::new(adapter));

    let cancel = gateway.cancel_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl-C, shutting down");
                cancel.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    gateway.run().await?;
    Ok(())
}
