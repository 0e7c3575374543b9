//! Gateway client entry point
//!
//! Run with:
//! ```bash
//! cargo run -p bot-gateway
//! ```
//!
//! Configuration is loaded from environment variables.

use bot_gateway::{EventRegistry, GatewayClient, SemanticEvent};
use bot_common::{try_init_tracing, BotConfig};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize tracing
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    // Run the client
    if let Err(e) = run().await {
        error!(error = %e, "Gateway client failed");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("Starting gateway client...");

    // Load configuration
    let config = BotConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        url = %config.gateway_url,
        "Configuration loaded"
    );

    let registry = Arc::new(EventRegistry::new());
    registry.on("CONNECTED", |_| {
        info!("gateway session established");
    });
    registry.on("MESSAGE_CREATE", |event| {
        if let SemanticEvent::MessageCreate(message) = event {
            let author = message.author.as_ref().map_or_else(String::new, |u| u.tag());
            info!(
                channel_id = %message.channel_id,
                author = %author,
                "message received"
            );
        }
    });

    // Run the client until externally closed
    let client = GatewayClient::new(config, registry);
    client.run().await?;

    Ok(())
}
