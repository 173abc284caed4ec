//! P2PBot - Telegram bot for Binance P2P USDT/VES listings
//!
//! Runs two independent tasks: the chat command loop and the liveness probe.
//! They share only the shutdown signal.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

use p2pbot::bot::{run_command_loop, CommandHandler, TelegramTransport};
use p2pbot::config::AppConfig;
use p2pbot::market::P2pClient;
use p2pbot::{health, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = AppConfig::load()?;
    logging::init(&cfg.logging);

    info!("🚀 Starting P2PBot: {}", cfg.digest());

    let token = cfg.require_token()?;
    let source = Arc::new(P2pClient::new(&cfg.market)?);
    let handler = Arc::new(CommandHandler::new(source, &cfg.market));
    let transport = Arc::new(TelegramTransport::new(&cfg.telegram, token)?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let health_task = if cfg.health.enabled {
        let health_cfg = cfg.health.clone();
        let rx = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = health::start_server(health_cfg, rx).await {
                error!(error = %e, "Liveness probe failed, command loop keeps running");
            }
        }))
    } else {
        None
    };

    let mut bot_task = tokio::spawn(run_command_loop(
        transport,
        handler,
        Duration::from_millis(cfg.telegram.reconnect_delay_ms),
        shutdown_rx,
    ));

    info!("🤖 Bot corriendo en Telegram...");

    let bot_finished = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "Failed to listen for Ctrl-C, shutting down");
            }
            info!("Shutdown requested");
            None
        }
        joined = &mut bot_task => Some(joined),
    };

    let _ = shutdown_tx.send(true);

    let bot_result = match bot_finished {
        Some(joined) => joined,
        None => bot_task.await,
    };
    match bot_result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "Command loop exited with error"),
        Err(e) => error!(error = %e, "Command loop task panicked"),
    }

    if let Some(task) = health_task {
        let _ = task.await;
    }

    info!("👋 P2PBot stopped");
    Ok(())
}
