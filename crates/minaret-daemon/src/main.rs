use std::sync::Arc;

use clap::Parser;
use tokio::sync::{mpsc, watch};
use tracing::info;

use minaret_core::clock::SystemClock;
use minaret_core::config::MinaretConfig;
use minaret_core::types::Notification;
use minaret_notify::{Dispatcher, TelegramChannel};
use minaret_scheduler::{EngineOptions, SchedulerEngine};
use minaret_sources::{AladhanClient, FixedLocation, IpLocator, LocationSource};

/// Prayer-times notification daemon.
#[derive(Parser)]
#[command(name = "minaretd", version, about)]
struct Cli {
    /// Path to minaret.toml (default: $MINARET_CONFIG, then ~/.minaret/minaret.toml).
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "minaret=info".into()),
        )
        .init();

    let cli = Cli::parse();
    // load config: explicit flag > MINARET_CONFIG env > ~/.minaret/minaret.toml
    let config_path = cli.config.or_else(|| std::env::var("MINARET_CONFIG").ok());
    let config = MinaretConfig::load(config_path.as_deref())?;

    let options = EngineOptions::from_config(&config.schedule)?;

    let telegram = config
        .delivery
        .telegram
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("no delivery channel configured: [delivery.telegram] is required"))?;
    let channel = Arc::new(TelegramChannel::new(telegram.bot_token.clone()));
    let dispatcher = Dispatcher::new(
        channel,
        telegram.chat_id.clone(),
        options.timezone,
        config.delivery.max_attempts,
    );

    // Fired-event channel: SchedulerEngine → dispatch worker. Dispatch (with
    // its retries) runs off the scheduling loop so a slow channel never
    // delays a timer.
    let (dispatch_tx, dispatch_rx) = mpsc::channel::<Notification>(64);
    tokio::spawn(dispatcher.run(dispatch_rx));

    let location: Arc<dyn LocationSource> = match config.location.fixed() {
        Some(fixed) => {
            info!(location = %fixed.describe(), "using fixed coordinates from config");
            Arc::new(FixedLocation::new(fixed))
        }
        None => {
            info!("no pinned coordinates, using IP geolocation");
            Arc::new(IpLocator::new(None))
        }
    };
    let timings = Arc::new(AladhanClient::new(
        config.timings.base_url.clone(),
        config.timings.method,
    ));

    let engine = SchedulerEngine::new(options, Arc::new(SystemClock), location, timings, dispatch_tx);

    let shutdown = shutdown_signal();
    engine.run(shutdown).await;
    Ok(())
}

/// Flip a watch channel on SIGINT or SIGTERM.
fn shutdown_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("received SIGINT"),
            _ = terminate => info!("received SIGTERM"),
        }

        let _ = tx.send(true);
    });

    rx
}
