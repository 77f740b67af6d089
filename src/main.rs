//! Slot Relay - Main Entry Point
//!
//! Starts the automation worker and global shortcuts, then serves the phone
//! pairing listener and the loopback desktop bridge until Ctrl+C.

use anyhow::Result;
use std::fs::File;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use slot_relay::data::machine_id;
use slot_relay::platform::PlatformFactory;
use slot_relay::ui::{serve_desktop, serve_mobile};
use slot_relay::{AppConfig, DesktopApi, EncryptedStore, PlatformParts};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load_or_default()?;
    init_logging(&config.logging.level);

    info!("Starting Slot Relay v{}", env!("CARGO_PKG_VERSION"));

    let store = EncryptedStore::new(AppConfig::store_path()?, &machine_id())?;
    let platform = PlatformParts {
        keys: PlatformFactory::create_text_action(),
        clipboard: PlatformFactory::create_clipboard()?,
        hotkeys: PlatformFactory::create_hotkey_backend()?,
    };
    let api = Arc::new(DesktopApi::start(
        store,
        platform,
        config.automation.clone(),
        config.server.mobile_port,
    )?);

    let mobile = TcpListener::bind((config.server.bind_address.as_str(), config.server.mobile_port))
        .await?;
    let desktop = TcpListener::bind(("127.0.0.1", config.server.desktop_port)).await?;

    let (stop_tx, stop_rx) = watch::channel(false);
    let stopped = |mut rx: watch::Receiver<bool>| async move {
        let _ = rx.changed().await;
    };

    let result = tokio::try_join!(
        serve_mobile(mobile, api.pairing(), stopped(stop_rx.clone())),
        serve_desktop(desktop, api.clone(), stopped(stop_rx)),
        async {
            tokio::signal::ctrl_c().await?;
            info!("Ctrl+C received, shutting down");
            let _ = stop_tx.send(true);
            Ok::<(), anyhow::Error>(())
        }
    );

    let cleanup = api.clone();
    if let Err(e) = tokio::task::spawn_blocking(move || cleanup.shutdown()).await {
        warn!("Shutdown task failed: {}", e);
    }

    result?;
    info!("Application exited");
    Ok(())
}

fn init_logging(level: &str) {
    let default_filter = format!("slot_relay={}", level);

    let file_layer = match AppConfig::log_path().and_then(|path| Ok(File::create(path)?)) {
        Ok(file) => Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        ),
        Err(e) => {
            eprintln!("Debug log unavailable: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
}
