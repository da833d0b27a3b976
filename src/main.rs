//! hold-button-daemon: serves one hold button to an out-of-process host
//!
//! The host renders the button and forwards pointer events over a Unix
//! socket; the daemon runs the tap/long-press state machine and its hold
//! timer, and pushes status changes back to subscribed clients.

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use hold_button::button::{ButtonController, ButtonDriver};
use hold_button::config::Config;
use hold_button::events::StateEvent;
use hold_button::ipc::Server;
use hold_button::lifecycle::ShutdownSignal;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "hold-button-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(
        ?config.socket_path,
        hold_ms = config.button.hold_duration.as_millis() as u64,
        "configuration loaded"
    );

    let mut shutdown = ShutdownSignal::new().context("failed to register signal handlers")?;

    // Button driver -> IPC clients and the logging loop below
    let (event_tx, _event_rx) = broadcast::channel::<StateEvent>(64);

    let controller = ButtonController::new(config.button.clone());
    let (driver, handle) = ButtonDriver::new(controller, event_tx.clone());

    let server = Server::new(&config.socket_path, handle, event_tx.clone())?;
    let mut log_rx = event_tx.subscribe();

    info!("daemon initialized, entering main loop");

    tokio::select! {
        // Run the button (exits once every handle is dropped)
        _ = driver.run() => {
            info!("button driver exited");
        }

        // Run the IPC server (accepts client connections)
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Log state events
        _ = async {
            loop {
                match log_rx.recv().await {
                    Ok(event) => info!(%event, "state event"),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "state event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        } => {
            info!("state event handler exited");
        }

        // Wait for shutdown signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    // Cleanup
    info!("shutting down...");
    server.shutdown().await;
    info!("hold-button-daemon stopped");

    Ok(())
}
