pub mod config;
pub mod controller;
pub mod mapping;
pub mod session;
pub mod state;
pub mod sync;

#[cfg(test)]
mod testing;

use crate::config::BridgeConfig;
use crate::controller::GilrsBackend;
use crate::session::{channel_session, run_console_transport};
use crate::sync::{run_input_sync, TerminationSource};
use color_eyre::{eyre::eyre, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config_path = BridgeConfig::default_path()?;
    let config = BridgeConfig::load_or_create(&config_path).await?;
    info!("Using config from {}", config_path.display());

    let (mut session, transport) = channel_session(config.controller, config.report_buffer);
    let transport_handle = tokio::spawn(run_console_transport(transport, config.connect_delay()));

    let backend =
        GilrsBackend::new().map_err(|e| eyre!("Failed to initialize gamepad backend: {}", e))?;

    let termination = TerminationSource::new();
    if let Some(duration) = config.run_duration() {
        termination.arm_timer(duration);
    }
    if config.watch_stdin {
        termination.spawn_key_watcher()?;
    }

    let shutdown = CancellationToken::new();
    let ctrl_c_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    let result = tokio::select! {
        _ = shutdown.cancelled() => {
            info!("Ctrl-C received, stopping input sync");
            Ok(())
        }
        result = run_input_sync(
            &mut session,
            Box::new(backend),
            termination,
            Some(config.sync_settings()),
        ) => result,
    };

    info!("Session sent {} reports", session.reports_sent());
    // Closing the session ends the transport task
    drop(session);
    match transport_handle.await {
        Ok(reports) => info!("Transport delivered {} reports", reports),
        Err(e) => warn!("Transport task ended abnormally: {}", e),
    }

    result.map_err(|e| eyre!("Input sync failed: {}", e))
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
