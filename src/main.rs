//! AirGuard - air-budget monitor for SCBA teams
//!
//! This is the binary entry point. All logic lives in the library crates.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::{mpsc, watch};

use airguard_app::{
    share, spawn_clock, JsonFileStore, SessionRegistry, Settings, SystemClock, TracingScheduler,
};

/// AirGuard - air-budget monitor for SCBA teams
#[derive(Parser, Debug)]
#[command(name = "airguard")]
#[command(about = "Air-budget monitor for SCBA teams", long_about = None)]
struct Args {
    /// Directory containing .airguard/config.toml
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    airguard_core::logging::init()?;

    let base_path = args
        .path
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let settings = Settings::load(&base_path)?;

    let registry = share(
        SessionRegistry::new(
            Arc::new(SystemClock),
            Arc::new(TracingScheduler),
            Arc::new(JsonFileStore::new(settings.data_dir())),
        )
        .with_communication_interval(settings.communication_interval_secs),
    );

    let (expiry_tx, mut expiry_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let clock_task = spawn_clock(registry.clone(), expiry_tx, shutdown_rx);

    tracing::info!("airguard running; press ctrl-c to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(expiry) = expiry_rx.recv() => {
                tracing::warn!(
                    session = expiry.session_id,
                    "timer expired: {}",
                    expiry.kind.label()
                );
            }
        }
    }

    let _ = shutdown_tx.send(true);
    let _ = clock_task.await;

    tracing::info!("airguard stopped");
    Ok(())
}
