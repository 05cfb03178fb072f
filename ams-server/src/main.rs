//! AMS Server - Headless Daemon
//!
//! Runs the Application Mobility Service:
//! - MEC 021 AMS API under `/{sandbox}[/{mep}]/amsi/v1`
//! - Platform event ingress and introspection under `/ams-internal/v1`
//! - Background subscription expiry
//!
//! Notifications are delivered from a bounded queue, never from request handlers.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod cli;
mod router;
mod scheduler;
mod server_utils;
mod state;
#[cfg(test)]
mod test_helpers;

use ams_core::{
    event_channel, run_event_loop, AmsService, KvStore, MemoryStore, NotificationQueue, SqliteStore,
};
use ams_types::AmsConfig;
use cli::Cli;
use state::AppState;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = cli.resolve_config()?;
    info!(
        sandbox = %config.sandbox_name,
        mep = %config.mep_name,
        port = config.port,
        "AMS server starting"
    );

    let queue = NotificationQueue::start(&config.notification)?;
    let expiry_period = Duration::from_secs(config.expiry_check_interval_secs);
    let store = open_store(&config)?;
    let service = AmsService::new(config, store, queue);

    match service.restore().await {
        Ok(summary) => info!(
            registrations = summary.registrations,
            subscriptions = summary.subscriptions,
            "Persisted state loaded"
        ),
        Err(e) => warn!("Could not restore persisted state: {}", e),
    }

    let (events_tx, events_rx) = event_channel(EVENT_CHANNEL_CAPACITY);
    tokio::spawn(run_event_loop(service.clone(), events_rx));
    scheduler::start_subscription_expiry(service.clone(), expiry_period);

    let state = AppState::new(service, events_tx);
    let listener = server_utils::create_listener(state.config()).await?;
    info!("AMS API available at http://{}{}", listener.local_addr()?, state.config().base_path());

    let service = state.service().clone();
    let app = router::build_router(state);
    axum::serve(listener, app).with_graceful_shutdown(server_utils::shutdown_signal()).await?;

    service.sync_store().await;
    info!("Server stopped");
    Ok(())
}

/// SQLite when a store path is configured, otherwise an in-memory store.
fn open_store(config: &AmsConfig) -> Result<Arc<dyn KvStore>> {
    match &config.store_path {
        Some(path) => {
            let store = SqliteStore::open(path)
                .with_context(|| format!("Failed to open store at {}", path.display()))?;
            Ok(Arc::new(store))
        },
        None => {
            warn!("No store path configured, state will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        },
    }
}
