//! SecMon Feed - Binary Entry Point
//!
//! Headless monitor: loads the snapshot, follows the live feed, logs new events and
//! serves the consumer relay until Ctrl+C.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use secmon_feed::api::{self, AppState};
use secmon_feed::{FeedConfig, FeedResult, Monitor, Severity, StateChange};

#[tokio::main]
async fn main() -> FeedResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("secmon_feed=info,info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = FeedConfig::from_env()?;
    info!(api = %config.api_url, feed = %config.ws_url, "starting secmon-feed");

    let monitor = Monitor::from_config(&config)?;
    let listener = TcpListener::bind(config.relay_addr).await.map_err(|e| {
        secmon_feed::FeedError::Config(format!("cannot bind relay on {}: {}", config.relay_addr, e))
    })?;

    let app_state = Arc::new(AppState::new(
        Arc::clone(monitor.state()),
        monitor.backend().clone(),
    ));
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let mut relay_shutdown = shutdown_tx.subscribe();
    let relay = tokio::spawn(api::serve(listener, app_state, async move {
        let _ = relay_shutdown.recv().await;
    }));

    let logger = tokio::spawn(log_updates(
        monitor.state().subscribe(),
        shutdown_tx.subscribe(),
    ));

    monitor.start().await;

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl+C");
    }
    info!("shutting down");

    monitor.stop().await;
    let _ = shutdown_tx.send(());
    match relay.await {
        Ok(Err(e)) => warn!(error = %e, "relay exited with error"),
        Err(e) => warn!(error = %e, "relay task failed"),
        Ok(Ok(())) => {}
    }
    let _ = logger.await;
    Ok(())
}

/// Log each newly arrived event and connection change
async fn log_updates(
    mut updates: broadcast::Receiver<secmon_feed::StateUpdate>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        let update = tokio::select! {
            _ = shutdown.recv() => return,
            update = updates.recv() => update,
        };

        match update {
            Ok(update) => match update.change {
                StateChange::EventAppended { event } => {
                    let stats = &update.state.stats;
                    match event.severity {
                        Severity::High => warn!(
                            event_type = %event.event_type,
                            process = %event.process_name,
                            pid = event.pid,
                            total = stats.total_events(),
                            high = stats.high_severity(),
                            "{}", event.details
                        ),
                        _ => info!(
                            severity = %event.severity,
                            event_type = %event.event_type,
                            process = %event.process_name,
                            pid = event.pid,
                            total = stats.total_events(),
                            "{}", event.details
                        ),
                    }
                }
                StateChange::SnapshotLoaded { event_count } => {
                    info!(events = event_count, "snapshot applied");
                }
                StateChange::ConnectionChanged => {
                    if update.state.online {
                        info!("LINK_ESTABLISHED");
                    } else {
                        warn!("LINK_OFFLINE");
                    }
                }
            },
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "event logger lagged");
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}
