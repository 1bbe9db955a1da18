use anyhow::Result;
use statpac::*;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{broadcast, mpsc, watch};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let (commands_tx, commands_rx) = mpsc::channel(worker::COMMAND_CHANNEL_CAPACITY);
    let (events_tx, events_rx) = mpsc::channel(app_config.upstream.event_capacity);
    let (track_tx, track_rx) = watch::channel(None);
    let (view_tx, view_rx) = watch::channel(models::DashboardView::default());
    let (updates_tx, _) =
        broadcast::channel::<models::DashboardView>(app_config.publishing.broadcast_capacity);
    let ws_dashboard_connections = Arc::new(AtomicUsize::new(0));
    let (worker_shutdown_tx, worker_shutdown_rx) = tokio::sync::oneshot::channel();
    let (channel_shutdown_tx, channel_shutdown_rx) = tokio::sync::oneshot::channel();

    let channel_handle = channel::spawn(
        channel::ChannelConfig {
            url: app_config.upstream.url.clone(),
            reconnect_delay_ms: app_config.upstream.reconnect_delay_ms,
        },
        track_rx,
        events_tx,
        channel_shutdown_rx,
    );

    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            commands_rx,
            events_rx,
            track_tx,
            view_tx,
            updates_tx: updates_tx.clone(),
            ws_dashboard_connections: ws_dashboard_connections.clone(),
            shutdown_rx: worker_shutdown_rx,
        },
        worker::WorkerConfig {
            stats_log_interval_secs: app_config.monitoring.stats_log_interval_secs,
        },
    );

    let tracker = worker::TrackerHandle::new(commands_tx);
    if let Some(name) = &app_config.tracking.initial_package {
        tracker.track(name).await?;
    }

    let registry = Arc::new(
        registry::RegistryClient::new(
            &app_config.registry.base_url,
            app_config.registry.timeout_secs,
        )
        .map_err(|e| anyhow::anyhow!("registry client: {}", e))?,
    );

    let app = routes::app(
        tracker,
        view_rx,
        updates_tx,
        registry,
        ws_dashboard_connections,
        app_config.clone(),
    );
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Received shutdown signal");
        }
    }

    let _ = channel_shutdown_tx.send(());
    let _ = worker_shutdown_tx.send(());
    let _ = channel_handle.await;
    let _ = worker_handle.await;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
