// Tracker worker: the single task that owns the aggregator.
// Track commands and channel events are processed one at a time, in arrival order;
// every state change is published as a DashboardView (watch for queries, broadcast for streams).

use crate::aggregator::{Aggregator, UpdateOutcome};
use crate::channel::ChannelEvent;
use crate::models::{ChannelStatus, DashboardView, SessionId, TrackRequest};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{Duration, Instant, interval};
use tracing::Instrument;

/// Rate limit for "no receivers" debug log (avoid logging on every update when no one is on /ws/dashboard)
const NO_RECEIVERS_WARN_INTERVAL: Duration = Duration::from_secs(60);

/// Capacity of the command queue from the HTTP surface.
pub const COMMAND_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug)]
pub enum Command {
    Track {
        name: String,
        reply: oneshot::Sender<Option<SessionId>>,
    },
}

/// Cloneable handle used by routes (and startup) to issue track requests.
#[derive(Debug, Clone)]
pub struct TrackerHandle {
    commands_tx: mpsc::Sender<Command>,
}

impl TrackerHandle {
    pub fn new(commands_tx: mpsc::Sender<Command>) -> Self {
        Self { commands_tx }
    }

    /// Starts a new tracking session. `None` when the name is blank.
    pub async fn track(&self, name: &str) -> anyhow::Result<Option<SessionId>> {
        let (reply, reply_rx) = oneshot::channel();
        self.commands_tx
            .send(Command::Track {
                name: name.to_owned(),
                reply,
            })
            .await
            .map_err(|_| anyhow::anyhow!("tracker worker is not running"))?;
        Ok(reply_rx.await?)
    }
}

/// Channels and shutdown for the worker.
pub struct WorkerDeps {
    pub commands_rx: mpsc::Receiver<Command>,
    pub events_rx: mpsc::Receiver<ChannelEvent>,
    pub track_tx: watch::Sender<Option<TrackRequest>>,
    pub view_tx: watch::Sender<DashboardView>,
    pub updates_tx: broadcast::Sender<DashboardView>,
    pub ws_dashboard_connections: Arc<AtomicUsize>,
    pub shutdown_rx: oneshot::Receiver<()>,
}

pub struct WorkerConfig {
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    spawn_with(Aggregator::new(), deps, config)
}

/// Same as [`spawn`] with a caller-supplied aggregator (e.g. a seeded RNG in tests).
pub fn spawn_with<R>(
    mut aggregator: Aggregator<R>,
    deps: WorkerDeps,
    config: WorkerConfig,
) -> tokio::task::JoinHandle<()>
where
    R: rand::Rng + Send + 'static,
{
    let WorkerDeps {
        mut commands_rx,
        mut events_rx,
        track_tx,
        view_tx,
        updates_tx,
        ws_dashboard_connections,
        mut shutdown_rx,
    } = deps;
    let stats_log_interval = Duration::from_secs(config.stats_log_interval_secs);
    let worker_span = tracing::span!(tracing::Level::DEBUG, "worker");

    let task = async move {
        let mut stats_log_tick = interval(stats_log_interval);
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut channel = ChannelStatus::Connecting;
        let mut updates_applied_total: u64 = 0;
        let mut last_no_receivers_warn: Option<Instant> = None;

        loop {
            tokio::select! {
                Some(command) = commands_rx.recv() => match command {
                    Command::Track { name, reply } => {
                        let request = aggregator.track(&name);
                        let session = request.as_ref().map(|r| r.session);
                        match request {
                            Some(request) => {
                                tracing::info!(
                                    session = %request.session,
                                    package = %request.name,
                                    "tracking package"
                                );
                                track_tx.send_replace(Some(request));
                            }
                            None => {
                                tracing::debug!(operation = "track", "blank package name ignored");
                            }
                        }
                        if session.is_some() {
                            publish(&aggregator, channel, &view_tx, &updates_tx, &mut last_no_receivers_warn);
                        }
                        let _ = reply.send(session);
                    }
                },
                Some(event) = events_rx.recv() => match event {
                    ChannelEvent::Connected => {
                        channel = ChannelStatus::Connected;
                        publish(&aggregator, channel, &view_tx, &updates_tx, &mut last_no_receivers_warn);
                    }
                    ChannelEvent::Disconnected { reason } => {
                        tracing::warn!(reason = %reason, operation = "channel", "upstream channel disconnected");
                        channel = ChannelStatus::Disconnected;
                        publish(&aggregator, channel, &view_tx, &updates_tx, &mut last_no_receivers_warn);
                    }
                    ChannelEvent::Update(update) => {
                        let session = update.session;
                        match aggregator.on_snapshot(update) {
                            UpdateOutcome::Applied => {
                                updates_applied_total += 1;
                                publish(&aggregator, channel, &view_tx, &updates_tx, &mut last_no_receivers_warn);
                            }
                            UpdateOutcome::Stale => {
                                tracing::debug!(session = %session, "stale session update dropped");
                            }
                        }
                    }
                },
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        ws_dashboard_clients =
                            ws_dashboard_connections.load(std::sync::atomic::Ordering::Relaxed),
                        updates_applied_total = updates_applied_total,
                        stale_dropped_total = aggregator.stale_dropped(),
                        "app stats"
                    );
                }
            }
        }
    };
    tokio::spawn(task.instrument(worker_span))
}

fn publish<R: rand::Rng>(
    aggregator: &Aggregator<R>,
    channel: ChannelStatus,
    view_tx: &watch::Sender<DashboardView>,
    updates_tx: &broadcast::Sender<DashboardView>,
    last_no_receivers_warn: &mut Option<Instant>,
) {
    let view = aggregator.dashboard_view(channel);
    view_tx.send_replace(view.clone());
    if updates_tx.send(view).is_err() {
        let should_warn =
            last_no_receivers_warn.is_none_or(|t| t.elapsed() >= NO_RECEIVERS_WARN_INTERVAL);
        if should_warn {
            tracing::debug!(
                operation = "broadcast_view",
                "No active WebSocket clients; broadcast channel has no receivers"
            );
            *last_no_receivers_warn = Some(Instant::now());
        }
    }
}
