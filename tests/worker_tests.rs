// Worker tests: commands and channel events flow through the aggregator into published views

mod common;

use statpac::channel::ChannelEvent;
use statpac::models::*;
use statpac::worker::{TrackerHandle, WorkerConfig, WorkerDeps, spawn_with};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

struct Harness {
    tracker: TrackerHandle,
    events_tx: mpsc::Sender<ChannelEvent>,
    track_rx: watch::Receiver<Option<TrackRequest>>,
    view_rx: watch::Receiver<DashboardView>,
    updates_rx: broadcast::Receiver<DashboardView>,
    shutdown_tx: oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<()>,
}

fn start() -> Harness {
    let (commands_tx, commands_rx) = mpsc::channel(8);
    let (events_tx, events_rx) = mpsc::channel(8);
    let (track_tx, track_rx) = watch::channel(None);
    let (view_tx, view_rx) = watch::channel(DashboardView::default());
    let (updates_tx, updates_rx) = broadcast::channel(64);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = spawn_with(
        common::seeded_aggregator(42),
        WorkerDeps {
            commands_rx,
            events_rx,
            track_tx,
            view_tx,
            updates_tx,
            ws_dashboard_connections: Arc::new(AtomicUsize::new(0)),
            shutdown_rx,
        },
        WorkerConfig {
            stats_log_interval_secs: 3600,
        },
    );
    Harness {
        tracker: TrackerHandle::new(commands_tx),
        events_tx,
        track_rx,
        view_rx,
        updates_rx,
        shutdown_tx,
        handle,
    }
}

#[tokio::test]
async fn track_forwards_request_and_publishes_awaiting_view() {
    let mut h = start();
    let session = h.tracker.track("react").await.unwrap().expect("session");

    let request = h.track_rx.borrow().clone().expect("request forwarded");
    assert_eq!(request.session, session);
    assert_eq!(request.name, "react");

    let view = h.view_rx.borrow().clone();
    assert_eq!(view.phase, SessionPhase::Awaiting);
    assert_eq!(view.package.as_deref(), Some("react"));

    let streamed = h.updates_rx.recv().await.unwrap();
    assert_eq!(streamed.session, Some(session));

    let _ = h.shutdown_tx.send(());
    h.handle.await.unwrap();
}

#[tokio::test]
async fn blank_track_returns_none_and_forwards_nothing() {
    let h = start();
    assert_eq!(h.tracker.track("  ").await.unwrap(), None);
    assert!(h.track_rx.borrow().is_none());
    assert_eq!(h.view_rx.borrow().phase, SessionPhase::Idle);
    let _ = h.shutdown_tx.send(());
    h.handle.await.unwrap();
}

#[tokio::test]
async fn updates_are_applied_and_stale_ones_dropped() {
    let h = start();
    let a = h.tracker.track("a").await.unwrap().unwrap();
    h.events_tx
        .send(ChannelEvent::Update(common::tagged(a, 100)))
        .await
        .unwrap();
    let view_rx = h.view_rx.clone();
    assert!(common::eventually(|| view_rx.borrow().downloads.values == vec![100]).await);

    let b = h.tracker.track("b").await.unwrap().unwrap();
    h.events_tx
        .send(ChannelEvent::Update(common::tagged(a, 555)))
        .await
        .unwrap();
    h.events_tx
        .send(ChannelEvent::Update(common::tagged(b, 7)))
        .await
        .unwrap();

    assert!(common::eventually(|| view_rx.borrow().phase == SessionPhase::Live).await);
    let view = view_rx.borrow().clone();
    assert_eq!(view.session, Some(b));
    assert_eq!(view.downloads.values, vec![7]);
    assert_eq!(view.rate.values.len(), 1);
    assert_eq!(view.snapshot.unwrap().estimated_downloads, 7);

    let _ = h.shutdown_tx.send(());
    h.handle.await.unwrap();
}

#[tokio::test]
async fn channel_status_is_published() {
    let h = start();
    h.events_tx.send(ChannelEvent::Connected).await.unwrap();
    let view_rx = h.view_rx.clone();
    assert!(common::eventually(|| view_rx.borrow().channel == ChannelStatus::Connected).await);

    h.events_tx
        .send(ChannelEvent::Disconnected {
            reason: "reset by peer".into(),
        })
        .await
        .unwrap();
    assert!(
        common::eventually(|| view_rx.borrow().channel == ChannelStatus::Disconnected).await
    );

    let _ = h.shutdown_tx.send(());
    h.handle.await.unwrap();
}
