// Channel client: WebSocket connection to the upstream update feed.
// Track requests come in on a watch channel (latest wins, replayed on reconnect);
// connection events and tagged snapshots go out, in order, on an mpsc queue.

pub mod wire;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Duration;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::Instrument;

use crate::models::{SessionId, TaggedSnapshot, TrackRequest};

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] Box<tungstenite::Error>),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("event receiver closed")]
    EventsClosed,
}

impl From<tungstenite::Error> for ChannelError {
    fn from(err: tungstenite::Error) -> Self {
        ChannelError::WebSocket(Box::new(err))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Connected,
    Disconnected { reason: String },
    Update(TaggedSnapshot),
}

#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub url: String,
    pub reconnect_delay_ms: u64,
}

/// Spawns the client task. It reconnects until shutdown, or until the event receiver is gone.
pub fn spawn(
    config: ChannelConfig,
    mut track_rx: watch::Receiver<Option<TrackRequest>>,
    event_tx: mpsc::Sender<ChannelEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    let reconnect_delay = Duration::from_millis(config.reconnect_delay_ms);
    let client_span = tracing::span!(tracing::Level::DEBUG, "channel", url = %config.url);
    let task = async move {
        loop {
            let reason = tokio::select! {
                result = run_connection(&config.url, &mut track_rx, &event_tx) => match result {
                    Ok(()) => "connection closed".to_string(),
                    Err(ChannelError::EventsClosed) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, operation = "run_connection", "upstream channel failed");
                        e.to_string()
                    }
                },
                _ = &mut shutdown_rx => {
                    tracing::debug!("Channel client shutting down");
                    break;
                }
            };
            if event_tx
                .send(ChannelEvent::Disconnected { reason })
                .await
                .is_err()
            {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(reconnect_delay) => {}
                _ = &mut shutdown_rx => {
                    tracing::debug!("Channel client shutting down");
                    break;
                }
            }
        }
    };
    tokio::spawn(task.instrument(client_span))
}

async fn run_connection(
    url: &str,
    track_rx: &mut watch::Receiver<Option<TrackRequest>>,
    event_tx: &mpsc::Sender<ChannelEvent>,
) -> Result<(), ChannelError> {
    let (socket, _) = tokio_tungstenite::connect_async(url).await?;
    let (mut sink, mut stream) = socket.split();
    tracing::info!("Connected to upstream channel");
    event_tx
        .send(ChannelEvent::Connected)
        .await
        .map_err(|_| ChannelError::EventsClosed)?;

    let mut current: Option<SessionId> = None;
    let pending = track_rx.borrow_and_update().clone();
    if let Some(request) = pending {
        sink.send(Message::Text(wire::encode_track(&request)?.into()))
            .await?;
        current = Some(request.session);
    }

    loop {
        tokio::select! {
            changed = track_rx.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let latest = track_rx.borrow_and_update().clone();
                if let Some(request) = latest {
                    sink.send(Message::Text(wire::encode_track(&request)?.into())).await?;
                    tracing::debug!(session = %request.session, package = %request.name, "track request sent");
                    current = Some(request.session);
                }
            }
            frame = stream.next() => match frame {
                None | Some(Ok(Message::Close(_))) => return Ok(()),
                Some(Err(e)) => return Err(e.into()),
                Some(Ok(Message::Text(text))) => {
                    if let Some(update) = wire::decode_update(text.as_str(), current) {
                        event_tx
                            .send(ChannelEvent::Update(update))
                            .await
                            .map_err(|_| ChannelError::EventsClosed)?;
                    }
                }
                Some(Ok(_)) => {}
            },
        }
    }
}
