// Upstream wire format: JSON text frames tagged by "event".

use serde::{Deserialize, Serialize};

use crate::models::{SessionId, Snapshot, TaggedSnapshot, TrackRequest};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum WireMessage {
    TrackPackage {
        session: SessionId,
        name: String,
    },
    PackageUpdate {
        #[serde(default)]
        session: Option<SessionId>,
        data: Snapshot,
    },
    #[serde(other)]
    Unknown,
}

pub fn encode_track(request: &TrackRequest) -> serde_json::Result<String> {
    serde_json::to_string(&WireMessage::TrackPackage {
        session: request.session,
        name: request.name.clone(),
    })
}

/// Decodes an inbound frame into a tagged update. Untagged updates take `fallback`
/// (the session of the last request sent on this connection). Other frames yield `None`.
pub fn decode_update(text: &str, fallback: Option<SessionId>) -> Option<TaggedSnapshot> {
    let message = match serde_json::from_str::<WireMessage>(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(error = %e, operation = "decode_frame", "undecodable frame skipped");
            return None;
        }
    };
    match message {
        WireMessage::PackageUpdate { session, data } => {
            let session = session.or(fallback)?;
            Some(TaggedSnapshot {
                session,
                snapshot: data,
            })
        }
        WireMessage::TrackPackage { .. } | WireMessage::Unknown => None,
    }
}
