// Tracked package, session tag, base downloads and latest snapshot.

use crate::models::{SessionId, SessionPhase, Snapshot};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub tracked_name: Option<String>,
    pub session_id: Option<SessionId>,
    /// Estimate from the first snapshot of the session; `None` until it arrives.
    pub base_downloads: Option<u64>,
    pub latest_snapshot: Option<Snapshot>,
    pub phase: SessionPhase,
}

impl SessionState {
    /// Starts a new session, dropping everything learned in the previous one.
    pub fn restart(&mut self, name: String, session_id: SessionId) {
        *self = SessionState {
            tracked_name: Some(name),
            session_id: Some(session_id),
            base_downloads: None,
            latest_snapshot: None,
            phase: SessionPhase::Awaiting,
        };
    }

    pub fn is_current(&self, session_id: SessionId) -> bool {
        self.session_id == Some(session_id)
    }

    /// Stores the snapshot; the first one of a session fixes the base.
    pub fn record(&mut self, snapshot: Snapshot) {
        if self.base_downloads.is_none() {
            self.base_downloads = Some(snapshot.estimated_downloads);
        }
        self.latest_snapshot = Some(snapshot);
        self.phase = SessionPhase::Live;
    }
}
