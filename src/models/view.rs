// Read-only state handed to the presentation layer

use serde::{Deserialize, Serialize};

use super::series::SeriesView;
use super::snapshot::{SessionId, Snapshot};

/// Where the current tracking session stands. `Awaiting` has no timeout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    #[default]
    Idle,
    Awaiting,
    Live,
}

/// Upstream channel health, shown separately from session data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub maintenance: f64,
    pub popularity: f64,
    pub quality: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    /// 0 until the first snapshot of the session arrives.
    pub base_downloads: u64,
    /// May go negative when upstream reports a decreasing estimate.
    pub incremental_downloads: i64,
    pub breakdown: Breakdown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub session: Option<SessionId>,
    pub package: Option<String>,
    pub phase: SessionPhase,
    pub channel: ChannelStatus,
    pub downloads: SeriesView<u64>,
    pub rate: SeriesView<f64>,
    pub metrics: DerivedMetrics,
    pub snapshot: Option<Snapshot>,
}
