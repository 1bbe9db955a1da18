// Streaming aggregation core: session reset, stale-session guard, windowed trend series.
// No I/O here; the worker feeds triggers in and publishes the resulting views.

pub mod metrics;
mod session;
pub mod trajectory;
mod window;

pub use session::SessionState;
pub use trajectory::TrajectorySynthesizer;
pub use window::{ChartValue, WINDOW_CAPACITY, WindowedSeries};

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::models::{
    ChannelStatus, DashboardView, DerivedMetrics, SeriesPoint, SessionId, TaggedSnapshot,
    TrackRequest,
};

/// Display format for point labels (local wall-clock time).
pub const LABEL_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    /// Tagged for a superseded (or never issued) session; dropped.
    Stale,
}

pub struct Aggregator<R = StdRng> {
    session: SessionState,
    downloads: WindowedSeries<u64>,
    rate: WindowedSeries<f64>,
    synthesizer: TrajectorySynthesizer<R>,
    last_session: u64,
    stale_dropped: u64,
}

impl Aggregator<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl Default for Aggregator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Aggregator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            session: SessionState::default(),
            downloads: WindowedSeries::new(),
            rate: WindowedSeries::new(),
            synthesizer: TrajectorySynthesizer::new(rng),
            last_session: 0,
            stale_dropped: 0,
        }
    }

    /// Starts a new tracking session, even for the name already tracked.
    /// Returns the request to forward upstream, or `None` for a blank name (no state change).
    pub fn track(&mut self, name: &str) -> Option<TrackRequest> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.last_session += 1;
        let session = SessionId(self.last_session);
        self.session.restart(name.to_owned(), session);
        self.downloads.clear();
        self.rate.clear();
        Some(TrackRequest {
            session,
            name: name.to_owned(),
        })
    }

    pub fn on_snapshot(&mut self, update: TaggedSnapshot) -> UpdateOutcome {
        let label = chrono::Local::now().format(LABEL_FORMAT).to_string();
        self.on_snapshot_labeled(update, label)
    }

    /// Applies one snapshot: store it, then append one synthesized point per series.
    pub fn on_snapshot_labeled(&mut self, update: TaggedSnapshot, label: String) -> UpdateOutcome {
        if !self.session.is_current(update.session) {
            self.stale_dropped += 1;
            return UpdateOutcome::Stale;
        }
        let TaggedSnapshot { snapshot, .. } = update;

        let downloads = self
            .synthesizer
            .next_downloads(self.downloads.last().map(|p| p.value), &snapshot);
        let rate = self
            .synthesizer
            .next_rate(self.rate.last().map(|p| p.value));
        self.session.record(snapshot);

        self.downloads.append(SeriesPoint {
            label: label.clone(),
            value: downloads,
        });
        self.rate.append(SeriesPoint { label, value: rate });
        UpdateOutcome::Applied
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn downloads(&self) -> &WindowedSeries<u64> {
        &self.downloads
    }

    pub fn rate(&self) -> &WindowedSeries<f64> {
        &self.rate
    }

    pub fn metrics(&self) -> DerivedMetrics {
        metrics::compute(&self.session)
    }

    pub fn stale_dropped(&self) -> u64 {
        self.stale_dropped
    }

    pub fn dashboard_view(&self, channel: ChannelStatus) -> DashboardView {
        DashboardView {
            session: self.session.session_id,
            package: self.session.tracked_name.clone(),
            phase: self.session.phase,
            channel,
            downloads: self.downloads.to_view(),
            rate: self.rate.to_view(),
            metrics: self.metrics(),
            snapshot: self.session.latest_snapshot.clone(),
        }
    }
}
