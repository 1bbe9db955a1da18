// Domain models

pub mod lenient;
mod registry;
mod series;
mod snapshot;
mod view;

pub use registry::{
    Bugs, Contributors, Dist, License, PackageDocument, Person, VersionEntry, VersionHistory,
    VersionSummary,
};
pub use series::{ChartBounds, SeriesPoint, SeriesView};
pub use snapshot::{Maintainer, SessionId, Snapshot, TaggedSnapshot, TrackRequest};
pub use view::{Breakdown, ChannelStatus, DashboardView, DerivedMetrics, SessionPhase};
