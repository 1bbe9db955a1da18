// Point-in-time quantities recomputed from the session, outside any window.

use super::session::SessionState;
use crate::models::{Breakdown, DerivedMetrics, Snapshot};

pub fn compute(session: &SessionState) -> DerivedMetrics {
    let base = session.base_downloads.unwrap_or(0);
    let incremental_downloads = match &session.latest_snapshot {
        Some(snapshot) if base > 0 => signed_delta(snapshot.estimated_downloads, base),
        _ => 0,
    };
    DerivedMetrics {
        base_downloads: base,
        incremental_downloads,
        breakdown: session
            .latest_snapshot
            .as_ref()
            .map(breakdown)
            .unwrap_or_default(),
    }
}

/// `current - base`, saturating at the `i64` range.
fn signed_delta(current: u64, base: u64) -> i64 {
    let delta = i128::from(current) - i128::from(base);
    i64::try_from(delta).unwrap_or(if delta < 0 { i64::MIN } else { i64::MAX })
}

/// Package scores with absent fields read as 0.
pub fn breakdown(snapshot: &Snapshot) -> Breakdown {
    Breakdown {
        maintenance: snapshot.maintenance.unwrap_or(0.0),
        popularity: snapshot.popularity.unwrap_or(0.0),
        quality: snapshot.quality.unwrap_or(0.0),
    }
}
