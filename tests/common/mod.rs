// Shared test helpers
#![allow(dead_code)]

use rand::SeedableRng;
use rand::rngs::StdRng;
use statpac::aggregator::Aggregator;
use statpac::models::*;

pub fn snapshot(estimated_downloads: u64) -> Snapshot {
    Snapshot {
        estimated_downloads,
        ..Snapshot::default()
    }
}

pub fn tagged(session: SessionId, estimated_downloads: u64) -> TaggedSnapshot {
    TaggedSnapshot {
        session,
        snapshot: snapshot(estimated_downloads),
    }
}

pub fn seeded_aggregator(seed: u64) -> Aggregator<StdRng> {
    Aggregator::with_rng(StdRng::seed_from_u64(seed))
}

/// Polls `check` every 10ms for up to 2s.
pub async fn eventually<F: FnMut() -> bool>(mut check: F) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    check()
}
