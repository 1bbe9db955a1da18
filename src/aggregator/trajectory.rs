// Synthetic trend lines between upstream pushes.
// Downloads: anchored at the true estimate, then a strictly increasing step of 10..=14.
// Rate: AR(1) with U(0,3) noise and 0.9 decay; stationary mean 1.5 / (1 - 0.9) = 15.

use rand::Rng;

use crate::models::Snapshot;

pub const DOWNLOAD_STEP: u64 = 10;
pub const DOWNLOAD_JITTER_MAX: u64 = 4;
pub const RATE_NOISE_MAX: f64 = 3.0;
pub const RATE_DECAY: f64 = 0.9;

pub struct TrajectorySynthesizer<R> {
    rng: R,
}

impl<R: Rng> TrajectorySynthesizer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Next downloads value given the last one in the window (`None` at session start).
    pub fn next_downloads(&mut self, previous: Option<u64>, snapshot: &Snapshot) -> u64 {
        match previous {
            None => snapshot.estimated_downloads,
            Some(last) => {
                let jitter = self.rng.random_range(0..=DOWNLOAD_JITTER_MAX);
                last.saturating_add(DOWNLOAD_STEP + jitter)
            }
        }
    }

    /// Next rate value, rounded to two decimals. Never negative.
    pub fn next_rate(&mut self, previous: Option<f64>) -> f64 {
        let noise = self.rng.random_range(0.0..RATE_NOISE_MAX);
        let rate = noise + RATE_DECAY * previous.unwrap_or(0.0);
        round_cents(rate)
    }
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
