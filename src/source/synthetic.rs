//! Synthetic price history.
//!
//! No historical provider is integrated: this generator produces a made-up
//! hourly series scattered around a reference value. Output is for chart
//! previews only and is never written to the history store.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::data::HistoryPoint;

/// Maximum relative deviation from the reference value
pub const SPREAD: f64 = 0.03;

/// Longest series the generator will produce
pub const MAX_SYNTHETIC_DAYS: u32 = 365;

/// `days * 24` hourly points ending at `now`, each within ±3% of `reference`.
/// `days` is clamped to `MAX_SYNTHETIC_DAYS`.
pub fn generate_history<R: Rng>(
    reference: f64,
    days: u32,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<HistoryPoint> {
    let hours = i64::from(days.min(MAX_SYNTHETIC_DAYS)) * 24;
    (0..hours)
        .map(|i| {
            let variation = rng.gen_range(-SPREAD..=SPREAD);
            HistoryPoint::new(now - Duration::hours(hours - i), reference * (1.0 + variation))
        })
        .collect()
}
