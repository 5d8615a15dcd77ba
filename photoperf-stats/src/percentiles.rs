//! Percentile Computation
//!
//! Nearest-rank percentiles: the result is always one of the samples.
//! No interpolation, so reports are reproducible to the digit.

use serde::{Deserialize, Serialize};

/// Distribution of one stage over a set of records
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    /// Smallest sample
    pub min: f64,
    /// 50th percentile
    pub median: f64,
    /// 95th percentile
    pub p95: f64,
    /// Largest sample
    pub max: f64,
}

/// Pick a percentile from samples already sorted ascending
///
/// `percentile` is a fraction in `[0, 1]`. The index is `floor(n * p)`,
/// clamped to the valid range, so `0.0` yields the minimum and `1.0` the
/// maximum.
///
/// # Examples
///
/// ```
/// # use photoperf_stats::compute_percentile;
/// let sorted: Vec<f64> = (1..=10).map(f64::from).collect();
/// assert_eq!(compute_percentile(&sorted, 0.5), 6.0);
/// assert_eq!(compute_percentile(&sorted, 0.95), 10.0);
/// ```
pub fn compute_percentile(sorted: &[f64], percentile: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let n = sorted.len();
    let rank = (n as f64 * percentile).floor();
    let idx = if rank <= 0.0 {
        0
    } else {
        (rank as usize).min(n - 1)
    };

    sorted[idx]
}

/// Compute min, median, p95 and max from unsorted samples
pub fn compute_percentiles(samples: &[f64]) -> Percentiles {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    Percentiles {
        min: compute_percentile(&sorted, 0.0),
        median: compute_percentile(&sorted, 0.5),
        p95: compute_percentile(&sorted, 0.95),
        max: compute_percentile(&sorted, 1.0),
    }
}
