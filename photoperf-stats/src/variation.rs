//! Variability
//!
//! Coefficient of variation over raw nanosecond samples, and the ranking
//! used by the variability table.

/// Population coefficient of variation, in percent
///
/// Uses divisor `n`. Returns 0 for fewer than two samples or a zero mean.
pub fn coefficient_of_variation(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }

    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return 0.0;
    }

    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (variance.sqrt() / mean) * 100.0
}

/// Order items by CV, highest first
///
/// The sort is stable: items with equal CV keep their incoming order.
pub fn rank_by_variation<T>(items: &mut [T], cv: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| {
        cv(b)
            .partial_cmp(&cv(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
