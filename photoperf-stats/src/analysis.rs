//! Stage Aggregation
//!
//! Turns a set of per-photo records into per-stage timing statistics:
//! - Averages in milliseconds and their share of the average total
//! - Nearest-rank distribution (min, median, p95, max)
//! - Coefficient of variation on the raw nanosecond values
//! - Aggregate throughput in MB/s

use crate::dataset::{PhotoRecord, StageId};
use crate::percentiles::{Percentiles, compute_percentiles};
use crate::variation::{coefficient_of_variation, rank_by_variation};
use crate::{BYTES_PER_MB, NANOS_PER_MS, NANOS_PER_SEC};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Statistics for one stage over the analyzed records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTiming {
    /// Stage these statistics describe
    pub stage: StageId,
    /// Sum over all records, nanoseconds
    pub total_ns: u128,
    /// Mean per record, milliseconds
    pub avg_ms: f64,
    /// `avg_ms` as a percentage of the average total time
    pub percent_of_total: f64,
    /// Per-record distribution, milliseconds
    pub distribution: Percentiles,
    /// Coefficient of variation, percent
    pub cv_percent: f64,
}

/// Result of analyzing a non-empty set of records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Number of records analyzed
    pub record_count: usize,
    /// Sum of `FileSize`, bytes
    pub total_bytes: u128,
    /// Sum of `TotalTime`, nanoseconds
    pub total_time_ns: u128,
    /// Mean `TotalTime` per record, milliseconds
    pub avg_total_ms: f64,
    /// Mean file size, MB
    pub avg_file_size_mb: f64,
    /// MB/s over the whole set, 0 when no time was recorded
    pub throughput_mbps: f64,
    /// Declared stages in report order, then extra stages by name
    pub stages: Vec<StageTiming>,
    /// Distribution of `TotalTime`, milliseconds
    pub total_distribution: Percentiles,
    /// Records whose `TotalTime` is below the sum of their stages
    pub malformed_records: usize,
}

impl AnalysisResult {
    /// Stages ordered by CV, most variable first
    ///
    /// Equal CVs keep report order.
    pub fn variability_ranking(&self) -> Vec<&StageTiming> {
        let mut ranked: Vec<&StageTiming> = self.stages.iter().collect();
        rank_by_variation(&mut ranked, |timing| timing.cv_percent);
        ranked
    }

    /// Timing for one stage
    pub fn stage(&self, stage: &StageId) -> Option<&StageTiming> {
        self.stages.iter().find(|timing| &timing.stage == stage)
    }
}

/// Share of `part` in `whole`, in percent; 0 when `whole` is not positive
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Analyze a set of records
///
/// Accepts anything yielding record references, so both a full dataset and
/// a selection can be passed without copying.
pub fn analyze<'a, I>(records: I) -> Result<AnalysisResult, AnalysisError>
where
    I: IntoIterator<Item = &'a PhotoRecord>,
{
    let records: Vec<&PhotoRecord> = records.into_iter().collect();
    if records.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let n = records.len() as f64;
    // Sums are widened: a few near-maximal durations exceed u64
    let total_time_ns: u128 = records.iter().map(|r| u128::from(r.total_time)).sum();
    let total_bytes: u128 = records.iter().map(|r| u128::from(r.file_size)).sum();
    let avg_total_ms = total_time_ns as f64 / n / NANOS_PER_MS;

    let throughput_mbps = if total_time_ns > 0 {
        (total_bytes as f64 / BYTES_PER_MB) / (total_time_ns as f64 / NANOS_PER_SEC)
    } else {
        0.0
    };

    let extra_stages: BTreeSet<StageId> = records
        .iter()
        .copied()
        .flat_map(PhotoRecord::extra_stages)
        .map(|(name, _)| StageId::Extra(name.to_string()))
        .collect();

    let stages = StageId::declared()
        .chain(extra_stages)
        .map(|stage| {
            let nanos: Vec<u64> = records.iter().map(|r| r.stage_nanos(&stage)).collect();
            stage_timing(stage, &nanos, avg_total_ms)
        })
        .collect();

    let total_ms: Vec<f64> = records
        .iter()
        .map(|r| r.total_time as f64 / NANOS_PER_MS)
        .collect();

    Ok(AnalysisResult {
        record_count: records.len(),
        total_bytes,
        total_time_ns,
        avg_total_ms,
        avg_file_size_mb: total_bytes as f64 / n / BYTES_PER_MB,
        throughput_mbps,
        stages,
        total_distribution: compute_percentiles(&total_ms),
        malformed_records: records.iter().filter(|r| !r.is_well_formed()).count(),
    })
}

fn stage_timing(stage: StageId, nanos: &[u64], avg_total_ms: f64) -> StageTiming {
    let n = nanos.len() as f64;
    let total_ns: u128 = nanos.iter().map(|&v| u128::from(v)).sum();
    let avg_ms = total_ns as f64 / n / NANOS_PER_MS;

    let raw: Vec<f64> = nanos.iter().map(|&v| v as f64).collect();
    let millis: Vec<f64> = raw.iter().map(|v| v / NANOS_PER_MS).collect();

    StageTiming {
        stage,
        total_ns,
        avg_ms,
        percent_of_total: percent_of(avg_ms, avg_total_ms),
        distribution: compute_percentiles(&millis),
        cv_percent: coefficient_of_variation(&raw),
    }
}

/// Errors from aggregation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// The record set was empty
    #[error("no records to analyze")]
    EmptyInput,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Stage;

    fn record(path: &str, total_ms: u64, decode_ms: u64, hash_ms: u64, size: u64) -> PhotoRecord {
        serde_json::from_value(serde_json::json!({
            "FilePath": path,
            "FileSize": size,
            "TotalTime": total_ms * 1_000_000,
            "HashTime": hash_ms * 1_000_000,
            "MetadataTime": 0,
            "ImageDecodeTime": decode_ms * 1_000_000,
            "ThumbnailTime": 0,
            "ColorTime": 0,
            "PerceptualHashTime": 0,
            "InferenceTime": 0,
            "DatabaseTime": 0
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_input() {
        let records: Vec<PhotoRecord> = Vec::new();
        assert_eq!(analyze(&records), Err(AnalysisError::EmptyInput));
    }

    #[test]
    fn test_averages_and_percentages() {
        let records = vec![
            record("a.dng", 100, 40, 10, 1_048_576),
            record("b.dng", 300, 160, 30, 3_145_728),
        ];
        let result = analyze(&records).unwrap();

        assert_eq!(result.record_count, 2);
        assert_eq!(result.total_bytes, 4_194_304);
        assert_eq!(result.total_time_ns, 400_000_000);
        assert!((result.avg_total_ms - 200.0).abs() < 1e-9);
        assert!((result.avg_file_size_mb - 2.0).abs() < 1e-9);
        // 4 MB in 0.4 s
        assert!((result.throughput_mbps - 10.0).abs() < 1e-9);

        let decode = result.stage(&Stage::ImageDecode.into()).unwrap();
        assert!((decode.avg_ms - 100.0).abs() < 1e-9);
        assert!((decode.percent_of_total - 50.0).abs() < 1e-9);
        assert_eq!(decode.total_ns, 200_000_000);

        let hash = result.stage(&Stage::Hash.into()).unwrap();
        assert!((hash.percent_of_total - 10.0).abs() < 1e-9);
        assert_eq!(result.malformed_records, 0);
    }

    #[test]
    fn test_declared_order() {
        let records = vec![record("a.jpg", 10, 1, 1, 1)];
        let result = analyze(&records).unwrap();

        let order: Vec<StageId> = result.stages.iter().map(|s| s.stage.clone()).collect();
        let declared: Vec<StageId> = StageId::declared().collect();
        assert_eq!(order, declared);
    }

    #[test]
    fn test_distribution_one_to_ten() {
        let records: Vec<PhotoRecord> = (1..=10)
            .map(|ms| record(&format!("{ms}.jpg"), 20, ms, 0, 1))
            .collect();
        let result = analyze(&records).unwrap();
        let decode = result.stage(&Stage::ImageDecode.into()).unwrap();

        assert_eq!(decode.distribution.min, 1.0);
        assert_eq!(decode.distribution.median, 6.0);
        assert_eq!(decode.distribution.p95, 10.0);
        assert_eq!(decode.distribution.max, 10.0);
        assert_eq!(result.total_distribution.median, 20.0);
    }

    #[test]
    fn test_zero_total_time() {
        let records = vec![record("a.jpg", 0, 0, 0, 1024)];
        let result = analyze(&records).unwrap();

        assert_eq!(result.throughput_mbps, 0.0);
        assert!(result.stages.iter().all(|s| s.percent_of_total == 0.0));
        assert!(result.stages.iter().all(|s| s.cv_percent == 0.0));
    }

    #[test]
    fn test_variability_ranking() {
        let records = vec![
            record("a.jpg", 100, 10, 5, 1),
            record("b.jpg", 100, 30, 5, 1),
            record("c.jpg", 100, 50, 6, 1),
        ];
        let result = analyze(&records).unwrap();
        let ranked = result.variability_ranking();

        assert_eq!(ranked[0].stage, StageId::Declared(Stage::ImageDecode));
        assert_eq!(ranked[1].stage, StageId::Declared(Stage::Hash));
        // Remaining stages are all zero: declared order is kept
        let tail: Vec<StageId> = ranked[2..].iter().map(|s| s.stage.clone()).collect();
        assert_eq!(
            tail,
            vec![
                StageId::Declared(Stage::Metadata),
                StageId::Declared(Stage::Thumbnail),
                StageId::Declared(Stage::Color),
                StageId::Declared(Stage::PerceptualHash),
                StageId::Declared(Stage::Inference),
                StageId::Declared(Stage::Database),
            ]
        );
    }

    #[test]
    fn test_extra_stage_and_malformed() {
        let mut with_extra = record("a.jpg", 100, 10, 10, 1);
        with_extra
            .extra
            .insert("RawDecodeTime".into(), serde_json::json!(90_000_000u64));
        let records = vec![with_extra, record("b.jpg", 100, 10, 10, 1)];
        let result = analyze(&records).unwrap();

        let raw = result.stage(&StageId::Extra("RawDecode".into())).unwrap();
        assert!((raw.avg_ms - 45.0).abs() < 1e-9);
        assert_eq!(result.stages.last().unwrap().stage.label(), "RawDecode");
        assert_eq!(result.malformed_records, 1);
    }

    #[test]
    fn test_near_maximal_durations() {
        let big = 9_000_000_000_000_000_000u64;
        let huge = |path: &str| -> PhotoRecord {
            let mut r = record(path, 0, 0, 0, u64::MAX);
            r.total_time = big;
            r.image_decode_time = big;
            r
        };
        let records = vec![huge("a.dng"), huge("b.dng"), huge("c.dng")];
        let result = analyze(&records).unwrap();

        assert_eq!(result.total_time_ns, 3 * u128::from(big));
        assert_eq!(result.total_bytes, 3 * u128::from(u64::MAX));
        let decode = result.stage(&Stage::ImageDecode.into()).unwrap();
        assert_eq!(decode.total_ns, 3 * u128::from(big));
        assert!((decode.percent_of_total - 100.0).abs() < 1e-9);
        assert!((result.avg_total_ms - 9e12).abs() < 1.0);
        assert_eq!(result.malformed_records, 0);

        // Two near-maximal stages exceed the total without wrapping
        let mut over = huge("d.dng");
        over.hash_time = big;
        assert_eq!(over.stage_sum_nanos(), 2 * u128::from(big));
        assert!(!over.is_well_formed());
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(5.0, 0.0), 0.0);
        assert!((percent_of(20.0, 150.0) - 13.333333333333334).abs() < 1e-12);
    }
}
