//! Summary Comparison
//!
//! Compares two runs through their precomputed summaries only, so captures
//! of very different sizes (or without per-photo records) can be compared.
//!
//! For every stage:
//! - share of the average total, and the change in percentage points
//! - absolute change in milliseconds
//! - relative change in percent against the baseline

use crate::analysis::percent_of;
use crate::dataset::{PerfSummary, StageId};
use crate::BYTES_PER_MB;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which side of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The reference run
    Baseline,
    /// The run being judged
    Candidate,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Baseline => write!(f, "baseline"),
            Side::Candidate => write!(f, "candidate"),
        }
    }
}

/// Size and speed of one run, straight from its summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunScale {
    /// `ProcessedPhotos`
    pub processed_photos: u64,
    /// `TotalBytes` in MB
    pub total_mb: f64,
    /// `AvgThroughputMBps`
    pub throughput_mbps: f64,
}

impl From<&PerfSummary> for RunScale {
    fn from(summary: &PerfSummary) -> Self {
        Self {
            processed_photos: summary.processed_photos,
            total_mb: summary.total_bytes as f64 / BYTES_PER_MB,
            throughput_mbps: summary.avg_throughput_mbps,
        }
    }
}

/// Change of one timing between baseline and candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingDelta {
    /// Baseline value, milliseconds
    pub baseline_ms: f64,
    /// Candidate value, milliseconds
    pub candidate_ms: f64,
    /// `candidate_ms - baseline_ms`
    pub absolute_change_ms: f64,
    /// `(candidate / baseline - 1) * 100`, 0 when the baseline is 0
    pub relative_change: f64,
}

impl TimingDelta {
    fn new(baseline_ms: f64, candidate_ms: f64) -> Self {
        // A zero baseline reports no change even when the candidate is
        // non-zero; there is no meaningful ratio to give.
        let relative_change = if baseline_ms > 0.0 {
            (candidate_ms / baseline_ms - 1.0) * 100.0
        } else {
            0.0
        };

        Self {
            baseline_ms,
            candidate_ms,
            absolute_change_ms: candidate_ms - baseline_ms,
            relative_change,
        }
    }
}

/// Comparison of one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDelta {
    /// Stage compared
    pub stage: StageId,
    /// Share of the baseline's average total, percent
    pub baseline_percent: f64,
    /// Share of the candidate's average total, percent
    pub candidate_percent: f64,
    /// `candidate_percent - baseline_percent`, percentage points
    pub percent_point_change: f64,
    /// Change of the stage's average, milliseconds
    pub timing: TimingDelta,
}

/// Result of comparing two summaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Scale of the baseline run
    pub baseline: RunScale,
    /// Scale of the candidate run
    pub candidate: RunScale,
    /// Declared stages in report order, then extra stages by name
    pub stages: Vec<StageDelta>,
    /// Change of the average total time per photo
    pub total: TimingDelta,
}

impl ComparisonResult {
    /// Delta for one stage
    pub fn stage(&self, stage: &StageId) -> Option<&StageDelta> {
        self.stages.iter().find(|delta| &delta.stage == stage)
    }
}

/// Compare a baseline summary against a candidate summary
///
/// Every stage present in either summary must be present in both.
pub fn compare_summaries(
    baseline: &PerfSummary,
    candidate: &PerfSummary,
) -> Result<ComparisonResult, ComparisonError> {
    let stages: BTreeSet<StageId> = baseline
        .stage_ids()
        .into_iter()
        .chain(candidate.stage_ids())
        .collect();

    let stages = stages
        .into_iter()
        .map(|stage| {
            let baseline_ms = baseline.stage_avg_ms(&stage).ok_or_else(|| {
                ComparisonError::MissingStage {
                    stage: stage.clone(),
                    side: Side::Baseline,
                }
            })?;
            let candidate_ms = candidate.stage_avg_ms(&stage).ok_or_else(|| {
                ComparisonError::MissingStage {
                    stage: stage.clone(),
                    side: Side::Candidate,
                }
            })?;

            let baseline_percent = percent_of(baseline_ms, baseline.avg_total_ms);
            let candidate_percent = percent_of(candidate_ms, candidate.avg_total_ms);

            Ok(StageDelta {
                stage,
                baseline_percent,
                candidate_percent,
                percent_point_change: candidate_percent - baseline_percent,
                timing: TimingDelta::new(baseline_ms, candidate_ms),
            })
        })
        .collect::<Result<Vec<_>, ComparisonError>>()?;

    Ok(ComparisonResult {
        baseline: RunScale::from(baseline),
        candidate: RunScale::from(candidate),
        stages,
        total: TimingDelta::new(baseline.avg_total_ms, candidate.avg_total_ms),
    })
}

/// Errors from comparison operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComparisonError {
    /// A stage exists in only one of the two summaries
    #[error("stage `{stage}` is missing from the {side} summary")]
    MissingStage {
        /// Stage without a counterpart
        stage: StageId,
        /// Summary that lacks it
        side: Side,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Stage;

    fn summary(total_ms: f64, hash_ms: f64) -> PerfSummary {
        serde_json::from_value(serde_json::json!({
            "ProcessedPhotos": 10,
            "TotalBytes": 10_485_760,
            "AvgThroughputMBps": 4.0,
            "AvgTotalMs": total_ms,
            "AvgHashMs": hash_ms,
            "AvgMetadataMs": 0.0,
            "AvgImageDecodeMs": 0.0,
            "AvgThumbnailMs": 0.0,
            "AvgColorMs": 0.0,
            "AvgPerceptualHashMs": 0.0,
            "AvgInferenceMs": 0.0,
            "AvgDatabaseMs": 0.0
        }))
        .unwrap()
    }

    #[test]
    fn test_hash_example() {
        let a = summary(100.0, 10.0);
        let b = summary(150.0, 20.0);
        let result = compare_summaries(&a, &b).unwrap();
        let hash = result.stage(&Stage::Hash.into()).unwrap();

        assert!((hash.baseline_percent - 10.0).abs() < 1e-9);
        assert!((hash.candidate_percent - 13.333333333333334).abs() < 1e-9);
        assert!((hash.percent_point_change - 3.3333333333333335).abs() < 1e-9);
        assert!((hash.timing.absolute_change_ms - 10.0).abs() < 1e-9);
        assert!((hash.timing.relative_change - 100.0).abs() < 1e-9);

        assert!((result.total.absolute_change_ms - 50.0).abs() < 1e-9);
        assert!((result.total.relative_change - 50.0).abs() < 1e-9);
        assert!((result.baseline.total_mb - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_baseline_stage() {
        let mut a = summary(100.0, 10.0);
        let mut b = summary(100.0, 10.0);
        a.avg_inference_ms = 0.0;
        b.avg_inference_ms = 25.0;

        let result = compare_summaries(&a, &b).unwrap();
        let inference = result.stage(&Stage::Inference.into()).unwrap();

        assert_eq!(inference.timing.relative_change, 0.0);
        assert!((inference.timing.absolute_change_ms - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_total_guard() {
        let a = summary(0.0, 0.0);
        let b = summary(100.0, 10.0);
        let result = compare_summaries(&a, &b).unwrap();

        assert_eq!(result.total.relative_change, 0.0);
        assert!(result.stages.iter().all(|s| s.baseline_percent == 0.0));
    }

    #[test]
    fn test_symmetry() {
        let a = summary(120.0, 17.0);
        let b = summary(310.0, 45.5);
        let ab = compare_summaries(&a, &b).unwrap();
        let ba = compare_summaries(&b, &a).unwrap();

        for (x, y) in ab.stages.iter().zip(&ba.stages) {
            assert_eq!(x.stage, y.stage);
            assert_eq!(x.percent_point_change, -y.percent_point_change);
            assert_eq!(x.timing.absolute_change_ms, -y.timing.absolute_change_ms);
        }
        assert_eq!(ab.total.absolute_change_ms, -ba.total.absolute_change_ms);
    }

    #[test]
    fn test_declared_order() {
        let result = compare_summaries(&summary(1.0, 0.5), &summary(1.0, 0.5)).unwrap();
        let order: Vec<StageId> = result.stages.iter().map(|s| s.stage.clone()).collect();
        assert_eq!(order, StageId::declared().collect::<Vec<_>>());
    }

    #[test]
    fn test_missing_extra_stage() {
        let mut a = summary(100.0, 10.0);
        let b = summary(100.0, 10.0);
        a.extra
            .insert("AvgRawDecodeMs".into(), serde_json::json!(12.0));

        let err = compare_summaries(&a, &b).unwrap_err();
        assert_eq!(
            err,
            ComparisonError::MissingStage {
                stage: StageId::Extra("RawDecode".into()),
                side: Side::Candidate,
            }
        );
        assert_eq!(
            err.to_string(),
            "stage `RawDecode` is missing from the candidate summary"
        );

        let err = compare_summaries(&b, &a).unwrap_err();
        assert!(matches!(
            err,
            ComparisonError::MissingStage {
                side: Side::Baseline,
                ..
            }
        ));
    }

    #[test]
    fn test_shared_extra_stage() {
        let mut a = summary(100.0, 10.0);
        let mut b = summary(100.0, 10.0);
        a.extra.insert("AvgRawDecodeMs".into(), serde_json::json!(12.0));
        b.extra.insert("AvgRawDecodeMs".into(), serde_json::json!(6.0));

        let result = compare_summaries(&a, &b).unwrap();
        let raw = result.stage(&StageId::Extra("RawDecode".into())).unwrap();
        assert!((raw.timing.relative_change + 50.0).abs() < 1e-9);
        assert_eq!(result.stages.len(), 9);
    }
}
