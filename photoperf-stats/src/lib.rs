#![warn(missing_docs)]
//! Photoperf Statistical Engine
//!
//! Analyzes photo-ingestion telemetry:
//! - Record selection by file extension or path substring
//! - Per-stage averages and share of total time
//! - Nearest-rank percentiles (min, median, p95, max)
//! - Coefficient of variation and variability ranking
//! - Summary-to-summary comparison across runs of any size
//!
//! Everything here is a pure function over loaded data; the only I/O is
//! [`Dataset::load`].

mod analysis;
mod comparison;
mod dataset;
mod percentiles;
mod selector;
mod variation;

pub use analysis::{AnalysisError, AnalysisResult, StageTiming, analyze, percent_of};
pub use comparison::{
    ComparisonError, ComparisonResult, RunScale, Side, StageDelta, TimingDelta, compare_summaries,
};
pub use dataset::{Dataset, DatasetError, PerfSummary, PhotoRecord, Stage, StageId};
pub use percentiles::{Percentiles, compute_percentile, compute_percentiles};
pub use selector::{MatchSpec, failed_records, select, select_records, slowest_records};
pub use variation::{coefficient_of_variation, rank_by_variation};

/// Nanoseconds per millisecond
pub const NANOS_PER_MS: f64 = 1_000_000.0;

/// Nanoseconds per second
pub const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Bytes per megabyte (binary)
pub const BYTES_PER_MB: f64 = 1_048_576.0;
