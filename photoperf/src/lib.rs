#![warn(missing_docs)]
//! # Photoperf
//!
//! Statistical analysis of photo-ingestion performance telemetry.
//!
//! A capture run writes one JSON document with a precomputed `summary` and
//! a per-photo `detailed` list. Photoperf answers three questions about it:
//! - **Where does the time go?** Per-stage averages, shares of total time,
//!   nearest-rank percentiles and coefficient of variation for the photos
//!   matching an extension or path pattern
//! - **Did it get faster?** Stage-by-stage comparison of two runs' summaries,
//!   in percentage points and milliseconds
//! - **What stood out?** A run's stage breakdown with its slowest and failed
//!   photos
//!
//! ## Quick Start
//!
//! ```no_run
//! use photoperf::{Dataset, MatchSpec, analyze, select};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dataset = Dataset::load("perfstats.json")?;
//! let dng = select(&dataset, &MatchSpec::new("DNG", false));
//! let result = analyze(dng)?;
//!
//! for timing in result.variability_ranking() {
//!     println!("{:<18} {:>6.1}% CV", timing.stage, timing.cv_percent);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Comparing Runs
//!
//! ```no_run
//! use photoperf::{Dataset, compare_summaries};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let small = Dataset::load("small.json")?;
//! let large = Dataset::load("large.json")?;
//! let cmp = compare_summaries(&small.summary, &large.summary)?;
//! println!("total: {:+.1}%", cmp.total.relative_change);
//! # Ok(())
//! # }
//! ```

// Re-export the engine
pub use photoperf_stats::{
    AnalysisError, AnalysisResult, ComparisonError, ComparisonResult, Dataset, DatasetError,
    MatchSpec, Percentiles, PerfSummary, PhotoRecord, RunScale, Side, Stage, StageDelta, StageId,
    StageTiming, TimingDelta, analyze, coefficient_of_variation, compare_summaries,
    compute_percentile, compute_percentiles, failed_records, percent_of, rank_by_variation,
    select, select_records, slowest_records,
};

// Re-export reports
pub use photoperf_report::{
    OutputFormat, Report, ReportBody, generate_json_report, render_bar, truncate_name,
};

/// Run the photoperf CLI.
///
/// ```ignore
/// fn main() {
///     photoperf::run().unwrap();
/// }
/// ```
pub use photoperf_cli::run;
