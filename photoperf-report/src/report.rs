//! Report Data Structures

use chrono::{DateTime, Utc};
use photoperf_stats::{
    AnalysisResult, ComparisonResult, MatchSpec, PerfSummary, PhotoRecord, StageId,
};
use serde::{Deserialize, Serialize};

/// Version of the JSON report layout
pub const SCHEMA_VERSION: u32 = 1;

/// Complete report for one command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Provenance of the report
    pub meta: ReportMeta,
    /// Command output
    pub body: ReportBody,
}

impl Report {
    /// Wrap a body with fresh metadata
    pub fn new(body: ReportBody, sources: Vec<String>) -> Self {
        Self {
            meta: ReportMeta::new(sources),
            body,
        }
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Layout version, [`SCHEMA_VERSION`]
    pub schema_version: u32,
    /// Tool version that produced the report
    pub version: String,
    /// When the report was generated
    pub timestamp: DateTime<Utc>,
    /// Telemetry files the report was built from
    pub sources: Vec<String>,
}

impl ReportMeta {
    /// Metadata stamped with the current time
    pub fn new(sources: Vec<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            sources,
        }
    }
}

/// What the report contains
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportBody {
    /// Per-stage analysis of a selection
    Analysis(AnalysisReport),
    /// The selection matched nothing; no statistics were computed
    NoMatches {
        /// The selection that came back empty
        selection: MatchSpec,
    },
    /// Baseline vs candidate summaries
    Comparison(ComparisonReport),
    /// One run's own summary
    Summary(SummaryReport),
}

/// Analysis of the records matching a selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// How records were selected
    pub selection: MatchSpec,
    /// Heading, e.g. `.DNG files`
    pub label: String,
    /// Statistics over the selection
    pub result: AnalysisResult,
}

/// Comparison between two telemetry files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Baseline file
    pub baseline: String,
    /// Candidate file
    pub candidate: String,
    /// Stage-by-stage deltas
    pub result: ComparisonResult,
}

/// One stage's share of a summary's average total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageShare {
    /// Stage
    pub stage: StageId,
    /// `Avg<Stage>Ms` from the summary
    pub avg_ms: f64,
    /// Share of `AvgTotalMs`, percent
    pub percent: f64,
}

/// A photo listed in a summary report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoEntry {
    /// Final path component
    pub file_name: String,
    /// Full captured path
    pub file_path: String,
    /// Whole milliseconds, truncated
    pub total_ms: u64,
    /// Failure message, for failed photos only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&PhotoRecord> for PhotoEntry {
    fn from(record: &PhotoRecord) -> Self {
        Self {
            file_name: record.file_name().to_string(),
            file_path: record.file_path.clone(),
            total_ms: record.total_time / 1_000_000,
            error: record.is_failed().then(|| record.error.clone()),
        }
    }
}

/// A run's summary with its stage breakdown and notable photos
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    /// The run's own summary
    pub summary: PerfSummary,
    /// Every stage of the summary, in report order
    pub breakdown: Vec<StageShare>,
    /// Slowest processed photos, slowest first
    pub slowest: Vec<PhotoEntry>,
    /// Failed photos, possibly truncated
    pub failed: Vec<PhotoEntry>,
    /// Number of failed photos before truncation
    pub failed_total: usize,
}
