#![warn(missing_docs)]
//! Photoperf Report - Report Model and Output Formats
//!
//! Generates:
//! - JSON (machine-readable, with run metadata)
//! - Human-readable terminal tables (rendered by the CLI from this model)

mod format;
mod json;
mod report;

pub use format::{bytes_to_mb, render_bar, truncate_name};
pub use json::generate_json_report;
pub use report::{
    AnalysisReport, ComparisonReport, PhotoEntry, Report, ReportBody, ReportMeta, SCHEMA_VERSION,
    StageShare, SummaryReport,
};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON with report metadata
    Json,
    /// Human-readable terminal output
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}
