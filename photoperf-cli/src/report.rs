//! Report Building
//!
//! Runs the engine for each command and wraps the result in a [`Report`].
//!
//! ```text
//!  analyze:  Dataset ──select──▶ records ──analyze──▶ AnalysisReport
//!                                   │
//!                                   └── empty ──▶ NoMatches
//!
//!  compare:  summary A ─┐
//!                       ├──compare_summaries──▶ ComparisonReport
//!            summary B ─┘
//!
//!  summary:  Dataset ──▶ breakdown + slowest + failed ──▶ SummaryReport
//! ```

use crate::config::ReportConfig;
use photoperf_report::{
    AnalysisReport, ComparisonReport, PhotoEntry, Report, ReportBody, StageShare, SummaryReport,
};
use photoperf_stats::{
    AnalysisError, Dataset, MatchSpec, analyze, compare_summaries, failed_records, percent_of,
    select, slowest_records,
};

/// Select records and analyze them
///
/// An empty selection is not an error: it produces a `NoMatches` report.
pub fn build_analysis_report(
    dataset: &Dataset,
    selection: MatchSpec,
    source: &str,
) -> Report {
    let records = select(dataset, &selection);
    tracing::debug!(
        matched = records.len(),
        total = dataset.detailed.len(),
        pattern = selection.pattern(),
        "selected records"
    );

    let body = match analyze(records) {
        Ok(result) => {
            if result.malformed_records > 0 {
                tracing::warn!(
                    count = result.malformed_records,
                    "records with TotalTime below the sum of their stage times"
                );
            }
            ReportBody::Analysis(AnalysisReport {
                label: selection.label(),
                selection,
                result,
            })
        }
        Err(AnalysisError::EmptyInput) => ReportBody::NoMatches { selection },
    };

    Report::new(body, vec![source.to_string()])
}

/// Compare the summaries of two datasets
pub fn build_comparison_report(
    baseline: &Dataset,
    candidate: &Dataset,
    baseline_source: &str,
    candidate_source: &str,
) -> anyhow::Result<Report> {
    let result = compare_summaries(&baseline.summary, &candidate.summary)?;

    let body = ReportBody::Comparison(ComparisonReport {
        baseline: baseline_source.to_string(),
        candidate: candidate_source.to_string(),
        result,
    });

    Ok(Report::new(
        body,
        vec![baseline_source.to_string(), candidate_source.to_string()],
    ))
}

/// Summarize one dataset: stage breakdown, slowest and failed photos
pub fn build_summary_report(
    dataset: &Dataset,
    source: &str,
    slowest_count: usize,
    config: &ReportConfig,
) -> Report {
    let summary = &dataset.summary;

    let breakdown = summary
        .stage_ids()
        .into_iter()
        .filter_map(|stage| {
            let avg_ms = summary.stage_avg_ms(&stage)?;
            Some(StageShare {
                percent: percent_of(avg_ms, summary.avg_total_ms),
                avg_ms,
                stage,
            })
        })
        .collect();

    let slowest = slowest_records(&dataset.detailed, slowest_count)
        .into_iter()
        .map(PhotoEntry::from)
        .collect();

    let failed_all = failed_records(&dataset.detailed);
    let failed_total = failed_all.len();
    let failed = failed_all
        .into_iter()
        .take(config.failed_limit)
        .map(PhotoEntry::from)
        .collect();

    let body = ReportBody::Summary(SummaryReport {
        summary: summary.clone(),
        breakdown,
        slowest,
        failed,
        failed_total,
    });

    Report::new(body, vec![source.to_string()])
}
