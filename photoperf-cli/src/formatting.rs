//! Output Formatting
//!
//! Human-readable output formatting for photoperf reports.
//!
//! Generates fixed-width terminal tables for:
//! - Selection analysis (timings, distribution, variability)
//! - Baseline vs candidate comparison
//! - Run summary with pipeline bars, slowest and failed photos

use crate::config::ReportConfig;
use photoperf_report::{
    AnalysisReport, ComparisonReport, Report, ReportBody, SummaryReport, bytes_to_mb, render_bar,
    truncate_name,
};
use photoperf_stats::{Stage, StageId};
use std::borrow::Cow;

/// Message printed when a selection matches nothing
pub const NO_MATCHES_MESSAGE: &str = "No photos found matching pattern!";

const WIDTH: usize = 70;

/// Format a report for human-readable terminal display
///
/// # Arguments
/// * `report` - Report for any command
/// * `config` - Layout settings (bar and file name widths)
///
/// # Returns
/// Formatted string suitable for terminal output
pub fn format_human_output(report: &Report, config: &ReportConfig) -> String {
    match &report.body {
        ReportBody::Analysis(analysis) => format_analysis(analysis),
        ReportBody::NoMatches { .. } => format!("{}\n", NO_MATCHES_MESSAGE),
        ReportBody::Comparison(comparison) => format_comparison(comparison),
        ReportBody::Summary(summary) => format_summary(summary, config),
    }
}

fn rule(output: &mut String, c: char) {
    output.push_str(&c.to_string().repeat(WIDTH));
    output.push('\n');
}

fn format_analysis(report: &AnalysisReport) -> String {
    let r = &report.result;
    let mut output = String::new();

    output.push_str(&format!(
        "{} ANALYSIS ({} photos)\n",
        report.label.to_uppercase(),
        r.record_count
    ));
    rule(&mut output, '=');
    output.push('\n');

    output.push_str(&format!("Count:              {} photos\n", r.record_count));
    output.push_str(&format!(
        "Total Size:         {:.1} MB\n",
        bytes_to_mb(r.total_bytes)
    ));
    output.push_str(&format!("Avg File Size:      {:.1} MB\n", r.avg_file_size_mb));
    output.push_str(&format!("Throughput:         {:.2} MB/s\n", r.throughput_mbps));
    output.push('\n');

    output.push_str("AVERAGE TIMINGS PER PHOTO:\n");
    rule(&mut output, '-');
    output.push_str(&format!(
        "{:<18} {:>12} {:>12}\n",
        "Stage", "Time (ms)", "% of Total"
    ));
    rule(&mut output, '-');
    for timing in &r.stages {
        output.push_str(&format!(
            "{:<18} {:>11.2}ms {:>11.2}%\n",
            timing.stage.label(),
            timing.avg_ms,
            timing.percent_of_total
        ));
    }
    output.push_str(&format!(
        "{:<18} {:>11.2}ms {:>12}\n",
        "TOTAL", r.avg_total_ms, "100.00%"
    ));
    output.push('\n');

    output.push_str("DISTRIBUTION STATS:\n");
    rule(&mut output, '-');
    output.push_str(&format!(
        "{:<18} {:>10} {:>10} {:>10} {:>10}\n",
        "Stage", "Min", "Median", "P95", "Max"
    ));
    rule(&mut output, '-');
    let rows = r
        .stages
        .iter()
        .map(|timing| (timing.stage.label(), &timing.distribution))
        .chain(std::iter::once(("TOTAL".into(), &r.total_distribution)));
    for (label, d) in rows {
        output.push_str(&format!(
            "{:<18} {:>8.0}ms {:>8.0}ms {:>8.0}ms {:>8.0}ms\n",
            label, d.min, d.median, d.p95, d.max
        ));
    }
    output.push('\n');

    output.push_str("VARIABILITY (Coefficient of Variation %):\n");
    rule(&mut output, '-');
    for timing in r.variability_ranking() {
        output.push_str(&format!(
            "{:<18} {:>10.1}% CV\n",
            timing.stage.label(),
            timing.cv_percent
        ));
    }

    if r.malformed_records > 0 {
        output.push_str(&format!(
            "\nNote: {} record(s) have TotalTime below the sum of their stage times\n",
            r.malformed_records
        ));
    }

    output
}

fn format_comparison(report: &ComparisonReport) -> String {
    let r = &report.result;
    let mut output = String::new();

    output.push_str("PERFORMANCE COMPARISON: Baseline vs Candidate\n");
    rule(&mut output, '=');
    output.push_str(&format!("Baseline:  {}\n", report.baseline));
    output.push_str(&format!("Candidate: {}\n", report.candidate));
    output.push('\n');

    output.push_str(&format!(
        "Dataset Size:          {:>8} photos  vs  {:>8} photos\n",
        r.baseline.processed_photos, r.candidate.processed_photos
    ));
    output.push_str(&format!(
        "Total Data:            {:>8.1} MB     vs  {:>8.1} MB\n",
        r.baseline.total_mb, r.candidate.total_mb
    ));
    output.push_str(&format!(
        "Throughput:            {:>8.2} MB/s   vs  {:>8.2} MB/s\n",
        r.baseline.throughput_mbps, r.candidate.throughput_mbps
    ));
    output.push('\n');

    output.push_str("PIPELINE STAGE BREAKDOWN (% of total time):\n");
    rule(&mut output, '-');
    output.push_str(&format!(
        "{:<18} {:>12} {:>12} {:>10}\n",
        "Stage", "Baseline %", "Candidate %", "Δ"
    ));
    rule(&mut output, '-');
    for delta in &r.stages {
        output.push_str(&format!(
            "{:<18} {:>11.2}% {:>11.2}% {:>+9.2}%\n",
            delta.stage.label(),
            delta.baseline_percent,
            delta.candidate_percent,
            delta.percent_point_change
        ));
    }
    output.push('\n');

    output.push_str("ABSOLUTE TIMINGS (milliseconds per photo):\n");
    rule(&mut output, '-');
    output.push_str(&format!(
        "{:<18} {:>12} {:>12} {:>10} {:>10}\n",
        "Stage", "Baseline", "Candidate", "Δ", "% Change"
    ));
    rule(&mut output, '-');
    let rows = r
        .stages
        .iter()
        .map(|delta| (delta.stage.label(), &delta.timing));
    for (label, t) in rows {
        output.push_str(&timing_row(&label, t));
    }
    output.push('\n');
    output.push_str(&timing_row("Total per photo", &r.total));

    output
}

/// Label in the summary's averages section
fn average_label(stage: &StageId) -> Cow<'_, str> {
    match stage {
        StageId::Declared(Stage::Color) => Cow::Borrowed("Color Extraction"),
        other => other.label(),
    }
}

/// Short label for the breakdown bars
fn bar_label(stage: &StageId) -> Cow<'_, str> {
    match stage {
        StageId::Declared(Stage::ImageDecode) => Cow::Borrowed("Decode"),
        StageId::Declared(Stage::Color) => Cow::Borrowed("Color"),
        StageId::Declared(Stage::PerceptualHash) => Cow::Borrowed("PHash"),
        other => other.label(),
    }
}

fn timing_row(label: &str, t: &photoperf_stats::TimingDelta) -> String {
    format!(
        "{:<18} {:>10.2}ms {:>10.2}ms {:>+8.2}ms {:>+9.1}%\n",
        label, t.baseline_ms, t.candidate_ms, t.absolute_change_ms, t.relative_change
    )
}

fn format_summary(report: &SummaryReport, config: &ReportConfig) -> String {
    let s = &report.summary;
    let mut output = String::new();

    output.push('\n');
    rule(&mut output, '━');
    output.push_str("PERFORMANCE STATISTICS\n");
    rule(&mut output, '━');
    output.push('\n');

    output.push_str("SUMMARY:\n");
    output.push_str(&format!("  Total Photos:      {}\n", s.total_photos));
    output.push_str(&format!("  Processed:         {}\n", s.processed_photos));
    output.push_str(&format!("  Skipped:           {} (unchanged)\n", s.skipped_photos));
    output.push_str(&format!("  Updated:           {} (re-indexed)\n", s.updated_photos));
    output.push_str(&format!("  Failed:            {}\n", s.failed_photos));
    output.push_str(&format!(
        "  Total Data:        {:.2} MB\n",
        bytes_to_mb(s.total_bytes)
    ));
    output.push_str(&format!(
        "  Throughput:        {:.2} MB/s\n",
        s.avg_throughput_mbps
    ));
    output.push('\n');

    output.push_str("AVERAGE TIMINGS PER PHOTO (processed only):\n");
    output.push_str(&format!(
        "  {:<19}{:>8.2} ms  (100.00%)\n",
        "Total:", s.avg_total_ms
    ));
    for share in &report.breakdown {
        output.push_str(&format!(
            "  {:<19}{:>8.2} ms  ({:>6.2}%)\n",
            format!("{}:", average_label(&share.stage)),
            share.avg_ms,
            share.percent
        ));
    }
    output.push('\n');

    output.push_str("PIPELINE BREAKDOWN (by time %):\n");
    for share in &report.breakdown {
        let percent = share.percent.clamp(0.0, 100.0);
        output.push_str(&format!(
            "  {:<12} [{}] {:>6.2}%\n",
            bar_label(&share.stage),
            render_bar(percent, config.bar_width),
            percent
        ));
    }
    output.push('\n');

    let name_width = config.filename_width;
    if !report.slowest.is_empty() {
        output.push_str(&format!("TOP {} SLOWEST PHOTOS:\n", report.slowest.len()));
        for (i, photo) in report.slowest.iter().enumerate() {
            output.push_str(&format!(
                "  {:>2}. {:<width$}  {:>8.2} ms\n",
                i + 1,
                truncate_name(&photo.file_name, name_width),
                photo.total_ms as f64,
                width = name_width
            ));
        }
        output.push('\n');
    }

    if report.failed_total > 0 {
        output.push_str("FAILED FILES:\n");
        for photo in &report.failed {
            output.push_str(&format!(
                "  - {:<width$}  {}\n",
                photo.file_name,
                photo.error.as_deref().unwrap_or_default(),
                width = name_width
            ));
        }
        let hidden = report.failed_total.saturating_sub(report.failed.len());
        if hidden > 0 {
            output.push_str(&format!("  ... and {} more\n", hidden));
        }
        output.push('\n');
    }

    rule(&mut output, '━');
    output
}
