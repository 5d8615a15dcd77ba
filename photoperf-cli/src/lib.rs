#![warn(missing_docs)]
//! Photoperf CLI Library
//!
//! Command-line front end for the photoperf engine: loads telemetry files,
//! runs the requested analysis and renders the report.
//!
//! ```text
//! photoperf analyze  perfstats.json DNG
//! photoperf analyze  perfstats.json /Leica/ --pattern
//! photoperf compare  small.json large.json
//! photoperf summary  perfstats.json --top 5
//! ```

mod config;
mod formatting;
mod report;

pub use config::*;
pub use formatting::{NO_MATCHES_MESSAGE, format_human_output};
pub use report::{build_analysis_report, build_comparison_report, build_summary_report};

use anyhow::Context;
use clap::{Parser, Subcommand};
use photoperf_report::{OutputFormat, Report, generate_json_report};
use photoperf_stats::{Dataset, MatchSpec};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Photoperf CLI arguments
#[derive(Parser, Debug)]
#[command(name = "photoperf")]
#[command(
    author,
    version,
    about = "photoperf - analyze and compare photo-ingestion performance telemetry"
)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: human, json (defaults to photoperf.toml, then human)
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Verbose logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Per-stage analysis of the photos matching a pattern
    Analyze {
        /// Telemetry JSON file
        dataset: PathBuf,
        /// File extension (e.g. DNG, .jpg), or a path substring with --pattern
        pattern: String,
        /// Match PATTERN anywhere in the path (case-sensitive)
        #[arg(short = 'p', long = "pattern")]
        substring: bool,
    },
    /// Compare the summaries of two runs
    Compare {
        /// Baseline telemetry JSON file
        baseline: PathBuf,
        /// Candidate telemetry JSON file
        candidate: PathBuf,
    },
    /// Summary of one run: stage breakdown, slowest and failed photos
    Summary {
        /// Telemetry JSON file
        dataset: PathBuf,
        /// Number of slowest photos to list
        #[arg(long)]
        top: Option<usize>,
    },
    /// Write a default photoperf.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the photoperf CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the photoperf CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    // Init rewrites the config, so it must not depend on it being valid
    if let Commands::Init { force } = cli.command {
        return init_config(force);
    }

    // Discover photoperf.toml configuration (CLI flags override)
    let config = PerfConfig::discover().unwrap_or_default();

    let format: OutputFormat = cli
        .format
        .as_deref()
        .unwrap_or(config.output.format.as_str())
        .parse()
        .map_err(anyhow::Error::msg)?;

    let report = match &cli.command {
        Commands::Analyze {
            dataset,
            pattern,
            substring,
        } => {
            let data = load_dataset(dataset)?;
            build_analysis_report(
                &data,
                MatchSpec::new(pattern.as_str(), *substring),
                &dataset.display().to_string(),
            )
        }
        Commands::Compare {
            baseline,
            candidate,
        } => {
            let baseline_data = load_dataset(baseline)?;
            let candidate_data = load_dataset(candidate)?;
            build_comparison_report(
                &baseline_data,
                &candidate_data,
                &baseline.display().to_string(),
                &candidate.display().to_string(),
            )
            .context("cannot compare summaries")?
        }
        Commands::Summary { dataset, top } => {
            let data = load_dataset(dataset)?;
            build_summary_report(
                &data,
                &dataset.display().to_string(),
                top.unwrap_or(config.report.slowest_count),
                &config.report,
            )
        }
        Commands::Init { .. } => return Ok(()),
    };

    let output = render(&report, format, &config.report)?;
    write_output(cli.output.as_deref(), &output)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "photoperf=debug"
    } else {
        "photoperf=info"
    };
    // Ignore the error when a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_dataset(path: &Path) -> anyhow::Result<Dataset> {
    let dataset = Dataset::load(path)
        .with_context(|| format!("failed to load telemetry from {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        records = dataset.detailed.len(),
        processed = dataset.summary.processed_photos,
        "loaded dataset"
    );

    Ok(dataset)
}

/// Render a report in the requested format
pub fn render(
    report: &Report,
    format: OutputFormat,
    config: &ReportConfig,
) -> anyhow::Result<String> {
    let output = match format {
        OutputFormat::Json => {
            let mut json = generate_json_report(report)?;
            json.push('\n');
            json
        }
        OutputFormat::Human => format_human_output(report, config),
    };
    Ok(output)
}

fn write_output(path: Option<&Path>, output: &str) -> anyhow::Result<()> {
    if let Some(path) = path {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("cannot create {}", path.display()))?;
        file.write_all(output.as_bytes())?;
        eprintln!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }
    Ok(())
}

fn init_config(force: bool) -> anyhow::Result<()> {
    let path = std::env::current_dir()?.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    std::fs::write(&path, PerfConfig::default_toml())?;
    eprintln!("Created {}", path.display());
    Ok(())
}
