//! Configuration loading from photoperf.toml
//!
//! Photoperf configuration can be specified in a `photoperf.toml` file.
//! The configuration is automatically discovered by walking up from the current directory.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file searched for by [`PerfConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "photoperf.toml";

/// Photoperf configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PerfConfig {
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
    /// Report layout configuration
    #[serde(default)]
    pub report: ReportConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}

/// Report layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Number of slowest photos listed by `summary`
    #[serde(default = "default_slowest_count")]
    pub slowest_count: usize,
    /// Maximum failed photos listed by `summary`
    #[serde(default = "default_failed_limit")]
    pub failed_limit: usize,
    /// Width of the pipeline breakdown bars, in cells
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
    /// Maximum displayed file name length
    #[serde(default = "default_filename_width")]
    pub filename_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            slowest_count: default_slowest_count(),
            failed_limit: default_failed_limit(),
            bar_width: default_bar_width(),
            filename_width: default_filename_width(),
        }
    }
}

fn default_slowest_count() -> usize {
    10
}
fn default_failed_limit() -> usize {
    20
}
fn default_bar_width() -> usize {
    50
}
fn default_filename_width() -> usize {
    50
}

impl PerfConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => {
                        tracing::debug!(path = %config_path.display(), "loaded configuration");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %config_path.display(),
                            error = %e,
                            "ignoring unreadable configuration"
                        );
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Photoperf Configuration

[output]
# Default output format: human or json
format = "human"

[report]
# Slowest photos listed by `photoperf summary`
slowest_count = 10
# Failed photos listed before "... and N more"
failed_limit = 20
# Width of the pipeline breakdown bars
bar_width = 50
# Longer file names are cut and end in "..."
filename_width = 50
"#
        .to_string()
    }
}
