//! Telemetry Data Model
//!
//! One telemetry capture is a JSON document with two top-level fields:
//! - `summary`: run-level averages precomputed by the producer
//! - `detailed`: one record per processed photo, durations in nanoseconds
//!
//! Key names are the producer's (PascalCase) and are kept verbatim. Required
//! keys are checked before deserialization so a missing field is reported
//! by name and location instead of surfacing later as a wrong number.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Declared pipeline stages, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Content hashing
    Hash,
    /// EXIF / metadata extraction
    Metadata,
    /// Full image decode (RAW or JPEG)
    ImageDecode,
    /// Thumbnail generation
    Thumbnail,
    /// Dominant color extraction
    Color,
    /// Perceptual hash
    PerceptualHash,
    /// Model inference
    Inference,
    /// Database writes
    Database,
}

impl Stage {
    /// Every declared stage in report order
    pub const ALL: [Stage; 8] = [
        Stage::Hash,
        Stage::Metadata,
        Stage::ImageDecode,
        Stage::Thumbnail,
        Stage::Color,
        Stage::PerceptualHash,
        Stage::Inference,
        Stage::Database,
    ];

    /// Human-readable label used in report tables
    pub fn label(self) -> &'static str {
        match self {
            Stage::Hash => "Hash",
            Stage::Metadata => "Metadata",
            Stage::ImageDecode => "Image Decode",
            Stage::Thumbnail => "Thumbnails",
            Stage::Color => "Color Extract",
            Stage::PerceptualHash => "Perceptual Hash",
            Stage::Inference => "Inference",
            Stage::Database => "Database",
        }
    }

    /// Per-record duration key (nanoseconds)
    pub fn record_key(self) -> &'static str {
        match self {
            Stage::Hash => "HashTime",
            Stage::Metadata => "MetadataTime",
            Stage::ImageDecode => "ImageDecodeTime",
            Stage::Thumbnail => "ThumbnailTime",
            Stage::Color => "ColorTime",
            Stage::PerceptualHash => "PerceptualHashTime",
            Stage::Inference => "InferenceTime",
            Stage::Database => "DatabaseTime",
        }
    }

    /// Summary average key (milliseconds)
    pub fn summary_key(self) -> &'static str {
        match self {
            Stage::Hash => "AvgHashMs",
            Stage::Metadata => "AvgMetadataMs",
            Stage::ImageDecode => "AvgImageDecodeMs",
            Stage::Thumbnail => "AvgThumbnailMs",
            Stage::Color => "AvgColorMs",
            Stage::PerceptualHash => "AvgPerceptualHashMs",
            Stage::Inference => "AvgInferenceMs",
            Stage::Database => "AvgDatabaseMs",
        }
    }
}

/// A stage as it appears in results: declared, or an extra stage found in
/// the document (`<Name>Time` per record, `Avg<Name>Ms` in the summary).
///
/// Ordering puts declared stages first in declaration order, then extra
/// stages by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StageId {
    /// One of [`Stage::ALL`]
    Declared(Stage),
    /// Additional stage, by name
    Extra(String),
}

impl StageId {
    /// Human-readable label
    pub fn label(&self) -> Cow<'_, str> {
        match self {
            StageId::Declared(stage) => Cow::Borrowed(stage.label()),
            StageId::Extra(name) => Cow::Borrowed(name.as_str()),
        }
    }

    /// All declared stages as ids
    pub fn declared() -> impl Iterator<Item = StageId> {
        Stage::ALL.into_iter().map(StageId::Declared)
    }
}

impl From<Stage> for StageId {
    fn from(stage: Stage) -> Self {
        StageId::Declared(stage)
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Extract `Name` from `{prefix}Name{suffix}` when `Name` looks like a stage
fn extra_stage_name<'a>(key: &'a str, prefix: &str, suffix: &str) -> Option<&'a str> {
    let name = key.strip_prefix(prefix)?.strip_suffix(suffix)?;
    let mut chars = name.chars();
    let first = chars.next()?;
    (first.is_ascii_uppercase() && chars.all(|c| c.is_ascii_alphanumeric())).then_some(name)
}

/// One processed photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PhotoRecord {
    /// Path as captured, case preserved
    pub file_path: String,
    /// Bytes
    pub file_size: u64,
    /// Wall time for the photo, nanoseconds
    pub total_time: u64,
    /// Nanoseconds
    pub hash_time: u64,
    /// Nanoseconds
    pub metadata_time: u64,
    /// Nanoseconds
    pub image_decode_time: u64,
    /// Nanoseconds
    pub thumbnail_time: u64,
    /// Nanoseconds
    pub color_time: u64,
    /// Nanoseconds
    pub perceptual_hash_time: u64,
    /// Nanoseconds
    pub inference_time: u64,
    /// Nanoseconds
    pub database_time: u64,
    /// Unchanged since the last index, not reprocessed
    #[serde(default)]
    pub was_skipped: bool,
    /// Already indexed and processed again
    #[serde(default)]
    pub was_updated: bool,
    /// Empty when the photo was processed successfully
    #[serde(default)]
    pub error: String,
    /// Unrecognized fields, including extra `<Name>Time` stages
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PhotoRecord {
    /// Duration of a stage in nanoseconds (0 for an extra stage the record lacks)
    pub fn stage_nanos(&self, stage: &StageId) -> u64 {
        match stage {
            StageId::Declared(stage) => self.declared_nanos(*stage),
            StageId::Extra(name) => self
                .extra
                .get(&format!("{name}Time"))
                .and_then(Value::as_u64)
                .unwrap_or(0),
        }
    }

    fn declared_nanos(&self, stage: Stage) -> u64 {
        match stage {
            Stage::Hash => self.hash_time,
            Stage::Metadata => self.metadata_time,
            Stage::ImageDecode => self.image_decode_time,
            Stage::Thumbnail => self.thumbnail_time,
            Stage::Color => self.color_time,
            Stage::PerceptualHash => self.perceptual_hash_time,
            Stage::Inference => self.inference_time,
            Stage::Database => self.database_time,
        }
    }

    /// Extra stages carried by this record, as (name, nanoseconds)
    pub fn extra_stages(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.extra.iter().filter_map(|(key, value)| {
            let name = extra_stage_name(key, "", "Time")?;
            Some((name, value.as_u64()?))
        })
    }

    /// Sum of every stage duration, declared and extra
    pub fn stage_sum_nanos(&self) -> u128 {
        let declared: u128 = Stage::ALL
            .iter()
            .map(|&s| u128::from(self.declared_nanos(s)))
            .sum();
        let extra: u128 = self
            .extra_stages()
            .map(|(_, nanos)| u128::from(nanos))
            .sum();
        declared + extra
    }

    /// Stage times are sub-phases of the total, so the total must cover them
    pub fn is_well_formed(&self) -> bool {
        u128::from(self.total_time) >= self.stage_sum_nanos()
    }

    /// Whether the photo failed to process
    pub fn is_failed(&self) -> bool {
        !self.error.is_empty()
    }

    /// Final path component, for display
    pub fn file_name(&self) -> &str {
        Path::new(&self.file_path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.file_path)
    }
}

/// Run-level aggregate written by the producer
///
/// Independent of `detailed`: nothing here is recomputed from the records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PerfSummary {
    /// Photos seen by the run
    #[serde(default)]
    pub total_photos: u64,
    /// Photos actually processed
    pub processed_photos: u64,
    /// Photos skipped as unchanged
    #[serde(default)]
    pub skipped_photos: u64,
    /// Photos re-indexed
    #[serde(default)]
    pub updated_photos: u64,
    /// Photos that failed
    #[serde(default)]
    pub failed_photos: u64,
    /// Bytes processed
    pub total_bytes: u64,
    /// MB/s as reported by the producer
    #[serde(rename = "AvgThroughputMBps")]
    pub avg_throughput_mbps: f64,
    /// Mean total time per photo, milliseconds
    pub avg_total_ms: f64,
    /// Milliseconds
    pub avg_hash_ms: f64,
    /// Milliseconds
    pub avg_metadata_ms: f64,
    /// Milliseconds
    pub avg_image_decode_ms: f64,
    /// Milliseconds
    pub avg_thumbnail_ms: f64,
    /// Milliseconds
    pub avg_color_ms: f64,
    /// Milliseconds
    pub avg_perceptual_hash_ms: f64,
    /// Milliseconds
    pub avg_inference_ms: f64,
    /// Milliseconds
    pub avg_database_ms: f64,
    /// Unrecognized fields, including extra `Avg<Name>Ms` stages
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PerfSummary {
    /// Average of a stage in milliseconds, `None` if the summary lacks it
    pub fn stage_avg_ms(&self, stage: &StageId) -> Option<f64> {
        match stage {
            StageId::Declared(stage) => Some(match stage {
                Stage::Hash => self.avg_hash_ms,
                Stage::Metadata => self.avg_metadata_ms,
                Stage::ImageDecode => self.avg_image_decode_ms,
                Stage::Thumbnail => self.avg_thumbnail_ms,
                Stage::Color => self.avg_color_ms,
                Stage::PerceptualHash => self.avg_perceptual_hash_ms,
                Stage::Inference => self.avg_inference_ms,
                Stage::Database => self.avg_database_ms,
            }),
            StageId::Extra(name) => self
                .extra
                .get(&format!("Avg{name}Ms"))
                .and_then(Value::as_f64),
        }
    }

    /// Declared stages followed by this summary's extra stages
    pub fn stage_ids(&self) -> Vec<StageId> {
        let mut extras: Vec<StageId> = self
            .extra
            .iter()
            .filter(|(_, value)| value.is_number())
            .filter_map(|(key, _)| extra_stage_name(key, "Avg", "Ms"))
            .map(|name| StageId::Extra(name.to_string()))
            .collect();
        extras.sort();
        StageId::declared().chain(extras).collect()
    }
}

/// One telemetry capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Run-level aggregate
    pub summary: PerfSummary,
    /// Per-photo records in capture order; empty for summary-only documents
    pub detailed: Vec<PhotoRecord>,
}

const REQUIRED_SUMMARY_KEYS: [&str; 4] = [
    "ProcessedPhotos",
    "TotalBytes",
    "AvgThroughputMBps",
    "AvgTotalMs",
];

const REQUIRED_RECORD_KEYS: [&str; 3] = ["FilePath", "FileSize", "TotalTime"];

impl Dataset {
    /// Read and parse a telemetry file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse a telemetry document
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Build a dataset from an already-parsed document
    pub fn from_value(value: Value) -> Result<Self, DatasetError> {
        let mut document = into_object(value, "document")?;

        let summary = document
            .remove("summary")
            .ok_or_else(|| missing("document", "summary"))?;
        let summary = parse_summary(summary)?;

        // Summary-only documents are enough for comparisons
        let detailed: Vec<PhotoRecord> = match document.remove("detailed") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| parse_record(item, &format!("detailed[{idx}]")))
                .collect::<Result<_, _>>()?,
            Some(_) => {
                return Err(DatasetError::NotAnArray {
                    context: "detailed".to_string(),
                });
            }
        };

        Ok(Self { summary, detailed })
    }
}

fn into_object(value: Value, context: &str) -> Result<Map<String, Value>, DatasetError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(DatasetError::NotAnObject {
            context: context.to_string(),
        }),
    }
}

fn missing(context: &str, key: &str) -> DatasetError {
    DatasetError::MissingKey {
        context: context.to_string(),
        key: key.to_string(),
    }
}

fn require_keys<'a>(
    map: &Map<String, Value>,
    keys: impl IntoIterator<Item = &'a str>,
    context: &str,
) -> Result<(), DatasetError> {
    match keys.into_iter().find(|key| !map.contains_key(*key)) {
        Some(key) => Err(missing(context, key)),
        None => Ok(()),
    }
}

fn parse_summary(value: Value) -> Result<PerfSummary, DatasetError> {
    let map = into_object(value, "summary")?;
    require_keys(
        &map,
        REQUIRED_SUMMARY_KEYS
            .into_iter()
            .chain(Stage::ALL.iter().map(|s| s.summary_key())),
        "summary",
    )?;

    let summary: PerfSummary =
        serde_json::from_value(Value::Object(map)).map_err(|source| DatasetError::InvalidField {
            context: "summary".to_string(),
            source,
        })?;

    for (key, value) in &summary.extra {
        if extra_stage_name(key, "Avg", "Ms").is_some() && value.as_f64().is_none_or(|v| v < 0.0)
        {
            return Err(DatasetError::InvalidStage {
                context: "summary".to_string(),
                key: key.clone(),
            });
        }
    }

    Ok(summary)
}

fn parse_record(value: Value, context: &str) -> Result<PhotoRecord, DatasetError> {
    let map = into_object(value, context)?;
    require_keys(
        &map,
        REQUIRED_RECORD_KEYS
            .into_iter()
            .chain(Stage::ALL.iter().map(|s| s.record_key())),
        context,
    )?;

    let record: PhotoRecord =
        serde_json::from_value(Value::Object(map)).map_err(|source| DatasetError::InvalidField {
            context: context.to_string(),
            source,
        })?;

    for (key, value) in &record.extra {
        if extra_stage_name(key, "", "Time").is_some() && value.as_u64().is_none() {
            return Err(DatasetError::InvalidStage {
                context: context.to_string(),
                key: key.clone(),
            });
        }
    }

    Ok(record)
}

/// Errors from loading a telemetry document
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid JSON
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A section that must be an object is not
    #[error("{context}: expected an object")]
    NotAnObject {
        /// Section, e.g. `summary` or `detailed[3]`
        context: String,
    },
    /// `detailed` is neither an array nor null
    #[error("{context}: expected an array or null")]
    NotAnArray {
        /// Section
        context: String,
    },
    /// A required key is absent
    #[error("{context}: missing required key `{key}`")]
    MissingKey {
        /// Section
        context: String,
        /// Missing key
        key: String,
    },
    /// A field has the wrong type or range
    #[error("{context}: {source}")]
    InvalidField {
        /// Section
        context: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
    /// An extra stage field is not a non-negative number
    #[error("{context}: stage field `{key}` must be a non-negative number")]
    InvalidStage {
        /// Section
        context: String,
        /// Offending key
        key: String,
    },
}
