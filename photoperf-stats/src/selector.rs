//! Record Selection
//!
//! Filters a dataset's per-photo records. Selection never fails: an empty
//! result is returned as-is and the caller decides how to report it.

use crate::dataset::{Dataset, PhotoRecord};
use serde::{Deserialize, Serialize};

/// How a pattern is matched against `FilePath`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "pattern", rename_all = "lowercase")]
pub enum MatchSpec {
    /// Path ends with the extension, ignoring case. A leading `.` is added
    /// when the pattern lacks one.
    Extension(String),
    /// Path contains the pattern, case-sensitive
    Substring(String),
}

impl MatchSpec {
    /// Build a spec from CLI-style input
    pub fn new(pattern: impl Into<String>, substring: bool) -> Self {
        if substring {
            MatchSpec::Substring(pattern.into())
        } else {
            MatchSpec::Extension(pattern.into())
        }
    }

    /// The raw pattern
    pub fn pattern(&self) -> &str {
        match self {
            MatchSpec::Extension(p) | MatchSpec::Substring(p) => p,
        }
    }

    /// Report label: `"<pattern> files"` or `"<pattern> pattern"`
    pub fn label(&self) -> String {
        match self {
            MatchSpec::Extension(p) => format!("{p} files"),
            MatchSpec::Substring(p) => format!("{p} pattern"),
        }
    }

    /// Whether a single path matches
    pub fn matches(&self, path: &str) -> bool {
        match self {
            MatchSpec::Extension(ext) => {
                let suffix = if ext.starts_with('.') {
                    ext.to_uppercase()
                } else {
                    format!(".{ext}").to_uppercase()
                };
                path.to_uppercase().ends_with(&suffix)
            }
            MatchSpec::Substring(needle) => path.contains(needle.as_str()),
        }
    }
}

/// Records whose path matches, in capture order
pub fn select<'a>(dataset: &'a Dataset, spec: &MatchSpec) -> Vec<&'a PhotoRecord> {
    select_records(&dataset.detailed, spec)
}

/// Like [`select`], over a bare slice of records
pub fn select_records<'a>(records: &'a [PhotoRecord], spec: &MatchSpec) -> Vec<&'a PhotoRecord> {
    records
        .iter()
        .filter(|record| spec.matches(&record.file_path))
        .collect()
}

/// Records carrying an error, in capture order
pub fn failed_records<'a, I>(records: I) -> Vec<&'a PhotoRecord>
where
    I: IntoIterator<Item = &'a PhotoRecord>,
{
    records.into_iter().filter(|r| r.is_failed()).collect()
}

/// The `limit` slowest processed records by `TotalTime`, slowest first
///
/// Skipped and failed records are excluded. Ties keep capture order.
pub fn slowest_records<'a, I>(records: I, limit: usize) -> Vec<&'a PhotoRecord>
where
    I: IntoIterator<Item = &'a PhotoRecord>,
{
    let mut processed: Vec<_> = records
        .into_iter()
        .filter(|r| !r.was_skipped && !r.is_failed())
        .collect();
    processed.sort_by(|a, b| b.total_time.cmp(&a.total_time));
    processed.truncate(limit);
    processed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, total_ms: u64) -> PhotoRecord {
        serde_json::from_value(serde_json::json!({
            "FilePath": path,
            "FileSize": 1024,
            "TotalTime": total_ms * 1_000_000,
            "HashTime": 0,
            "MetadataTime": 0,
            "ImageDecodeTime": 0,
            "ThumbnailTime": 0,
            "ColorTime": 0,
            "PerceptualHashTime": 0,
            "InferenceTime": 0,
            "DatabaseTime": 0
        }))
        .unwrap()
    }

    fn paths(records: &[&PhotoRecord]) -> Vec<String> {
        records.iter().map(|r| r.file_path.clone()).collect()
    }

    #[test]
    fn test_extension_case_insensitive() {
        let records = vec![record("photo.DNG", 1), record("other.jpg", 1)];

        let a = select_records(&records, &MatchSpec::Extension("dng".into()));
        let b = select_records(&records, &MatchSpec::Extension(".DNG".into()));
        let c = select_records(&records, &MatchSpec::Extension(".Dng".into()));

        assert_eq!(paths(&a), vec!["photo.DNG"]);
        assert_eq!(paths(&a), paths(&b));
        assert_eq!(paths(&a), paths(&c));
    }

    #[test]
    fn test_extension_requires_suffix() {
        let records = vec![record("dng_exports/a.jpg", 1), record("b.xdng", 1)];
        assert!(select_records(&records, &MatchSpec::Extension("dng".into())).is_empty());
    }

    #[test]
    fn test_substring_case_sensitive() {
        let records = vec![
            record("/photos/L1000123.DNG", 1),
            record("/photos/l1000124.dng", 1),
            record("/photos/IMG_0001.jpg", 1),
        ];

        let hits = select_records(&records, &MatchSpec::Substring("L10".into()));
        assert_eq!(paths(&hits), vec!["/photos/L1000123.DNG"]);
    }

    #[test]
    fn test_preserves_order_and_empty() {
        let records = vec![record("c.jpg", 1), record("a.jpg", 1), record("b.png", 1)];

        let hits = select_records(&records, &MatchSpec::new("jpg", false));
        assert_eq!(paths(&hits), vec!["c.jpg", "a.jpg"]);

        assert!(select_records(&records, &MatchSpec::new("heic", false)).is_empty());
    }

    #[test]
    fn test_labels() {
        assert_eq!(MatchSpec::new(".DNG", false).label(), ".DNG files");
        assert_eq!(MatchSpec::new("L10", true).label(), "L10 pattern");
        assert_eq!(MatchSpec::new("L10", true).pattern(), "L10");
    }

    #[test]
    fn test_slowest_excludes_skipped_and_failed() {
        let mut skipped = record("skipped.jpg", 900);
        skipped.was_skipped = true;
        let mut failed = record("failed.jpg", 800);
        failed.error = "decode error".into();
        let records = vec![
            record("a.jpg", 10),
            skipped,
            record("b.jpg", 30),
            failed,
            record("c.jpg", 30),
            record("d.jpg", 20),
        ];

        let slowest = slowest_records(&records, 3);
        assert_eq!(paths(&slowest), vec!["b.jpg", "c.jpg", "d.jpg"]);

        let failures = failed_records(&records);
        assert_eq!(paths(&failures), vec!["failed.jpg"]);
    }
}
