//! JSON Output

use crate::report::Report;

/// Generate a prettified JSON report.
///
/// Serializes the report into machine-readable JSON format.
pub fn generate_json_report(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ReportBody, SCHEMA_VERSION};
    use photoperf_stats::MatchSpec;

    #[test]
    fn test_no_matches_shape() {
        let report = Report::new(
            ReportBody::NoMatches {
                selection: MatchSpec::Extension("heic".into()),
            },
            vec!["perfstats.json".into()],
        );
        let json = generate_json_report(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["body"]["kind"], "no_matches");
        assert_eq!(value["body"]["selection"]["mode"], "extension");
        assert_eq!(value["body"]["selection"]["pattern"], "heic");
        assert_eq!(value["meta"]["schema_version"], SCHEMA_VERSION);
        assert_eq!(value["meta"]["sources"][0], "perfstats.json");
    }
}
