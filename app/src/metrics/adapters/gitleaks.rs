use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::metrics::batch::{BuildPatch, CategoryPatch, Field, NormalizedBatch, SecretFinding};

/// Findings inside the generated workflow file are the pipeline reporting
/// its own credentials plumbing, not a leak.
const WORKFLOW_PATH_MARKER: &str = ".github/workflows";

/// The README documents a sample API key on a fixed line; gitleaks flags it
/// on every run.
const README_SAMPLE_RULE: &str = "generic-api-key";
const README_SAMPLE_FILE: &str = "README.md";
const README_SAMPLE_LINE: i32 = 121;

#[derive(Debug, Default, Deserialize)]
struct Finding {
    #[serde(rename = "RuleID")]
    rule_id: Option<String>,
    #[serde(rename = "File")]
    file: Option<String>,
    #[serde(
        rename = "StartLine",
        default,
        deserialize_with = "crate::serde::deserialize_lenient_number"
    )]
    start_line: Option<i32>,
    #[serde(rename = "Description")]
    description: Option<String>,
    #[serde(rename = "Date")]
    date: Option<String>,
}

/// GitLeaks report: persist every finding that survives the false-positive
/// filter and record the surviving count as the scan's secret-detection
/// metric.
pub fn normalize(payload: &Value, now: DateTime<Utc>) -> NormalizedBatch {
    let findings: Vec<Finding> = serde_json::from_value(payload.clone()).unwrap_or_default();

    let secret_findings: Vec<SecretFinding> = findings
        .iter()
        .filter(|finding| !is_false_positive(finding))
        .map(|finding| SecretFinding {
            rule: finding
                .rule_id
                .clone()
                .unwrap_or_else(|| "unknown-rule".to_string()),
            file_path: finding.file.clone().unwrap_or_default(),
            line_number: finding.start_line,
            description: finding.description.clone(),
            detected_at: Some(
                finding
                    .date
                    .as_deref()
                    .and_then(|date| DateTime::parse_from_rfc3339(date).ok())
                    .map(|date| date.with_timezone(&Utc))
                    .unwrap_or(now),
            ),
        })
        .collect();

    let build = BuildPatch {
        secret_detection: Field::Set(secret_findings.len() as i32),
        ..Default::default()
    };

    let mut batch = NormalizedBatch {
        category_upserts: vec![CategoryPatch::Build(build)],
        ..Default::default()
    };
    batch.lists.secret_findings = secret_findings;
    batch
}

fn is_false_positive(finding: &Finding) -> bool {
    let file = finding.file.as_deref().unwrap_or_default();

    if file.contains(WORKFLOW_PATH_MARKER) {
        return true;
    }

    finding.rule_id.as_deref() == Some(README_SAMPLE_RULE)
        && file.ends_with(README_SAMPLE_FILE)
        && finding.start_line == Some(README_SAMPLE_LINE)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn workflow_config_findings_are_never_persisted() {
        let payload = json!([{
            "RuleID": "github-pat",
            "File": ".github/workflows/metrics.yml",
            "StartLine": 14,
            "Description": "GitHub personal access token"
        }]);

        let batch = normalize(&payload, now());

        assert!(batch.lists.secret_findings.is_empty());
        let CategoryPatch::Build(build) = &batch.category_upserts[0] else {
            panic!("expected a build patch");
        };
        assert_eq!(build.secret_detection, Field::Set(0));
    }

    #[test]
    fn readme_sample_token_is_filtered_only_on_its_documented_line() {
        let payload = json!([
            {
                "RuleID": "generic-api-key",
                "File": "docs/README.md",
                "StartLine": 121
            },
            {
                "RuleID": "generic-api-key",
                "File": "docs/README.md",
                "StartLine": 15
            }
        ]);

        let batch = normalize(&payload, now());

        assert_eq!(batch.lists.secret_findings.len(), 1);
        assert_eq!(batch.lists.secret_findings[0].line_number, Some(15));
    }

    #[test]
    fn counts_reflect_persisted_findings_not_raw_input() {
        let payload = json!([
            { "RuleID": "aws-access-token", "File": "src/config.js", "StartLine": 3 },
            { "RuleID": "github-pat", "File": ".github/workflows/ci.yml", "StartLine": 9 }
        ]);

        let batch = normalize(&payload, now());

        let CategoryPatch::Build(build) = &batch.category_upserts[0] else {
            panic!("expected a build patch");
        };
        assert_eq!(build.secret_detection, Field::Set(1));
        assert_eq!(batch.lists.secret_findings[0].file_path, "src/config.js");
    }

    #[test]
    fn detection_time_falls_back_to_ingestion_time() {
        let payload = json!([
            {
                "RuleID": "aws-access-token",
                "File": "src/a.js",
                "Date": "2026-02-27T08:30:00Z"
            },
            { "RuleID": "aws-access-token", "File": "src/b.js" }
        ]);

        let batch = normalize(&payload, now());

        let detected: Vec<_> = batch
            .lists
            .secret_findings
            .iter()
            .map(|finding| finding.detected_at.unwrap())
            .collect();
        assert_eq!(detected[0], Utc.with_ymd_and_hms(2026, 2, 27, 8, 30, 0).unwrap());
        assert_eq!(detected[1], now());
    }
}
