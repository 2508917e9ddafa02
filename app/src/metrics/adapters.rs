use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{batch::NormalizedBatch, tool::Tool};

pub mod deployments;
pub mod gitleaks;
pub mod jest;
pub mod jira;
pub mod language;
pub mod packages;
pub mod sonarqube;
pub mod trivy;
pub mod zap;

/// Turns a raw tool payload into the batch of upserts and inserts it
/// implies. Pure with respect to the store; `now` anchors every
/// time-relative rule so ingestion stays deterministic under test.
///
/// Missing or mistyped payload fields degrade to absent values inside the
/// affected adapter; they never fail the submission as a whole.
pub fn normalize(tool: Tool, payload: &Value, now: DateTime<Utc>) -> NormalizedBatch {
    match tool {
        Tool::SonarQube => sonarqube::normalize(payload),
        Tool::Trivy => trivy::normalize(payload),
        Tool::GitLeaks => gitleaks::normalize(payload, now),
        Tool::Jest => jest::normalize(payload),
        Tool::JiraSprintPoints => jira::normalize_sprint_points(payload),
        Tool::JiraSecurityEpics => jira::normalize_security_epics(payload),
        Tool::JiraSecurityIncidents => jira::normalize_security_incidents(payload),
        Tool::JiraDefectDensity => jira::normalize_defect_density(payload),
        Tool::LanguageImpact => language::normalize(payload),
        Tool::Depcheck => packages::normalize_depcheck(payload),
        Tool::OutdatedPackages => packages::normalize_outdated(payload),
        Tool::Zap => zap::normalize(payload),
        Tool::DeploymentFrequency => deployments::normalize_frequency(payload, now),
        Tool::DeploymentTime => deployments::normalize_lead_time(payload),
        Tool::Mttr => deployments::normalize_mttr(payload),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::metrics::batch::CategoryPatch;

    #[test]
    fn every_tool_normalizes_an_empty_payload_without_panicking() {
        let now = Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap();
        for tool in Tool::ALL {
            let _ = normalize(tool, &json!({}), now);
            let _ = normalize(tool, &json!([]), now);
            let _ = normalize(tool, &json!(null), now);
        }
    }

    #[test]
    fn dispatch_routes_to_the_matching_adapter() {
        let now = Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap();

        let batch = normalize(Tool::Jest, &json!({ "numPassedTests": 1, "numTotalTests": 2 }), now);
        assert!(matches!(
            batch.category_upserts.as_slice(),
            [CategoryPatch::Test(_)]
        ));

        let batch = normalize(Tool::LanguageImpact, &json!({ "C": 100 }), now);
        assert!(matches!(
            batch.category_upserts.as_slice(),
            [CategoryPatch::Code(_)]
        ));
    }
}
