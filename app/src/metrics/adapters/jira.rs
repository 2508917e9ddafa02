use serde::Deserialize;
use serde_json::Value;

use crate::metrics::batch::{
    CategoryPatch, Field, NormalizedBatch, OperateMonitorPatch, PlanPatch,
};

#[derive(Debug, Deserialize)]
struct Sprint {
    #[serde(default, deserialize_with = "crate::serde::deserialize_lenient_number")]
    estimated: Option<f64>,
    #[serde(default, deserialize_with = "crate::serde::deserialize_lenient_number")]
    completed: Option<f64>,
}

/// Closed-sprint story points, one entry per sprint, oldest first. Only the
/// most recent sprint feeds the velocity ratio.
pub fn normalize_sprint_points(payload: &Value) -> NormalizedBatch {
    let sprints: Vec<Sprint> = serde_json::from_value(payload.clone()).unwrap_or_default();

    let Some(latest) = sprints.last() else {
        // nothing to fold in; leave the plan record untouched
        return NormalizedBatch::default();
    };

    let ratio = match latest.estimated {
        Some(estimated) if estimated > 0.0 => {
            Some(latest.completed.unwrap_or(0.0) / estimated * 100.0)
        }
        _ => None,
    };

    NormalizedBatch {
        category_upserts: vec![CategoryPatch::Plan(PlanPatch {
            estimated_vs_completed_story_points: ratio.into(),
            ..Default::default()
        })],
        ..Default::default()
    }
}

#[derive(Debug, Default, Deserialize)]
struct IssueSearch {
    #[serde(default)]
    issues: Vec<Issue>,
}

#[derive(Debug, Default, Deserialize)]
struct Issue {
    #[serde(default)]
    fields: IssueFields,
}

#[derive(Debug, Default, Deserialize)]
struct IssueFields {
    #[serde(default)]
    labels: Vec<String>,
}

/// Share of epics carrying a security-flavored label, as a percentage
/// rounded to one decimal.
pub fn normalize_security_epics(payload: &Value) -> NormalizedBatch {
    let search: IssueSearch = serde_json::from_value(payload.clone()).unwrap_or_default();

    let total = search.issues.len();
    let coverage = if total > 0 {
        let security = search
            .issues
            .iter()
            .filter(|issue| {
                issue
                    .fields
                    .labels
                    .iter()
                    .any(|label| label.to_lowercase().contains("security"))
            })
            .count();
        Some((security as f64 / total as f64 * 1000.0).round() / 10.0)
    } else {
        None
    };

    NormalizedBatch {
        category_upserts: vec![CategoryPatch::Plan(PlanPatch {
            security_requirements_coverage: coverage.into(),
            ..Default::default()
        })],
        ..Default::default()
    }
}

/// Security incidents created during the active sprint; the count is the
/// metric.
pub fn normalize_security_incidents(payload: &Value) -> NormalizedBatch {
    let search: IssueSearch = serde_json::from_value(payload.clone()).unwrap_or_default();

    NormalizedBatch {
        category_upserts: vec![CategoryPatch::OperateMonitor(OperateMonitorPatch {
            security_incidents: Field::Set(search.issues.len() as i32),
            ..Default::default()
        })],
        ..Default::default()
    }
}

#[derive(Debug, Default, Deserialize)]
struct DefectDensityPayload {
    #[serde(
        alias = "bugCount",
        default,
        deserialize_with = "crate::serde::deserialize_lenient_number"
    )]
    bug_count: Option<f64>,
    #[serde(default, deserialize_with = "crate::serde::deserialize_lenient_number")]
    kloc: Option<f64>,
}

/// Bugs per thousand lines of code, rounded to two decimals.
pub fn normalize_defect_density(payload: &Value) -> NormalizedBatch {
    let payload: DefectDensityPayload =
        serde_json::from_value(payload.clone()).unwrap_or_default();

    let density = match (payload.bug_count, payload.kloc) {
        (Some(bugs), Some(kloc)) if kloc > 0.0 => Some((bugs / kloc * 100.0).round() / 100.0),
        _ => None,
    };

    NormalizedBatch {
        category_upserts: vec![CategoryPatch::OperateMonitor(OperateMonitorPatch {
            defect_density: density.into(),
            ..Default::default()
        })],
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn velocity_uses_only_the_latest_sprint() {
        let payload = json!([
            { "sprint": "Sprint 7", "estimated": 40, "completed": 10 },
            { "sprint": "Sprint 8", "estimated": 20, "completed": 15 }
        ]);

        let batch = normalize_sprint_points(&payload);
        let CategoryPatch::Plan(plan) = &batch.category_upserts[0] else {
            panic!("expected a plan patch");
        };
        assert_eq!(plan.estimated_vs_completed_story_points, Field::Set(75.0));
    }

    #[test]
    fn zero_estimate_yields_no_velocity() {
        let payload = json!([{ "sprint": "Sprint 1", "estimated": 0, "completed": 0 }]);

        let batch = normalize_sprint_points(&payload);
        let CategoryPatch::Plan(plan) = &batch.category_upserts[0] else {
            panic!("expected a plan patch");
        };
        assert_eq!(plan.estimated_vs_completed_story_points, Field::Null);
    }

    #[test]
    fn empty_sprint_list_touches_nothing() {
        assert_eq!(normalize_sprint_points(&json!([])), NormalizedBatch::default());
        assert_eq!(
            normalize_sprint_points(&json!({ "not": "an array" })),
            NormalizedBatch::default()
        );
    }

    #[test]
    fn security_label_match_is_case_insensitive_substring() {
        let payload = json!({
            "issues": [
                { "fields": { "labels": ["Security-Review"] } },
                { "fields": { "labels": ["app-security"] } },
                { "fields": { "labels": ["frontend"] } }
            ]
        });

        let batch = normalize_security_epics(&payload);
        let CategoryPatch::Plan(plan) = &batch.category_upserts[0] else {
            panic!("expected a plan patch");
        };
        // 2/3, rounded to one decimal
        assert_eq!(plan.security_requirements_coverage, Field::Set(66.7));
    }

    #[test]
    fn incident_count_is_the_issue_count() {
        let payload = json!({ "issues": [{}, {}, {}] });

        let batch = normalize_security_incidents(&payload);
        let CategoryPatch::OperateMonitor(operate) = &batch.category_upserts[0] else {
            panic!("expected an operate/monitor patch");
        };
        assert_eq!(operate.security_incidents, Field::Set(3));
    }

    #[test]
    fn defect_density_rounds_to_two_decimals() {
        let payload = json!({ "bugCount": 10, "kloc": 3 });

        let batch = normalize_defect_density(&payload);
        let CategoryPatch::OperateMonitor(operate) = &batch.category_upserts[0] else {
            panic!("expected an operate/monitor patch");
        };
        assert_eq!(operate.defect_density, Field::Set(3.33));
    }

    #[test]
    fn defect_density_needs_a_positive_kloc() {
        let batch = normalize_defect_density(&json!({ "bugCount": 10, "kloc": 0 }));
        let CategoryPatch::OperateMonitor(operate) = &batch.category_upserts[0] else {
            panic!("expected an operate/monitor patch");
        };
        assert_eq!(operate.defect_density, Field::Null);
    }
}
