use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::metrics::batch::{
    CategoryPatch, DeployReleasePatch, Field, NormalizedBatch, OperateMonitorPatch,
};

#[derive(Debug, Default, Deserialize)]
struct DeploymentDay {
    date: Option<String>,
    #[serde(default, deserialize_with = "crate::serde::deserialize_lenient_number")]
    count: Option<f64>,
}

/// Deployment events bucketed per day. Only the trailing week counts; the
/// average is per *active* day, so a week with two deploy days and four
/// deployments reads as 2/day.
pub fn normalize_frequency(payload: &Value, now: DateTime<Utc>) -> NormalizedBatch {
    let entries: Vec<DeploymentDay> = serde_json::from_value(payload.clone()).unwrap_or_default();

    let cutoff = now.date_naive() - Duration::days(7);

    let mut days: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut total = 0.0;
    for entry in &entries {
        let Some(date) = entry.date.as_deref().and_then(parse_day) else {
            continue;
        };
        if date > cutoff {
            days.insert(date);
            total += entry.count.unwrap_or(0.0);
        }
    }

    let avg_per_day = if days.is_empty() {
        0.0
    } else {
        total / days.len() as f64
    };

    NormalizedBatch {
        category_upserts: vec![CategoryPatch::DeployRelease(DeployReleasePatch {
            deployment_frequency: Field::Set(avg_per_day),
            ..Default::default()
        })],
        ..Default::default()
    }
}

/// Dates arrive either bare ("2026-08-06") or as full RFC 3339 timestamps;
/// only the calendar day matters.
fn parse_day(raw: &str) -> Option<NaiveDate> {
    raw.get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}

#[derive(Debug, Default, Deserialize)]
struct LeadTime {
    #[serde(
        rename = "lead_time_hours",
        default,
        deserialize_with = "crate::serde::deserialize_lenient_number"
    )]
    lead_time_hours: Option<f64>,
}

/// Mean lead time in hours across the reported deployments; absent when
/// nothing was reported.
pub fn normalize_lead_time(payload: &Value) -> NormalizedBatch {
    let entries: Vec<LeadTime> = serde_json::from_value(payload.clone()).unwrap_or_default();

    let hours: Vec<f64> = entries
        .iter()
        .filter_map(|entry| entry.lead_time_hours)
        .collect();

    NormalizedBatch {
        category_upserts: vec![CategoryPatch::DeployRelease(DeployReleasePatch {
            deployment_time: mean(&hours).into(),
            ..Default::default()
        })],
        ..Default::default()
    }
}

#[derive(Debug, Default, Deserialize)]
struct Restore {
    #[serde(
        rename = "mttr_minutes",
        default,
        deserialize_with = "crate::serde::deserialize_lenient_number"
    )]
    mttr_minutes: Option<f64>,
}

/// Mean time to restore, reported in minutes, stored in hours.
pub fn normalize_mttr(payload: &Value) -> NormalizedBatch {
    let entries: Vec<Restore> = serde_json::from_value(payload.clone()).unwrap_or_default();

    let minutes: Vec<f64> = entries
        .iter()
        .filter_map(|entry| entry.mttr_minutes)
        .collect();

    NormalizedBatch {
        category_upserts: vec![CategoryPatch::OperateMonitor(OperateMonitorPatch {
            mttr: mean(&minutes).map(|m| m / 60.0).into(),
            ..Default::default()
        })],
        ..Default::default()
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 6, 15, 0, 0).unwrap()
    }

    fn frequency(payload: Value) -> Field<f64> {
        let batch = normalize_frequency(&payload, now());
        let CategoryPatch::DeployRelease(deploy) = &batch.category_upserts[0] else {
            panic!("expected a deploy/release patch");
        };
        deploy.deployment_frequency.clone()
    }

    #[test]
    fn averages_over_distinct_active_days() {
        let value = frequency(json!([
            { "date": "2026-08-06", "count": 3 },
            { "date": "2026-08-05", "count": 1 }
        ]));
        assert_eq!(value, Field::Set(2.0));
    }

    #[test]
    fn entries_older_than_a_week_are_ignored() {
        let value = frequency(json!([
            { "date": "2026-08-06", "count": 2 },
            { "date": "2026-07-20", "count": 9 }
        ]));
        assert_eq!(value, Field::Set(2.0));
    }

    #[test]
    fn no_recent_days_means_zero_frequency() {
        assert_eq!(frequency(json!([])), Field::Set(0.0));
        assert_eq!(
            frequency(json!([{ "date": "2026-01-01", "count": 5 }])),
            Field::Set(0.0)
        );
    }

    #[test]
    fn full_timestamps_bucket_by_calendar_day() {
        let value = frequency(json!([
            { "date": "2026-08-06T09:15:00Z", "count": 1 },
            { "date": "2026-08-06T17:40:00Z", "count": 1 }
        ]));
        // same day: one bucket, two deployments
        assert_eq!(value, Field::Set(2.0));
    }

    #[test]
    fn lead_time_is_the_mean_of_reported_hours() {
        let batch = normalize_lead_time(&json!([
            { "lead_time_hours": 2.0 },
            { "lead_time_hours": 4.0 }
        ]));
        let CategoryPatch::DeployRelease(deploy) = &batch.category_upserts[0] else {
            panic!("expected a deploy/release patch");
        };
        assert_eq!(deploy.deployment_time, Field::Set(3.0));
    }

    #[test]
    fn empty_lead_time_series_stays_absent() {
        let batch = normalize_lead_time(&json!([]));
        let CategoryPatch::DeployRelease(deploy) = &batch.category_upserts[0] else {
            panic!("expected a deploy/release patch");
        };
        assert_eq!(deploy.deployment_time, Field::Null);
    }

    #[test]
    fn mttr_converts_minutes_to_hours() {
        let batch = normalize_mttr(&json!([
            { "mttr_minutes": 30.0 },
            { "mttr_minutes": 90.0 }
        ]));
        let CategoryPatch::OperateMonitor(operate) = &batch.category_upserts[0] else {
            panic!("expected an operate/monitor patch");
        };
        assert_eq!(operate.mttr, Field::Set(1.0));
    }
}
