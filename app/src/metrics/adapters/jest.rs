use serde::Deserialize;
use serde_json::Value;

use crate::metrics::batch::{CategoryPatch, NormalizedBatch, TestPatch};

#[derive(Debug, Default, Deserialize)]
struct Payload {
    #[serde(
        rename = "numPassedTests",
        default,
        deserialize_with = "crate::serde::deserialize_lenient_number"
    )]
    passed: Option<f64>,
    #[serde(
        rename = "numTotalTests",
        default,
        deserialize_with = "crate::serde::deserialize_lenient_number"
    )]
    total: Option<f64>,
}

/// Jest `--json` summary: success density is the passed/total ratio as a
/// percentage, absent when the run had no tests.
pub fn normalize(payload: &Value) -> NormalizedBatch {
    let payload: Payload = serde_json::from_value(payload.clone()).unwrap_or_default();

    let success_density = match (payload.passed, payload.total) {
        (Some(passed), Some(total)) if total > 0.0 => Some(passed / total * 100.0),
        _ => None,
    };

    NormalizedBatch {
        category_upserts: vec![CategoryPatch::Test(TestPatch {
            test_success_density: success_density.into(),
            ..Default::default()
        })],
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::metrics::batch::Field;

    fn density(payload: Value) -> Field<f64> {
        let batch = normalize(&payload);
        let CategoryPatch::Test(test) = &batch.category_upserts[0] else {
            panic!("expected a test patch");
        };
        test.test_success_density.clone()
    }

    #[test]
    fn computes_percentage_of_passing_tests() {
        assert_eq!(
            density(json!({ "numPassedTests": 45, "numTotalTests": 50 })),
            Field::Set(90.0)
        );
    }

    #[test]
    fn empty_suite_yields_no_density() {
        assert_eq!(
            density(json!({ "numPassedTests": 0, "numTotalTests": 0 })),
            Field::Null
        );
        assert_eq!(density(json!({})), Field::Null);
    }
}
