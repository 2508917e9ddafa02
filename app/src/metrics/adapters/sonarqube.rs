use serde::Deserialize;
use serde_json::Value;

use crate::metrics::batch::{CategoryPatch, CodePatch, NormalizedBatch, TestPatch};

#[derive(Debug, Default, Deserialize)]
struct Payload {
    #[serde(default)]
    component: Component,
}

#[derive(Debug, Default, Deserialize)]
struct Component {
    #[serde(default)]
    measures: Vec<Measure>,
}

#[derive(Debug, Deserialize)]
struct Measure {
    metric: String,
    #[serde(default, deserialize_with = "crate::serde::deserialize_lenient_number")]
    value: Option<f64>,
}

/// SonarQube measures-API response. Complexity values are normalized per
/// function and code smells converted to a per-KLOC density; duplication
/// and coverage pass through unscaled.
pub fn normalize(payload: &Value) -> NormalizedBatch {
    let payload: Payload = serde_json::from_value(payload.clone()).unwrap_or_default();

    let measure = |key: &str| {
        payload
            .component
            .measures
            .iter()
            .find(|m| m.metric == key)
            .and_then(|m| m.value)
    };

    let cyclomatic = measure("complexity");
    let cognitive = measure("cognitive_complexity");
    let code_smells = measure("code_smells");
    let duplication = measure("duplicated_lines_density");
    let coverage = measure("coverage");
    let functions = measure("functions");
    let ncloc = measure("ncloc");

    let per_function = |value: Option<f64>| match (value, functions) {
        (Some(v), Some(f)) if f > 0.0 => Some(v / f),
        _ => None,
    };

    let smell_density = match (code_smells, ncloc) {
        (Some(smells), Some(ncloc)) if ncloc > 0.0 => Some(smells / ncloc * 1000.0),
        _ => None,
    };

    NormalizedBatch {
        category_upserts: vec![
            CategoryPatch::Code(CodePatch {
                cyclomatic_complexity: per_function(cyclomatic).into(),
                cognitive_complexity: per_function(cognitive).into(),
                code_smells: smell_density.into(),
                duplicated_lines_density: duplication.into(),
                ..Default::default()
            }),
            CategoryPatch::Test(TestPatch {
                total_coverage: coverage.into(),
                ..Default::default()
            }),
        ],
        ..Default::default()
    }
}
