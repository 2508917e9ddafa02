use std::collections::HashMap;

use serde_json::Value;

use crate::metrics::batch::{CategoryPatch, CodePatch, Field, NormalizedBatch};
use crate::metrics::energy;

/// Language byte-usage map (the GitHub `/languages` shape) folded into one
/// energy-impact figure via the weighted constant table.
pub fn normalize(payload: &Value) -> NormalizedBatch {
    let usage: HashMap<String, u64> = payload
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(lang, bytes)| bytes.as_u64().map(|b| (lang.clone(), b)))
                .collect()
        })
        .unwrap_or_default();

    NormalizedBatch {
        category_upserts: vec![CategoryPatch::Code(CodePatch {
            programming_language_impact: Field::Set(energy::weighted_energy(&usage)),
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
    fn folds_byte_usage_into_a_single_impact_value() {
        let batch = normalize(&json!({ "C": 600, "Rust": 400 }));

        let CategoryPatch::Code(code) = &batch.category_upserts[0] else {
            panic!("expected a code patch");
        };
        // 0.6 * 1.00 + 0.4 * 1.03
        assert_eq!(code.programming_language_impact, Field::Set(1.01));
        // the other code columns belong to SonarQube
        assert_eq!(code.cyclomatic_complexity, Field::Skip);
    }

    #[test]
    fn empty_or_malformed_usage_yields_zero() {
        let batch = normalize(&json!({}));
        let CategoryPatch::Code(code) = &batch.category_upserts[0] else {
            panic!("expected a code patch");
        };
        assert_eq!(code.programming_language_impact, Field::Set(0.0));

        let batch = normalize(&json!("not a map"));
        let CategoryPatch::Code(code) = &batch.category_upserts[0] else {
            panic!("expected a code patch");
        };
        assert_eq!(code.programming_language_impact, Field::Set(0.0));
    }
}
