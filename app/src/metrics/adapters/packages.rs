use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::metrics::batch::{
    BuildPatch, CategoryPatch, Field, NormalizedBatch, OutdatedPackageRecord,
};

#[derive(Debug, Default, Deserialize)]
struct DepcheckPayload {
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: Vec<String>,
}

/// Depcheck output: unused runtime and dev dependencies, stored as one
/// comma-joined text field.
pub fn normalize_depcheck(payload: &Value) -> NormalizedBatch {
    let payload: DepcheckPayload = serde_json::from_value(payload.clone()).unwrap_or_default();

    let unused = payload
        .dependencies
        .iter()
        .chain(payload.dev_dependencies.iter())
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");

    NormalizedBatch {
        category_upserts: vec![CategoryPatch::Build(BuildPatch {
            unused_libraries: Field::Set(unused),
            ..Default::default()
        })],
        ..Default::default()
    }
}

#[derive(Debug, Default, Deserialize)]
struct OutdatedEntry {
    current: Option<String>,
    latest: Option<String>,
    wanted: Option<String>,
}

/// `npm outdated --json` output: a map of package name to version info.
/// Uses a BTreeMap so rows land in a stable order.
pub fn normalize_outdated(payload: &Value) -> NormalizedBatch {
    let entries: BTreeMap<String, OutdatedEntry> =
        serde_json::from_value(payload.clone()).unwrap_or_default();

    let mut batch = NormalizedBatch::default();
    batch.lists.outdated_packages = entries
        .into_iter()
        .map(|(package_name, entry)| OutdatedPackageRecord {
            package_name,
            installed_version: entry.current,
            fixed_version: entry.latest.or(entry.wanted),
            severity: None,
            file_path: None,
        })
        .collect();
    batch
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn joins_unused_dependencies_across_both_sections() {
        let payload = json!({
            "dependencies": ["left-pad", "moment"],
            "devDependencies": ["grunt"]
        });

        let batch = normalize_depcheck(&payload);
        let CategoryPatch::Build(build) = &batch.category_upserts[0] else {
            panic!("expected a build patch");
        };
        assert_eq!(
            build.unused_libraries,
            Field::Set("left-pad, moment, grunt".to_string())
        );
    }

    #[test]
    fn no_unused_dependencies_stores_an_empty_list() {
        let batch = normalize_depcheck(&json!({}));
        let CategoryPatch::Build(build) = &batch.category_upserts[0] else {
            panic!("expected a build patch");
        };
        assert_eq!(build.unused_libraries, Field::Set(String::new()));
    }

    #[test]
    fn outdated_map_becomes_upgrade_rows() {
        let payload = json!({
            "express": { "current": "4.17.1", "wanted": "4.17.3", "latest": "4.18.2" },
            "axios": { "current": "0.21.0", "wanted": "0.21.4" }
        });

        let batch = normalize_outdated(&payload);
        let rows = &batch.lists.outdated_packages;
        assert_eq!(rows.len(), 2);
        // BTreeMap ordering: axios first
        assert_eq!(rows[0].package_name, "axios");
        assert_eq!(rows[0].fixed_version.as_deref(), Some("0.21.4"));
        assert_eq!(rows[1].package_name, "express");
        assert_eq!(rows[1].installed_version.as_deref(), Some("4.17.1"));
        assert_eq!(rows[1].fixed_version.as_deref(), Some("4.18.2"));
    }
}
