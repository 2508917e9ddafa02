use std::collections::{BTreeSet, HashMap};

use serde::Deserialize;
use serde_json::Value;

use crate::metrics::batch::{
    BuildPatch, CategoryPatch, CveRecord, Field, NormalizedBatch, OutdatedPackageRecord,
};

const UNKNOWN_CVE: &str = "Unknown CVE";
const UNKNOWN_SEVERITY: &str = "UNKNOWN";

// Native `trivy ... --format json` report.

#[derive(Debug, Default, Deserialize)]
struct NativeReport {
    #[serde(default, rename = "Results")]
    results: Vec<NativeResult>,
}

#[derive(Debug, Default, Deserialize)]
struct NativeResult {
    #[serde(rename = "Target")]
    target: Option<String>,
    #[serde(default, rename = "Vulnerabilities")]
    vulnerabilities: Vec<NativeVulnerability>,
    #[serde(default, rename = "Licenses")]
    licenses: Vec<NativeLicense>,
}

#[derive(Debug, Default, Deserialize)]
struct NativeVulnerability {
    #[serde(rename = "VulnerabilityID")]
    vulnerability_id: Option<String>,
    #[serde(rename = "PkgName")]
    pkg_name: Option<String>,
    #[serde(rename = "InstalledVersion")]
    installed_version: Option<String>,
    #[serde(rename = "FixedVersion")]
    fixed_version: Option<String>,
    #[serde(rename = "Severity")]
    severity: Option<String>,
    #[serde(default, rename = "CVSS")]
    cvss: Cvss,
}

#[derive(Debug, Default, Deserialize)]
struct Cvss {
    ghsa: Option<CvssSource>,
    nvd: Option<CvssSource>,
}

#[derive(Debug, Default, Deserialize)]
struct CvssSource {
    #[serde(
        rename = "V3Score",
        default,
        deserialize_with = "crate::serde::deserialize_lenient_number"
    )]
    v3_score: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct NativeLicense {
    #[serde(rename = "Name")]
    name: Option<String>,
}

// CycloneDX SBOM with embedded vulnerabilities.

#[derive(Debug, Default, Deserialize)]
struct CycloneDxBom {
    #[serde(default)]
    components: Vec<CdxComponent>,
    #[serde(default)]
    vulnerabilities: Vec<CdxVulnerability>,
}

#[derive(Debug, Default, Deserialize)]
struct CdxComponent {
    #[serde(rename = "bom-ref")]
    bom_ref: Option<String>,
    name: Option<String>,
    #[serde(default)]
    licenses: Vec<CdxLicenseChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct CdxLicenseChoice {
    license: Option<CdxLicense>,
    expression: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CdxLicense {
    id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CdxVulnerability {
    id: Option<String>,
    #[serde(default)]
    ratings: Vec<CdxRating>,
    #[serde(default)]
    affects: Vec<CdxAffect>,
}

#[derive(Debug, Default, Deserialize)]
struct CdxRating {
    #[serde(default, deserialize_with = "crate::serde::deserialize_lenient_number")]
    score: Option<f64>,
    severity: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CdxAffect {
    #[serde(rename = "ref")]
    bom_ref: Option<String>,
}

/// Trivy emits two shapes depending on how the pipeline invokes it: the
/// native scan report (`Results[]`) and a CycloneDX SBOM whose
/// vulnerabilities reference components by bom-ref. Both reduce to the same
/// batch: deduped CVE rows, a license set, upgrade candidates, and the
/// aggregate build record.
pub fn normalize(payload: &Value) -> NormalizedBatch {
    if payload.get("Results").is_some() {
        normalize_native(payload)
    } else {
        normalize_cyclonedx(payload)
    }
}

fn normalize_native(payload: &Value) -> NormalizedBatch {
    let report: NativeReport = serde_json::from_value(payload.clone()).unwrap_or_default();

    let mut vulnerabilities = Vec::new();
    let mut licenses = BTreeSet::new();
    let mut outdated = Vec::new();

    for result in &report.results {
        for vuln in &result.vulnerabilities {
            let score = vuln
                .cvss
                .ghsa
                .as_ref()
                .and_then(|source| source.v3_score)
                .or_else(|| vuln.cvss.nvd.as_ref().and_then(|source| source.v3_score));

            // Only scored vulnerabilities persist.
            if let Some(score) = score {
                vulnerabilities.push(CveRecord {
                    cve_id: vuln
                        .vulnerability_id
                        .clone()
                        .unwrap_or_else(|| UNKNOWN_CVE.to_string()),
                    package_name: vuln.pkg_name.clone(),
                    severity: vuln
                        .severity
                        .clone()
                        .unwrap_or_else(|| UNKNOWN_SEVERITY.to_string()),
                    score,
                });
            }

            if let Some(candidate) = upgrade_candidate(vuln, result.target.as_deref()) {
                outdated.push(candidate);
            }
        }

        for license in &result.licenses {
            if let Some(name) = license.name.as_deref().filter(|name| !name.is_empty()) {
                licenses.insert(name.to_string());
            }
        }
    }

    into_batch(vulnerabilities, licenses, outdated)
}

fn normalize_cyclonedx(payload: &Value) -> NormalizedBatch {
    let bom: CycloneDxBom = serde_json::from_value(payload.clone()).unwrap_or_default();

    let components: HashMap<&str, &CdxComponent> = bom
        .components
        .iter()
        .filter_map(|component| {
            component
                .bom_ref
                .as_deref()
                .map(|bom_ref| (bom_ref, component))
        })
        .collect();

    let mut vulnerabilities = Vec::new();
    for vuln in &bom.vulnerabilities {
        let Some(score) = vuln.ratings.first().and_then(|rating| rating.score) else {
            continue;
        };
        let cve_id = vuln
            .id
            .clone()
            .unwrap_or_else(|| UNKNOWN_CVE.to_string());
        let severity = vuln
            .ratings
            .first()
            .and_then(|rating| rating.severity.clone())
            .unwrap_or_else(|| UNKNOWN_SEVERITY.to_string());

        let affected: Vec<Option<String>> = if vuln.affects.is_empty() {
            vec![None]
        } else {
            vuln.affects
                .iter()
                .map(|affect| {
                    affect
                        .bom_ref
                        .as_deref()
                        .and_then(|bom_ref| components.get(bom_ref))
                        .and_then(|component| component.name.clone())
                })
                .collect()
        };

        for package_name in affected {
            vulnerabilities.push(CveRecord {
                cve_id: cve_id.clone(),
                package_name,
                severity: severity.clone(),
                score,
            });
        }
    }

    let mut licenses = BTreeSet::new();
    for component in &bom.components {
        for choice in &component.licenses {
            let name = choice
                .license
                .as_ref()
                .and_then(|license| license.id.clone().or_else(|| license.name.clone()))
                .or_else(|| choice.expression.clone());
            if let Some(name) = name.filter(|name| !name.is_empty()) {
                licenses.insert(name);
            }
        }
    }

    into_batch(vulnerabilities, licenses, Vec::new())
}

fn upgrade_candidate(
    vuln: &NativeVulnerability,
    target: Option<&str>,
) -> Option<OutdatedPackageRecord> {
    let package_name = vuln.pkg_name.clone()?;
    let fixed = vuln.fixed_version.as_deref().filter(|v| !v.is_empty())?;
    if vuln.installed_version.as_deref() == Some(fixed) {
        return None;
    }

    Some(OutdatedPackageRecord {
        package_name,
        installed_version: vuln.installed_version.clone(),
        fixed_version: Some(fixed.to_string()),
        severity: vuln.severity.clone(),
        file_path: target.map(str::to_string),
    })
}

/// Batch-level dedup on (cve id, package name); the last occurrence wins.
fn dedup_last_wins(records: Vec<CveRecord>) -> Vec<CveRecord> {
    let mut order: Vec<(String, Option<String>)> = Vec::new();
    let mut by_key: HashMap<(String, Option<String>), CveRecord> = HashMap::new();

    for record in records {
        let key = (record.cve_id.clone(), record.package_name.clone());
        if !by_key.contains_key(&key) {
            order.push(key.clone());
        }
        by_key.insert(key, record);
    }

    order.into_iter().filter_map(|key| by_key.remove(&key)).collect()
}

fn into_batch(
    vulnerabilities: Vec<CveRecord>,
    licenses: BTreeSet<String>,
    outdated: Vec<OutdatedPackageRecord>,
) -> NormalizedBatch {
    let vulnerabilities = dedup_last_wins(vulnerabilities);

    let avg_score = if vulnerabilities.is_empty() {
        None
    } else {
        Some(
            vulnerabilities.iter().map(|record| record.score).sum::<f64>()
                / vulnerabilities.len() as f64,
        )
    };

    let build = BuildPatch {
        cve_count: Field::Set(vulnerabilities.len() as i32),
        avg_cvss_score: avg_score.into(),
        license_scan_issues: Field::Set(licenses.len() as i32),
        ..Default::default()
    };

    let mut batch = NormalizedBatch {
        category_upserts: vec![CategoryPatch::Build(build)],
        ..Default::default()
    };
    batch.lists.vulnerabilities = vulnerabilities;
    batch.lists.licenses = licenses.into_iter().collect();
    batch.lists.outdated_packages = outdated;
    batch
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn native_report_prefers_ghsa_scores_and_dedups_last_wins() {
        let payload = json!({
            "Results": [{
                "Target": "package-lock.json",
                "Vulnerabilities": [
                    {
                        "VulnerabilityID": "CVE-2024-0001",
                        "PkgName": "lodash",
                        "Severity": "HIGH",
                        "CVSS": { "ghsa": { "V3Score": 8.1 }, "nvd": { "V3Score": 7.0 } }
                    },
                    {
                        "VulnerabilityID": "CVE-2024-0001",
                        "PkgName": "lodash",
                        "Severity": "HIGH",
                        "CVSS": { "nvd": { "V3Score": 7.5 } }
                    },
                    {
                        "VulnerabilityID": "CVE-2024-0002",
                        "PkgName": "minimist",
                        "Severity": "LOW",
                        "CVSS": {}
                    }
                ]
            }]
        });

        let batch = normalize(&payload);

        // the unscored CVE-2024-0002 is dropped, the duplicate collapses
        assert_eq!(batch.lists.vulnerabilities.len(), 1);
        let record = &batch.lists.vulnerabilities[0];
        assert_eq!(record.cve_id, "CVE-2024-0001");
        assert_eq!(record.score, 7.5);
    }

    #[test]
    fn native_report_extracts_upgrade_candidates_and_licenses() {
        let payload = json!({
            "Results": [{
                "Target": "package-lock.json",
                "Vulnerabilities": [{
                    "VulnerabilityID": "CVE-2024-0003",
                    "PkgName": "qs",
                    "InstalledVersion": "6.5.2",
                    "FixedVersion": "6.5.3",
                    "Severity": "MEDIUM",
                    "CVSS": { "nvd": { "V3Score": 5.3 } }
                }],
                "Licenses": [
                    { "Name": "MIT" },
                    { "Name": "Apache-2.0" },
                    { "Name": "MIT" }
                ]
            }]
        });

        let batch = normalize(&payload);

        assert_eq!(batch.lists.licenses, vec!["Apache-2.0", "MIT"]);
        assert_eq!(batch.lists.outdated_packages.len(), 1);
        let outdated = &batch.lists.outdated_packages[0];
        assert_eq!(outdated.package_name, "qs");
        assert_eq!(outdated.installed_version.as_deref(), Some("6.5.2"));
        assert_eq!(outdated.fixed_version.as_deref(), Some("6.5.3"));
        assert_eq!(outdated.file_path.as_deref(), Some("package-lock.json"));
    }

    #[test]
    fn fixed_version_equal_to_installed_is_not_an_upgrade() {
        let payload = json!({
            "Results": [{
                "Vulnerabilities": [{
                    "VulnerabilityID": "CVE-2024-0004",
                    "PkgName": "express",
                    "InstalledVersion": "4.18.2",
                    "FixedVersion": "4.18.2",
                    "CVSS": { "nvd": { "V3Score": 4.0 } }
                }]
            }]
        });

        assert!(normalize(&payload).lists.outdated_packages.is_empty());
    }

    #[test]
    fn cyclonedx_joins_packages_through_bom_refs() {
        let payload = json!({
            "bomFormat": "CycloneDX",
            "components": [{
                "bom-ref": "pkg:npm/axios@0.21.0",
                "name": "axios",
                "licenses": [{ "license": { "id": "MIT" } }]
            }],
            "vulnerabilities": [{
                "id": "GHSA-xxxx",
                "ratings": [{ "score": 9.8, "severity": "critical" }],
                "affects": [{ "ref": "pkg:npm/axios@0.21.0" }]
            }]
        });

        let batch = normalize(&payload);

        assert_eq!(batch.lists.vulnerabilities.len(), 1);
        let record = &batch.lists.vulnerabilities[0];
        assert_eq!(record.package_name.as_deref(), Some("axios"));
        assert_eq!(record.score, 9.8);
        assert_eq!(record.severity, "critical");
        assert_eq!(batch.lists.licenses, vec!["MIT"]);
    }

    #[test]
    fn aggregate_build_record_reflects_the_deduped_batch() {
        let payload = json!({
            "Results": [{
                "Vulnerabilities": [
                    {
                        "VulnerabilityID": "CVE-1",
                        "PkgName": "a",
                        "CVSS": { "nvd": { "V3Score": 4.0 } }
                    },
                    {
                        "VulnerabilityID": "CVE-2",
                        "PkgName": "b",
                        "CVSS": { "nvd": { "V3Score": 8.0 } }
                    }
                ],
                "Licenses": [{ "Name": "MIT" }]
            }]
        });

        let batch = normalize(&payload);
        let CategoryPatch::Build(build) = &batch.category_upserts[0] else {
            panic!("expected a build patch");
        };
        assert_eq!(build.cve_count, Field::Set(2));
        assert_eq!(build.avg_cvss_score, Field::Set(6.0));
        assert_eq!(build.license_scan_issues, Field::Set(1));
        // secret detection stays with the GitLeaks adapter
        assert_eq!(build.secret_detection, Field::Skip);
    }
}
