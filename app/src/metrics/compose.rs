use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use crate::entity::{
    build_metrics, code_metrics, cve_vulnerability, deploy_release_metrics, gitleaks_finding,
    operate_monitor_metrics, outdated_package, plan_metrics, project_license, repository, scan,
    test_metrics, zap_alert,
};

use super::catalog::{Category, MetricId};

const NO_DATA: &str = "No data available.";
const NO_CVE_DATA: &str = "No CVE data available.";
const NO_SECRET_DATA: &str = "No secret scan data available.";
const NO_LICENSE_DATA: &str = "No license data available.";
const NO_DEPCHECK_DATA: &str = "No dependency check data available.";
const NO_OUTDATED_DATA: &str = "No outdated package data available.";
const NO_PENTEST_DATA: &str = "No penetration testing data available.";

/// Structured rendering of one ZAP alert. Penetration-testing entries are
/// the only metric whose value is an object list instead of a display
/// string.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AlertView {
    pub alert: String,
    pub description: Option<String>,
    pub solution: Option<String>,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum MetricValue {
    Text(String),
    Alerts(Vec<AlertView>),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MetricEntry {
    pub name: &'static str,
    pub value: MetricValue,
}

/// One scan's report: all six category buckets are always present, even
/// when empty, because downstream renderers index them unconditionally.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ScanReport {
    #[serde(rename = "Plan")]
    pub plan: Vec<MetricEntry>,
    #[serde(rename = "Code")]
    pub code: Vec<MetricEntry>,
    #[serde(rename = "Build")]
    pub build: Vec<MetricEntry>,
    #[serde(rename = "Test")]
    pub test: Vec<MetricEntry>,
    #[serde(rename = "DeployRelease")]
    pub deploy_release: Vec<MetricEntry>,
    #[serde(rename = "OperateMonitor")]
    pub operate_monitor: Vec<MetricEntry>,
}

impl ScanReport {
    fn bucket_mut(&mut self, category: Category) -> &mut Vec<MetricEntry> {
        match category {
            Category::Plan => &mut self.plan,
            Category::Code => &mut self.code,
            Category::Build => &mut self.build,
            Category::Test => &mut self.test,
            Category::DeployRelease => &mut self.deploy_release,
            Category::OperateMonitor => &mut self.operate_monitor,
        }
    }
}

#[derive(Debug, Default)]
struct ScanData {
    code: Option<code_metrics::Model>,
    test: Option<test_metrics::Model>,
    build: Option<build_metrics::Model>,
    plan: Option<plan_metrics::Model>,
    deploy: Option<deploy_release_metrics::Model>,
    operate: Option<operate_monitor_metrics::Model>,
    vulnerabilities: Vec<cve_vulnerability::Model>,
    secrets: Vec<gitleaks_finding::Model>,
    licenses: Vec<project_license::Model>,
    outdated: Vec<outdated_package::Model>,
    zap: Vec<zap_alert::Model>,
}

/// Builds the per-scan, category-grouped report for a repository, oldest
/// scan first. Unknown repositories yield an empty list; a known repository
/// with no scans yields exactly one all-empty report so callers can always
/// index the first entry.
pub async fn compose<C: ConnectionTrait>(
    db: &C,
    repo_name: &str,
) -> Result<Vec<ScanReport>, DbErr> {
    let Some(repo) = repository::Entity::find()
        .filter(repository::Column::Name.eq(repo_name))
        .one(db)
        .await?
    else {
        return Ok(Vec::new());
    };

    let selection = selection_of(&repo);

    let scans = scan::Entity::find()
        .filter(scan::Column::RepositoryId.eq(repo.id))
        .order_by_asc(scan::Column::StartedAt)
        .all(db)
        .await?;

    if scans.is_empty() {
        return Ok(vec![ScanReport::default()]);
    }

    let mut reports = Vec::with_capacity(scans.len());
    for scan_row in scans {
        let data = fetch_scan_data(db, scan_row.id).await?;
        reports.push(render_scan(&selection, &data));
    }

    Ok(reports)
}

/// A repository with no stored selection reports every known metric.
fn selection_of(repo: &repository::Model) -> Vec<MetricId> {
    let Some(stored) = repo.selected_metrics.as_ref() else {
        return MetricId::ALL.to_vec();
    };

    let identifiers: Vec<String> = match serde_json::from_value(stored.clone()) {
        Ok(identifiers) => identifiers,
        Err(error) => {
            tracing::warn!(repo = %repo.name, %error, "unreadable metric selection, reporting everything");
            return MetricId::ALL.to_vec();
        }
    };

    identifiers
        .iter()
        .filter_map(|identifier| {
            let parsed = MetricId::parse(identifier);
            if parsed.is_none() {
                tracing::warn!(repo = %repo.name, identifier, "skipping unknown metric identifier");
            }
            parsed
        })
        .collect()
}

async fn fetch_scan_data<C: ConnectionTrait>(db: &C, scan_id: i32) -> Result<ScanData, DbErr> {
    let (code, test, build, plan, deploy, operate) = tokio::try_join!(
        code_metrics::Entity::find()
            .filter(code_metrics::Column::ScanId.eq(scan_id))
            .one(db),
        test_metrics::Entity::find()
            .filter(test_metrics::Column::ScanId.eq(scan_id))
            .one(db),
        build_metrics::Entity::find()
            .filter(build_metrics::Column::ScanId.eq(scan_id))
            .one(db),
        plan_metrics::Entity::find()
            .filter(plan_metrics::Column::ScanId.eq(scan_id))
            .one(db),
        deploy_release_metrics::Entity::find()
            .filter(deploy_release_metrics::Column::ScanId.eq(scan_id))
            .one(db),
        operate_monitor_metrics::Entity::find()
            .filter(operate_monitor_metrics::Column::ScanId.eq(scan_id))
            .one(db),
    )?;

    let (vulnerabilities, secrets, licenses, outdated, zap) = tokio::try_join!(
        cve_vulnerability::Entity::find()
            .filter(cve_vulnerability::Column::ScanId.eq(scan_id))
            .order_by_asc(cve_vulnerability::Column::Id)
            .all(db),
        gitleaks_finding::Entity::find()
            .filter(gitleaks_finding::Column::ScanId.eq(scan_id))
            .order_by_asc(gitleaks_finding::Column::Id)
            .all(db),
        project_license::Entity::find()
            .filter(project_license::Column::ScanId.eq(scan_id))
            .order_by_asc(project_license::Column::Id)
            .all(db),
        outdated_package::Entity::find()
            .filter(outdated_package::Column::ScanId.eq(scan_id))
            .order_by_asc(outdated_package::Column::Id)
            .all(db),
        zap_alert::Entity::find()
            .filter(zap_alert::Column::ScanId.eq(scan_id))
            .order_by_asc(zap_alert::Column::Id)
            .all(db),
    )?;

    Ok(ScanData {
        code,
        test,
        build,
        plan,
        deploy,
        operate,
        vulnerabilities,
        secrets,
        licenses,
        outdated,
        zap,
    })
}

fn render_scan(selection: &[MetricId], data: &ScanData) -> ScanReport {
    let mut report = ScanReport::default();
    for metric in selection {
        let entry = MetricEntry {
            name: metric.label(),
            value: render_metric(*metric, data),
        };
        report.bucket_mut(metric.category()).push(entry);
    }
    report
}

fn render_metric(metric: MetricId, data: &ScanData) -> MetricValue {
    match metric {
        MetricId::RequirementsCompleteness => {
            percent(data.plan.as_ref().and_then(|p| p.requirements_completeness))
        }
        MetricId::SprintVelocity => percent(
            data.plan
                .as_ref()
                .and_then(|p| p.estimated_vs_completed_story_points),
        ),
        MetricId::SecurityRequirementsCoverage => percent(
            data.plan
                .as_ref()
                .and_then(|p| p.security_requirements_coverage),
        ),
        MetricId::CyclomaticComplexity => {
            number(data.code.as_ref().and_then(|c| c.cyclomatic_complexity))
        }
        MetricId::CognitiveComplexity => {
            number(data.code.as_ref().and_then(|c| c.cognitive_complexity))
        }
        MetricId::CodeSmells => number(data.code.as_ref().and_then(|c| c.code_smells)),
        MetricId::DuplicatedLinesDensity => {
            percent(data.code.as_ref().and_then(|c| c.duplicated_lines_density))
        }
        MetricId::ProgrammingLanguageImpact => number(
            data.code
                .as_ref()
                .and_then(|c| c.programming_language_impact),
        ),
        MetricId::CveVulnerabilities => render_cves(&data.vulnerabilities),
        MetricId::SecretDetection => render_secrets(data),
        MetricId::LicenseScan => render_licenses(&data.licenses),
        MetricId::UnusedLibraries => {
            render_unused_libraries(data.build.as_ref().and_then(|b| b.unused_libraries.as_deref()))
        }
        MetricId::OutdatedPackages => render_outdated(&data.outdated),
        MetricId::TotalCoverage => percent(data.test.as_ref().and_then(|t| t.total_coverage)),
        MetricId::TestSuccessDensity => {
            percent(data.test.as_ref().and_then(|t| t.test_success_density))
        }
        MetricId::SlaTimeBehavior => number(data.test.as_ref().and_then(|t| t.sla_time_behavior)),
        MetricId::SlaResourceUtilization => {
            number(data.test.as_ref().and_then(|t| t.sla_resource_utilization))
        }
        MetricId::SlaCapacity => number(data.test.as_ref().and_then(|t| t.sla_capacity)),
        MetricId::PenetrationTesting => render_zap(&data.zap),
        MetricId::DeploymentTime => {
            number(data.deploy.as_ref().and_then(|d| d.deployment_time))
        }
        MetricId::DeploymentFrequency => {
            number(data.deploy.as_ref().and_then(|d| d.deployment_frequency))
        }
        MetricId::SecurityIncidents => text(
            data.operate
                .as_ref()
                .and_then(|o| o.security_incidents)
                .map(|count| count.to_string()),
            NO_DATA,
        ),
        MetricId::Availability => percent(
            data.operate
                .as_ref()
                .and_then(|o| o.availability_percentage),
        ),
        MetricId::Mttr => number(data.operate.as_ref().and_then(|o| o.mttr)),
        MetricId::UserSatisfaction => {
            number(data.operate.as_ref().and_then(|o| o.user_satisfaction))
        }
        MetricId::DefectDensity => number(data.operate.as_ref().and_then(|o| o.defect_density)),
    }
}

fn text(value: Option<String>, fallback: &str) -> MetricValue {
    MetricValue::Text(value.unwrap_or_else(|| fallback.to_string()))
}

fn percent(value: Option<f64>) -> MetricValue {
    text(value.map(|v| format!("{v:.1}%")), NO_DATA)
}

fn number(value: Option<f64>) -> MetricValue {
    text(value.map(|v| format!("{v:.2}")), NO_DATA)
}

fn render_cves(rows: &[cve_vulnerability::Model]) -> MetricValue {
    if rows.is_empty() {
        return MetricValue::Text(NO_CVE_DATA.to_string());
    }

    let avg = rows.iter().map(|row| row.score).sum::<f64>() / rows.len() as f64;
    let detail = rows
        .iter()
        .map(|row| format!("- {} [{}] → {}", row.cve_id, row.severity, row.score))
        .collect::<Vec<_>>()
        .join("\n");

    MetricValue::Text(format!(
        "Total: {}, Avg CVSS: {:.1}\n{}",
        rows.len(),
        avg,
        detail
    ))
}

fn render_secrets(data: &ScanData) -> MetricValue {
    let recorded_count = data.build.as_ref().and_then(|b| b.secret_detection);
    if recorded_count.is_none() && data.secrets.is_empty() {
        return MetricValue::Text(NO_SECRET_DATA.to_string());
    }

    let count = recorded_count.unwrap_or(data.secrets.len() as i32);
    let mut lines = vec![format!("Total: {count}")];
    for finding in &data.secrets {
        let location = match finding.line_number {
            Some(line) => format!("{}:{}", finding.file_path, line),
            None => finding.file_path.clone(),
        };
        lines.push(format!("- {} → {}", finding.rule, location));
    }

    MetricValue::Text(lines.join("\n"))
}

fn render_licenses(rows: &[project_license::Model]) -> MetricValue {
    if rows.is_empty() {
        return MetricValue::Text(NO_LICENSE_DATA.to_string());
    }

    let mut names: Vec<&str> = rows.iter().map(|row| row.license_name.as_str()).collect();
    names.sort_unstable();
    names.dedup();

    MetricValue::Text(names.join("\n"))
}

fn render_unused_libraries(stored: Option<&str>) -> MetricValue {
    let Some(stored) = stored else {
        return MetricValue::Text(NO_DEPCHECK_DATA.to_string());
    };

    let names: Vec<&str> = stored
        .split(", ")
        .filter(|name| !name.trim().is_empty())
        .collect();
    if names.is_empty() {
        return MetricValue::Text("0".to_string());
    }

    let mut lines = vec![format!("Total: {}", names.len())];
    lines.extend(names.iter().map(|name| format!("- {name}")));
    MetricValue::Text(lines.join("\n"))
}

fn render_outdated(rows: &[outdated_package::Model]) -> MetricValue {
    if rows.is_empty() {
        return MetricValue::Text(NO_OUTDATED_DATA.to_string());
    }

    let lines: Vec<String> = rows
        .iter()
        .map(|row| {
            let installed = row.installed_version.as_deref().unwrap_or("?");
            let fixed = row.fixed_version.as_deref().unwrap_or("?");
            match row.severity.as_deref() {
                Some(severity) => {
                    format!("- {}: {} → {} [{}]", row.package_name, installed, fixed, severity)
                }
                None => format!("- {}: {} → {}", row.package_name, installed, fixed),
            }
        })
        .collect();

    MetricValue::Text(lines.join("\n"))
}

fn render_zap(rows: &[zap_alert::Model]) -> MetricValue {
    if rows.is_empty() {
        return MetricValue::Text(NO_PENTEST_DATA.to_string());
    }

    MetricValue::Alerts(
        rows.iter()
            .map(|row| AlertView {
                alert: row.alert_name.clone(),
                description: row.description.clone(),
                solution: row.solution.clone(),
                reference: row.reference.clone(),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap()
    }

    fn repo_with_selection(selection: Option<serde_json::Value>) -> repository::Model {
        repository::Model {
            id: 1,
            name: "acme/shop".to_string(),
            selected_metrics: selection,
            created_at: ts(),
        }
    }

    #[tokio::test]
    async fn unknown_repository_composes_to_an_empty_list() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<repository::Model>::new()])
            .into_connection();

        let reports = compose(&db, "nobody/nothing").await.unwrap();

        assert!(reports.is_empty());
    }

    #[tokio::test]
    async fn zero_scans_still_yield_one_report_with_all_buckets() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![repo_with_selection(None)]])
            .append_query_results([Vec::<scan::Model>::new()])
            .into_connection();

        let reports = compose(&db, "acme/shop").await.unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0], ScanReport::default());
    }

    #[test]
    fn selection_order_drives_bucket_order_and_missing_data_falls_back() {
        let selection = vec![MetricId::CodeSmells, MetricId::CyclomaticComplexity];
        let data = ScanData {
            code: Some(code_metrics::Model {
                id: 1,
                scan_id: 1,
                cyclomatic_complexity: None,
                cognitive_complexity: None,
                code_smells: Some(20.0),
                duplicated_lines_density: None,
                programming_language_impact: None,
                created_at: ts(),
            }),
            ..Default::default()
        };

        let report = render_scan(&selection, &data);

        assert_eq!(report.code.len(), 2);
        assert_eq!(report.code[0].name, "Code Smells");
        assert_eq!(report.code[0].value, MetricValue::Text("20.00".to_string()));
        assert_eq!(
            report.code[1].value,
            MetricValue::Text(NO_DATA.to_string())
        );
        // unselected buckets exist but stay empty
        assert!(report.build.is_empty());
    }

    #[test]
    fn cve_summary_has_header_and_detail_lines() {
        let rows = vec![
            cve_vulnerability::Model {
                id: 1,
                scan_id: 1,
                cve_id: "CVE-2024-0001".to_string(),
                package_name: Some("lodash".to_string()),
                severity: "HIGH".to_string(),
                score: 8.0,
                created_at: ts(),
            },
            cve_vulnerability::Model {
                id: 2,
                scan_id: 1,
                cve_id: "CVE-2024-0002".to_string(),
                package_name: Some("qs".to_string()),
                severity: "LOW".to_string(),
                score: 3.0,
                created_at: ts(),
            },
        ];

        let MetricValue::Text(summary) = render_cves(&rows) else {
            panic!("CVE summary renders as text");
        };

        assert_eq!(
            summary,
            "Total: 2, Avg CVSS: 5.5\n- CVE-2024-0001 [HIGH] → 8\n- CVE-2024-0002 [LOW] → 3"
        );
    }

    #[test]
    fn license_list_is_deduped_and_sorted() {
        let rows = ["MIT", "Apache-2.0", "MIT"]
            .iter()
            .enumerate()
            .map(|(i, name)| project_license::Model {
                id: i as i32 + 1,
                scan_id: 1,
                license_name: name.to_string(),
                created_at: ts(),
            })
            .collect::<Vec<_>>();

        assert_eq!(
            render_licenses(&rows),
            MetricValue::Text("Apache-2.0\nMIT".to_string())
        );
    }

    #[test]
    fn unused_libraries_render_as_bullets_or_literal_zero() {
        assert_eq!(
            render_unused_libraries(Some("left-pad, grunt")),
            MetricValue::Text("Total: 2\n- left-pad\n- grunt".to_string())
        );
        assert_eq!(render_unused_libraries(Some("")), MetricValue::Text("0".to_string()));
        assert_eq!(
            render_unused_libraries(None),
            MetricValue::Text(NO_DEPCHECK_DATA.to_string())
        );
    }

    #[test]
    fn zap_alerts_render_as_structured_objects() {
        let rows = vec![zap_alert::Model {
            id: 1,
            scan_id: 1,
            alert_name: "Cookie Without Secure Flag".to_string(),
            confidence: Some("2".to_string()),
            solution: Some("Set the Secure flag.".to_string()),
            description: Some("A cookie lacks the Secure flag.".to_string()),
            risk_code: Some("1".to_string()),
            reference: None,
            created_at: ts(),
        }];

        let MetricValue::Alerts(alerts) = render_zap(&rows) else {
            panic!("penetration testing renders as structured alerts");
        };
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert, "Cookie Without Secure Flag");
        assert_eq!(alerts[0].solution.as_deref(), Some("Set the Secure flag."));
    }

    #[test]
    fn secret_summary_prefers_the_recorded_count() {
        let data = ScanData {
            build: Some(build_metrics::Model {
                id: 1,
                scan_id: 1,
                cve_count: None,
                avg_cvss_score: None,
                secret_detection: Some(0),
                license_scan_issues: None,
                unused_libraries: None,
                created_at: ts(),
            }),
            ..Default::default()
        };

        assert_eq!(
            render_secrets(&data),
            MetricValue::Text("Total: 0".to_string())
        );
        assert_eq!(
            render_secrets(&ScanData::default()),
            MetricValue::Text(NO_SECRET_DATA.to_string())
        );
    }
}
