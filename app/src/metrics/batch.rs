use chrono::{DateTime, Utc};

/// Tri-state column value for category upserts. A column the adapter does
/// not own is `Skip` and stays untouched on conflict; an owned column is
/// written even when the payload had nothing for it (`Null`), matching the
/// wholesale overwrite semantics of the per-tool upserts.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Field<T> {
    #[default]
    Skip,
    Null,
    Set(T),
}

impl<T> Field<T> {
    pub fn is_skip(&self) -> bool {
        matches!(self, Field::Skip)
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Field::Set(value) => Some(value),
            Field::Skip | Field::Null => None,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Set(v),
            None => Field::Null,
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct PlanPatch {
    pub requirements_completeness: Field<f64>,
    pub estimated_vs_completed_story_points: Field<f64>,
    pub security_requirements_coverage: Field<f64>,
}

#[derive(Debug, Default, PartialEq)]
pub struct CodePatch {
    pub cyclomatic_complexity: Field<f64>,
    pub cognitive_complexity: Field<f64>,
    pub code_smells: Field<f64>,
    pub duplicated_lines_density: Field<f64>,
    pub programming_language_impact: Field<f64>,
}

#[derive(Debug, Default, PartialEq)]
pub struct BuildPatch {
    pub cve_count: Field<i32>,
    pub avg_cvss_score: Field<f64>,
    pub secret_detection: Field<i32>,
    pub license_scan_issues: Field<i32>,
    pub unused_libraries: Field<String>,
}

#[derive(Debug, Default, PartialEq)]
pub struct TestPatch {
    pub total_coverage: Field<f64>,
    pub test_success_density: Field<f64>,
    pub sla_time_behavior: Field<f64>,
    pub sla_resource_utilization: Field<f64>,
    pub sla_capacity: Field<f64>,
    pub penetration_testing: Field<f64>,
}

#[derive(Debug, Default, PartialEq)]
pub struct DeployReleasePatch {
    pub deployment_time: Field<f64>,
    pub deployment_frequency: Field<f64>,
}

#[derive(Debug, Default, PartialEq)]
pub struct OperateMonitorPatch {
    pub security_incidents: Field<i32>,
    pub availability_percentage: Field<f64>,
    pub mttr: Field<f64>,
    pub user_satisfaction: Field<f64>,
    pub defect_density: Field<f64>,
}

/// One upsert against a category record, keyed on the scan.
#[derive(Debug, PartialEq)]
pub enum CategoryPatch {
    Plan(PlanPatch),
    Code(CodePatch),
    Build(BuildPatch),
    Test(TestPatch),
    DeployRelease(DeployReleasePatch),
    OperateMonitor(OperateMonitorPatch),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CveRecord {
    pub cve_id: String,
    pub package_name: Option<String>,
    pub severity: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SecretFinding {
    pub rule: String,
    pub file_path: String,
    pub line_number: Option<i32>,
    pub description: Option<String>,
    pub detected_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutdatedPackageRecord {
    pub package_name: String,
    pub installed_version: Option<String>,
    pub fixed_version: Option<String>,
    pub severity: Option<String>,
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZapAlertRecord {
    pub alert_name: String,
    pub confidence: Option<String>,
    pub solution: Option<String>,
    pub description: Option<String>,
    pub risk_code: Option<String>,
    pub reference: Option<String>,
}

/// Rows destined for the per-scan list tables.
#[derive(Debug, Default, PartialEq)]
pub struct ListInserts {
    pub vulnerabilities: Vec<CveRecord>,
    pub secret_findings: Vec<SecretFinding>,
    pub licenses: Vec<String>,
    pub outdated_packages: Vec<OutdatedPackageRecord>,
    pub zap_alerts: Vec<ZapAlertRecord>,
}

/// The store-free output of one adapter run: everything the persistence
/// layer needs to apply a submission to a scan.
#[derive(Debug, Default, PartialEq)]
pub struct NormalizedBatch {
    pub category_upserts: Vec<CategoryPatch>,
    pub lists: ListInserts,
}
