use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, Set, sea_query::OnConflict,
};

use crate::entity::{
    build_metrics, code_metrics, cve_vulnerability, deploy_release_metrics, gitleaks_finding,
    operate_monitor_metrics, outdated_package, plan_metrics, project_license, test_metrics,
    zap_alert,
};

use super::batch::{
    BuildPatch, CategoryPatch, CodePatch, DeployReleasePatch, Field, ListInserts, NormalizedBatch,
    OperateMonitorPatch, PlanPatch, TestPatch,
};

/// Applies one normalized batch to a scan. Category patches upsert against
/// the per-scan unique key, touching only the columns the adapter owns;
/// list rows follow their table's append/dedup rule. Any failure aborts the
/// submission; the caller surfaces it wholesale.
pub async fn apply<C: ConnectionTrait>(
    db: &C,
    scan_id: i32,
    batch: NormalizedBatch,
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    for patch in batch.category_upserts {
        match patch {
            CategoryPatch::Plan(patch) => upsert_plan(db, scan_id, patch, now).await?,
            CategoryPatch::Code(patch) => upsert_code(db, scan_id, patch, now).await?,
            CategoryPatch::Build(patch) => upsert_build(db, scan_id, patch, now).await?,
            CategoryPatch::Test(patch) => upsert_test(db, scan_id, patch, now).await?,
            CategoryPatch::DeployRelease(patch) => {
                upsert_deploy_release(db, scan_id, patch, now).await?
            }
            CategoryPatch::OperateMonitor(patch) => {
                upsert_operate_monitor(db, scan_id, patch, now).await?
            }
        }
    }

    insert_lists(db, scan_id, batch.lists, now).await
}

fn field_value<T>(field: Field<T>) -> ActiveValue<Option<T>>
where
    Option<T>: Into<sea_orm::Value>,
{
    match field {
        Field::Skip => ActiveValue::NotSet,
        Field::Null => Set(None),
        Field::Set(value) => Set(Some(value)),
    }
}

/// Conflict clause on the per-scan unique key updating exactly the owned
/// columns. An all-skip patch degenerates to do-nothing.
fn scan_conflict<C: ColumnTrait>(key: C, update_columns: Vec<C>) -> OnConflict {
    let mut conflict = OnConflict::column(key);
    if update_columns.is_empty() {
        conflict.do_nothing();
    } else {
        conflict.update_columns(update_columns);
    }
    conflict
}

async fn upsert_plan<C: ConnectionTrait>(
    db: &C,
    scan_id: i32,
    patch: PlanPatch,
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    use plan_metrics::Column;

    let mut columns = Vec::new();
    if !patch.requirements_completeness.is_skip() {
        columns.push(Column::RequirementsCompleteness);
    }
    if !patch.estimated_vs_completed_story_points.is_skip() {
        columns.push(Column::EstimatedVsCompletedStoryPoints);
    }
    if !patch.security_requirements_coverage.is_skip() {
        columns.push(Column::SecurityRequirementsCoverage);
    }

    let model = plan_metrics::ActiveModel {
        scan_id: Set(scan_id),
        requirements_completeness: field_value(patch.requirements_completeness),
        estimated_vs_completed_story_points: field_value(
            patch.estimated_vs_completed_story_points,
        ),
        security_requirements_coverage: field_value(patch.security_requirements_coverage),
        created_at: Set(now),
        ..Default::default()
    };

    plan_metrics::Entity::insert(model)
        .on_conflict(scan_conflict(Column::ScanId, columns))
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn upsert_code<C: ConnectionTrait>(
    db: &C,
    scan_id: i32,
    patch: CodePatch,
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    use code_metrics::Column;

    let mut columns = Vec::new();
    if !patch.cyclomatic_complexity.is_skip() {
        columns.push(Column::CyclomaticComplexity);
    }
    if !patch.cognitive_complexity.is_skip() {
        columns.push(Column::CognitiveComplexity);
    }
    if !patch.code_smells.is_skip() {
        columns.push(Column::CodeSmells);
    }
    if !patch.duplicated_lines_density.is_skip() {
        columns.push(Column::DuplicatedLinesDensity);
    }
    if !patch.programming_language_impact.is_skip() {
        columns.push(Column::ProgrammingLanguageImpact);
    }

    let model = code_metrics::ActiveModel {
        scan_id: Set(scan_id),
        cyclomatic_complexity: field_value(patch.cyclomatic_complexity),
        cognitive_complexity: field_value(patch.cognitive_complexity),
        code_smells: field_value(patch.code_smells),
        duplicated_lines_density: field_value(patch.duplicated_lines_density),
        programming_language_impact: field_value(patch.programming_language_impact),
        created_at: Set(now),
        ..Default::default()
    };

    code_metrics::Entity::insert(model)
        .on_conflict(scan_conflict(Column::ScanId, columns))
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn upsert_build<C: ConnectionTrait>(
    db: &C,
    scan_id: i32,
    patch: BuildPatch,
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    use build_metrics::Column;

    let mut columns = Vec::new();
    if !patch.cve_count.is_skip() {
        columns.push(Column::CveCount);
    }
    if !patch.avg_cvss_score.is_skip() {
        columns.push(Column::AvgCvssScore);
    }
    if !patch.secret_detection.is_skip() {
        columns.push(Column::SecretDetection);
    }
    if !patch.license_scan_issues.is_skip() {
        columns.push(Column::LicenseScanIssues);
    }
    if !patch.unused_libraries.is_skip() {
        columns.push(Column::UnusedLibraries);
    }

    let model = build_metrics::ActiveModel {
        scan_id: Set(scan_id),
        cve_count: field_value(patch.cve_count),
        avg_cvss_score: field_value(patch.avg_cvss_score),
        secret_detection: field_value(patch.secret_detection),
        license_scan_issues: field_value(patch.license_scan_issues),
        unused_libraries: field_value(patch.unused_libraries),
        created_at: Set(now),
        ..Default::default()
    };

    build_metrics::Entity::insert(model)
        .on_conflict(scan_conflict(Column::ScanId, columns))
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn upsert_test<C: ConnectionTrait>(
    db: &C,
    scan_id: i32,
    patch: TestPatch,
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    use test_metrics::Column;

    let mut columns = Vec::new();
    if !patch.total_coverage.is_skip() {
        columns.push(Column::TotalCoverage);
    }
    if !patch.test_success_density.is_skip() {
        columns.push(Column::TestSuccessDensity);
    }
    if !patch.sla_time_behavior.is_skip() {
        columns.push(Column::SlaTimeBehavior);
    }
    if !patch.sla_resource_utilization.is_skip() {
        columns.push(Column::SlaResourceUtilization);
    }
    if !patch.sla_capacity.is_skip() {
        columns.push(Column::SlaCapacity);
    }
    if !patch.penetration_testing.is_skip() {
        columns.push(Column::PenetrationTesting);
    }

    let model = test_metrics::ActiveModel {
        scan_id: Set(scan_id),
        total_coverage: field_value(patch.total_coverage),
        test_success_density: field_value(patch.test_success_density),
        sla_time_behavior: field_value(patch.sla_time_behavior),
        sla_resource_utilization: field_value(patch.sla_resource_utilization),
        sla_capacity: field_value(patch.sla_capacity),
        penetration_testing: field_value(patch.penetration_testing),
        created_at: Set(now),
        ..Default::default()
    };

    test_metrics::Entity::insert(model)
        .on_conflict(scan_conflict(Column::ScanId, columns))
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn upsert_deploy_release<C: ConnectionTrait>(
    db: &C,
    scan_id: i32,
    patch: DeployReleasePatch,
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    use deploy_release_metrics::Column;

    let mut columns = Vec::new();
    if !patch.deployment_time.is_skip() {
        columns.push(Column::DeploymentTime);
    }
    if !patch.deployment_frequency.is_skip() {
        columns.push(Column::DeploymentFrequency);
    }

    let model = deploy_release_metrics::ActiveModel {
        scan_id: Set(scan_id),
        deployment_time: field_value(patch.deployment_time),
        deployment_frequency: field_value(patch.deployment_frequency),
        created_at: Set(now),
        ..Default::default()
    };

    deploy_release_metrics::Entity::insert(model)
        .on_conflict(scan_conflict(Column::ScanId, columns))
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn upsert_operate_monitor<C: ConnectionTrait>(
    db: &C,
    scan_id: i32,
    patch: OperateMonitorPatch,
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    use operate_monitor_metrics::Column;

    let mut columns = Vec::new();
    if !patch.security_incidents.is_skip() {
        columns.push(Column::SecurityIncidents);
    }
    if !patch.availability_percentage.is_skip() {
        columns.push(Column::AvailabilityPercentage);
    }
    if !patch.mttr.is_skip() {
        columns.push(Column::Mttr);
    }
    if !patch.user_satisfaction.is_skip() {
        columns.push(Column::UserSatisfaction);
    }
    if !patch.defect_density.is_skip() {
        columns.push(Column::DefectDensity);
    }

    let model = operate_monitor_metrics::ActiveModel {
        scan_id: Set(scan_id),
        security_incidents: field_value(patch.security_incidents),
        availability_percentage: field_value(patch.availability_percentage),
        mttr: field_value(patch.mttr),
        user_satisfaction: field_value(patch.user_satisfaction),
        defect_density: field_value(patch.defect_density),
        created_at: Set(now),
        ..Default::default()
    };

    operate_monitor_metrics::Entity::insert(model)
        .on_conflict(scan_conflict(Column::ScanId, columns))
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn insert_lists<C: ConnectionTrait>(
    db: &C,
    scan_id: i32,
    lists: ListInserts,
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    for record in lists.vulnerabilities {
        let model = cve_vulnerability::ActiveModel {
            scan_id: Set(scan_id),
            cve_id: Set(record.cve_id),
            package_name: Set(record.package_name),
            severity: Set(record.severity),
            score: Set(record.score),
            created_at: Set(now),
            ..Default::default()
        };
        cve_vulnerability::Entity::insert(model)
            .exec_without_returning(db)
            .await?;
    }

    for finding in lists.secret_findings {
        let model = gitleaks_finding::ActiveModel {
            scan_id: Set(scan_id),
            rule: Set(finding.rule),
            file_path: Set(finding.file_path),
            line_number: Set(finding.line_number),
            description: Set(finding.description),
            detected_at: Set(finding.detected_at),
            created_at: Set(now),
            ..Default::default()
        };
        gitleaks_finding::Entity::insert(model)
            .exec_without_returning(db)
            .await?;
    }

    for license_name in lists.licenses {
        let model = project_license::ActiveModel {
            scan_id: Set(scan_id),
            license_name: Set(license_name),
            created_at: Set(now),
            ..Default::default()
        };
        // unique (scan_id, license_name): re-submissions inside one scan
        // keep the license set stable
        project_license::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    project_license::Column::ScanId,
                    project_license::Column::LicenseName,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    for record in lists.outdated_packages {
        let model = outdated_package::ActiveModel {
            scan_id: Set(scan_id),
            package_name: Set(record.package_name),
            installed_version: Set(record.installed_version),
            fixed_version: Set(record.fixed_version),
            severity: Set(record.severity),
            file_path: Set(record.file_path),
            created_at: Set(now),
            ..Default::default()
        };
        outdated_package::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    outdated_package::Column::ScanId,
                    outdated_package::Column::PackageName,
                ])
                .update_columns([
                    outdated_package::Column::InstalledVersion,
                    outdated_package::Column::FixedVersion,
                    outdated_package::Column::Severity,
                    outdated_package::Column::FilePath,
                ])
                .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    for alert in lists.zap_alerts {
        let model = zap_alert::ActiveModel {
            scan_id: Set(scan_id),
            alert_name: Set(alert.alert_name),
            confidence: Set(alert.confidence),
            solution: Set(alert.solution),
            description: Set(alert.description),
            risk_code: Set(alert.risk_code),
            reference: Set(alert.reference),
            created_at: Set(now),
            ..Default::default()
        };
        zap_alert::Entity::insert(model)
            .exec_without_returning(db)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::metrics::batch::NormalizedBatch;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn code_upsert_touches_only_owned_columns() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([sea_orm::MockExecResult {
                last_insert_id: 1,
                rows_affected: 1,
            }])
            .into_connection();

        let batch = NormalizedBatch {
            category_upserts: vec![CategoryPatch::Code(CodePatch {
                programming_language_impact: Field::Set(1.6),
                ..Default::default()
            })],
            ..Default::default()
        };

        apply(&db, 9, batch, now()).await.unwrap();

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("ON CONFLICT"), "upsert expected, got: {sql}");
        assert!(
            sql.contains("programming_language_impact"),
            "owned column missing: {sql}"
        );
        assert!(
            !sql.contains("cyclomatic_complexity"),
            "unowned column must stay untouched: {sql}"
        );
    }

    #[tokio::test]
    async fn empty_batch_issues_no_statements() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        apply(&db, 9, NormalizedBatch::default(), now()).await.unwrap();

        assert!(db.into_transaction_log().is_empty());
    }
}
