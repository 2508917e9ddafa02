use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Repositories {
    Table,
    Id,
    Name,
    SelectedMetrics,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Scans {
    Table,
    Id,
    RepositoryId,
    StartedAt,
}

#[derive(DeriveIden)]
enum PlanMetrics {
    Table,
    Id,
    ScanId,
    RequirementsCompleteness,
    EstimatedVsCompletedStoryPoints,
    SecurityRequirementsCoverage,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CodeMetrics {
    Table,
    Id,
    ScanId,
    CyclomaticComplexity,
    CognitiveComplexity,
    CodeSmells,
    DuplicatedLinesDensity,
    ProgrammingLanguageImpact,
    CreatedAt,
}

#[derive(DeriveIden)]
enum BuildMetrics {
    Table,
    Id,
    ScanId,
    CveCount,
    AvgCvssScore,
    SecretDetection,
    LicenseScanIssues,
    UnusedLibraries,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TestMetrics {
    Table,
    Id,
    ScanId,
    TotalCoverage,
    TestSuccessDensity,
    SlaTimeBehavior,
    SlaResourceUtilization,
    SlaCapacity,
    PenetrationTesting,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DeployReleaseMetrics {
    Table,
    Id,
    ScanId,
    DeploymentTime,
    DeploymentFrequency,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OperateMonitorMetrics {
    Table,
    Id,
    ScanId,
    SecurityIncidents,
    AvailabilityPercentage,
    Mttr,
    UserSatisfaction,
    DefectDensity,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CveVulnerabilities {
    Table,
    Id,
    ScanId,
    CveId,
    PackageName,
    Severity,
    Score,
    CreatedAt,
}

#[derive(DeriveIden)]
enum GitleaksFindings {
    Table,
    Id,
    ScanId,
    Rule,
    FilePath,
    LineNumber,
    Description,
    DetectedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ProjectLicenses {
    Table,
    Id,
    ScanId,
    LicenseName,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OutdatedPackages {
    Table,
    Id,
    ScanId,
    PackageName,
    InstalledVersion,
    FixedVersion,
    Severity,
    FilePath,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ZapAlerts {
    Table,
    Id,
    ScanId,
    AlertName,
    Confidence,
    Solution,
    Description,
    RiskCode,
    Reference,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Repositories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Repositories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Repositories::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Repositories::SelectedMetrics).json().null())
                    .col(
                        ColumnDef::new(Repositories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Scans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Scans::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Scans::RepositoryId).integer().not_null())
                    .col(
                        ColumnDef::new(Scans::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-scans-repository_id")
                            .from(Scans::Table, Scans::RepositoryId)
                            .to(Repositories::Table, Repositories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlanMetrics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlanMetrics::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlanMetrics::ScanId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(PlanMetrics::RequirementsCompleteness)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PlanMetrics::EstimatedVsCompletedStoryPoints)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PlanMetrics::SecurityRequirementsCoverage)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PlanMetrics::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-plan_metrics-scan_id")
                            .from(PlanMetrics::Table, PlanMetrics::ScanId)
                            .to(Scans::Table, Scans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CodeMetrics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CodeMetrics::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CodeMetrics::ScanId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(CodeMetrics::CyclomaticComplexity)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CodeMetrics::CognitiveComplexity)
                            .double()
                            .null(),
                    )
                    .col(ColumnDef::new(CodeMetrics::CodeSmells).double().null())
                    .col(
                        ColumnDef::new(CodeMetrics::DuplicatedLinesDensity)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CodeMetrics::ProgrammingLanguageImpact)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CodeMetrics::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-code_metrics-scan_id")
                            .from(CodeMetrics::Table, CodeMetrics::ScanId)
                            .to(Scans::Table, Scans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BuildMetrics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BuildMetrics::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BuildMetrics::ScanId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(BuildMetrics::CveCount).integer().null())
                    .col(ColumnDef::new(BuildMetrics::AvgCvssScore).double().null())
                    .col(ColumnDef::new(BuildMetrics::SecretDetection).integer().null())
                    .col(ColumnDef::new(BuildMetrics::LicenseScanIssues).integer().null())
                    .col(ColumnDef::new(BuildMetrics::UnusedLibraries).text().null())
                    .col(
                        ColumnDef::new(BuildMetrics::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-build_metrics-scan_id")
                            .from(BuildMetrics::Table, BuildMetrics::ScanId)
                            .to(Scans::Table, Scans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TestMetrics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestMetrics::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TestMetrics::ScanId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(TestMetrics::TotalCoverage).double().null())
                    .col(ColumnDef::new(TestMetrics::TestSuccessDensity).double().null())
                    .col(ColumnDef::new(TestMetrics::SlaTimeBehavior).double().null())
                    .col(
                        ColumnDef::new(TestMetrics::SlaResourceUtilization)
                            .double()
                            .null(),
                    )
                    .col(ColumnDef::new(TestMetrics::SlaCapacity).double().null())
                    .col(ColumnDef::new(TestMetrics::PenetrationTesting).double().null())
                    .col(
                        ColumnDef::new(TestMetrics::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-test_metrics-scan_id")
                            .from(TestMetrics::Table, TestMetrics::ScanId)
                            .to(Scans::Table, Scans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DeployReleaseMetrics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeployReleaseMetrics::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DeployReleaseMetrics::ScanId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(DeployReleaseMetrics::DeploymentTime)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(DeployReleaseMetrics::DeploymentFrequency)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(DeployReleaseMetrics::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-deploy_release_metrics-scan_id")
                            .from(DeployReleaseMetrics::Table, DeployReleaseMetrics::ScanId)
                            .to(Scans::Table, Scans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OperateMonitorMetrics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OperateMonitorMetrics::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OperateMonitorMetrics::ScanId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(OperateMonitorMetrics::SecurityIncidents)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(OperateMonitorMetrics::AvailabilityPercentage)
                            .double()
                            .null(),
                    )
                    .col(ColumnDef::new(OperateMonitorMetrics::Mttr).double().null())
                    .col(
                        ColumnDef::new(OperateMonitorMetrics::UserSatisfaction)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(OperateMonitorMetrics::DefectDensity)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(OperateMonitorMetrics::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-operate_monitor_metrics-scan_id")
                            .from(OperateMonitorMetrics::Table, OperateMonitorMetrics::ScanId)
                            .to(Scans::Table, Scans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CveVulnerabilities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CveVulnerabilities::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CveVulnerabilities::ScanId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CveVulnerabilities::CveId).string().not_null())
                    .col(ColumnDef::new(CveVulnerabilities::PackageName).string().null())
                    .col(ColumnDef::new(CveVulnerabilities::Severity).string().not_null())
                    .col(ColumnDef::new(CveVulnerabilities::Score).double().not_null())
                    .col(
                        ColumnDef::new(CveVulnerabilities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cve_vulnerabilities-scan_id")
                            .from(CveVulnerabilities::Table, CveVulnerabilities::ScanId)
                            .to(Scans::Table, Scans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GitleaksFindings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GitleaksFindings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GitleaksFindings::ScanId).integer().not_null())
                    .col(ColumnDef::new(GitleaksFindings::Rule).string().not_null())
                    .col(ColumnDef::new(GitleaksFindings::FilePath).text().not_null())
                    .col(ColumnDef::new(GitleaksFindings::LineNumber).integer().null())
                    .col(ColumnDef::new(GitleaksFindings::Description).text().null())
                    .col(
                        ColumnDef::new(GitleaksFindings::DetectedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GitleaksFindings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-gitleaks_findings-scan_id")
                            .from(GitleaksFindings::Table, GitleaksFindings::ScanId)
                            .to(Scans::Table, Scans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectLicenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProjectLicenses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProjectLicenses::ScanId).integer().not_null())
                    .col(
                        ColumnDef::new(ProjectLicenses::LicenseName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProjectLicenses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-project_licenses-scan_id")
                            .from(ProjectLicenses::Table, ProjectLicenses::ScanId)
                            .to(Scans::Table, Scans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-project_licenses-scan_id-license_name")
                    .table(ProjectLicenses::Table)
                    .col(ProjectLicenses::ScanId)
                    .col(ProjectLicenses::LicenseName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OutdatedPackages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OutdatedPackages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OutdatedPackages::ScanId).integer().not_null())
                    .col(
                        ColumnDef::new(OutdatedPackages::PackageName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OutdatedPackages::InstalledVersion)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(OutdatedPackages::FixedVersion).string().null())
                    .col(ColumnDef::new(OutdatedPackages::Severity).string().null())
                    .col(ColumnDef::new(OutdatedPackages::FilePath).text().null())
                    .col(
                        ColumnDef::new(OutdatedPackages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-outdated_packages-scan_id")
                            .from(OutdatedPackages::Table, OutdatedPackages::ScanId)
                            .to(Scans::Table, Scans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-outdated_packages-scan_id-package_name")
                    .table(OutdatedPackages::Table)
                    .col(OutdatedPackages::ScanId)
                    .col(OutdatedPackages::PackageName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ZapAlerts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ZapAlerts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ZapAlerts::ScanId).integer().not_null())
                    .col(ColumnDef::new(ZapAlerts::AlertName).string().not_null())
                    .col(ColumnDef::new(ZapAlerts::Confidence).string().null())
                    .col(ColumnDef::new(ZapAlerts::Solution).text().null())
                    .col(ColumnDef::new(ZapAlerts::Description).text().null())
                    .col(ColumnDef::new(ZapAlerts::RiskCode).string().null())
                    .col(ColumnDef::new(ZapAlerts::Reference).text().null())
                    .col(
                        ColumnDef::new(ZapAlerts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-zap_alerts-scan_id")
                            .from(ZapAlerts::Table, ZapAlerts::ScanId)
                            .to(Scans::Table, Scans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ZapAlerts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OutdatedPackages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectLicenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GitleaksFindings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CveVulnerabilities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OperateMonitorMetrics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DeployReleaseMetrics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TestMetrics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BuildMetrics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CodeMetrics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlanMetrics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Scans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Repositories::Table).to_owned())
            .await?;

        Ok(())
    }
}
