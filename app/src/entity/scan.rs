use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// One logical aggregation unit: every tool submission for a repository
/// within the grouping window lands on the same scan row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "scans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub repository_id: i32,
    pub started_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::repository::Entity",
        from = "Column::RepositoryId",
        to = "super::repository::Column::Id"
    )]
    Repository,
    #[sea_orm(has_many = "super::code_metrics::Entity")]
    CodeMetrics,
    #[sea_orm(has_many = "super::test_metrics::Entity")]
    TestMetrics,
    #[sea_orm(has_many = "super::build_metrics::Entity")]
    BuildMetrics,
    #[sea_orm(has_many = "super::plan_metrics::Entity")]
    PlanMetrics,
    #[sea_orm(has_many = "super::deploy_release_metrics::Entity")]
    DeployReleaseMetrics,
    #[sea_orm(has_many = "super::operate_monitor_metrics::Entity")]
    OperateMonitorMetrics,
    #[sea_orm(has_many = "super::cve_vulnerability::Entity")]
    CveVulnerability,
    #[sea_orm(has_many = "super::gitleaks_finding::Entity")]
    GitleaksFinding,
    #[sea_orm(has_many = "super::project_license::Entity")]
    ProjectLicense,
    #[sea_orm(has_many = "super::outdated_package::Entity")]
    OutdatedPackage,
    #[sea_orm(has_many = "super::zap_alert::Entity")]
    ZapAlert,
}

impl Related<super::repository::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Repository.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
