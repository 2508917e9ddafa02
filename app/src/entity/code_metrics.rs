use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Per-scan code quality record. `scan_id` is unique; repeated SonarQube or
/// language-impact submissions within one scan overwrite in place.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "code_metrics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub scan_id: i32,
    /// Cyclomatic complexity normalized per function.
    pub cyclomatic_complexity: Option<f64>,
    /// Cognitive complexity normalized per function.
    pub cognitive_complexity: Option<f64>,
    /// Code smells per KLOC.
    pub code_smells: Option<f64>,
    pub duplicated_lines_density: Option<f64>,
    /// Byte-weighted language energy impact in joules.
    pub programming_language_impact: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::scan::Entity",
        from = "Column::ScanId",
        to = "super::scan::Column::Id"
    )]
    Scan,
}

impl Related<super::scan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
