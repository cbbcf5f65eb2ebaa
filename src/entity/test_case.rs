//! TestCase entity for SeaORM.

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_cases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub test_run_id: Uuid,
    pub test_suite_id: Uuid,
    pub title: String,
    pub status: String,
    pub browser: String,
    pub duration_ms: i64,
    pub retry_count: i32,
    pub error_message: Option<String>,
    pub error_stack: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub attachments: JsonValue,
    #[sea_orm(column_type = "JsonBinary")]
    pub annotations: JsonValue,
    pub worker_index: Option<i32>,
    pub started_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test_run::Entity",
        from = "Column::TestRunId",
        to = "super::test_run::Column::Id",
        on_delete = "Cascade"
    )]
    Run,
    #[sea_orm(
        belongs_to = "super::test_suite::Entity",
        from = "Column::TestSuiteId",
        to = "super::test_suite::Column::Id",
        on_delete = "Restrict"
    )]
    TestSuite,
}

impl Related<super::test_run::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Run.def()
    }
}

impl Related<super::test_suite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestSuite.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
