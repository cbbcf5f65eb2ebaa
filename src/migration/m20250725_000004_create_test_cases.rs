//! Create test_cases table.
//!
//! Cases are owned by their run (cascade) and reference a shared suite.

use sea_orm_migration::prelude::*;

use super::m20250725_000002_create_test_suites::TestSuites;
use super::m20250725_000003_create_test_runs::TestRuns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestCases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestCases::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestCases::TestRunId).uuid().not_null())
                    .col(ColumnDef::new(TestCases::TestSuiteId).uuid().not_null())
                    .col(ColumnDef::new(TestCases::Title).string_len(500).not_null())
                    .col(ColumnDef::new(TestCases::Status).string_len(20).not_null())
                    .col(ColumnDef::new(TestCases::Browser).string_len(20).not_null())
                    .col(
                        ColumnDef::new(TestCases::DurationMs)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TestCases::RetryCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(TestCases::ErrorMessage).text())
                    .col(ColumnDef::new(TestCases::ErrorStack).text())
                    .col(
                        ColumnDef::new(TestCases::Attachments)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestCases::Annotations)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TestCases::WorkerIndex).integer())
                    .col(
                        ColumnDef::new(TestCases::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_test_cases_test_run_id")
                            .from(TestCases::Table, TestCases::TestRunId)
                            .to(TestRuns::Table, TestRuns::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_test_cases_test_suite_id")
                            .from(TestCases::Table, TestCases::TestSuiteId)
                            .to(TestSuites::Table, TestSuites::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_cases_test_run_id")
                    .table(TestCases::Table)
                    .col(TestCases::TestRunId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_cases_test_suite_id")
                    .table(TestCases::Table)
                    .col(TestCases::TestSuiteId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestCases::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TestCases {
    Table,
    Id,
    TestRunId,
    TestSuiteId,
    Title,
    Status,
    Browser,
    DurationMs,
    RetryCount,
    ErrorMessage,
    ErrorStack,
    Attachments,
    Annotations,
    WorkerIndex,
    StartedAt,
}
