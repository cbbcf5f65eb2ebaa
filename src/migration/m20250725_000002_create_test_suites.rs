//! Create test_suites table.
//!
//! `(name, file_path)` is unique so concurrent imports cannot create the same
//! suite twice.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestSuites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestSuites::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestSuites::Name).string_len(200).not_null())
                    .col(
                        ColumnDef::new(TestSuites::FilePath)
                            .string_len(500)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TestSuites::Description).text())
                    .col(
                        ColumnDef::new(TestSuites::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_suites_name_file_path")
                    .table(TestSuites::Table)
                    .col(TestSuites::Name)
                    .col(TestSuites::FilePath)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestSuites::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TestSuites {
    Table,
    Id,
    Name,
    FilePath,
    Description,
    CreatedAt,
}
