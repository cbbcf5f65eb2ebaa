//! Database operations for test suites.
//!
//! Suites are looked up or created by their `(name, file_path)` identity. The
//! unique index on that pair is the arbiter when two imports race: inserts
//! yield to it with `ON CONFLICT DO NOTHING`.

use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, TryInsertResult,
};
use tracing::debug;
use uuid::Uuid;

use crate::entity::test_suite::{self, ActiveModel, Entity as TestSuite};
use crate::error::{AppError, AppResult};

use super::DbPool;

/// Attempts made by [`DbPool::get_or_create_suite`] before giving up.
const MAX_SUITE_ATTEMPTS: usize = 3;

/// Suite to create when its identity has not been seen yet.
#[derive(Debug, Clone)]
pub struct NewTestSuite {
    pub name: String,
    pub file_path: String,
    pub description: Option<String>,
}

async fn find_by_identity<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    file_path: &str,
) -> Result<Option<test_suite::Model>, DbErr> {
    TestSuite::find()
        .filter(test_suite::Column::Name.eq(name))
        .filter(test_suite::Column::FilePath.eq(file_path))
        .one(conn)
        .await
}

impl DbPool {
    /// Find a suite by its `(name, file_path)` identity.
    pub async fn find_suite(
        &self,
        name: &str,
        file_path: &str,
    ) -> AppResult<Option<test_suite::Model>> {
        find_by_identity(self.connection(), name, file_path)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find test suite: {}", e)))
    }

    /// Return the suite with the given identity, creating it if needed.
    ///
    /// The boolean is `true` when this call inserted the row. The insert runs
    /// first with `ON CONFLICT DO NOTHING` on the identity index, so a call that
    /// loses the race to another import reads back the winner's row. If that
    /// row is not visible yet the whole unit is retried.
    pub async fn get_or_create_suite(
        &self,
        suite: NewTestSuite,
    ) -> AppResult<(test_suite::Model, bool)> {
        for attempt in 1..=MAX_SUITE_ATTEMPTS {
            let txn = self.connection().begin().await?;

            let model = ActiveModel {
                id: Set(Uuid::now_v7()),
                name: Set(suite.name.clone()),
                file_path: Set(suite.file_path.clone()),
                description: Set(suite.description.clone()),
                created_at: Set(Utc::now()),
            };

            let inserted = TestSuite::insert(model)
                .on_conflict_do_nothing_on([test_suite::Column::Name, test_suite::Column::FilePath])
                .exec_without_returning(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to insert test suite: {}", e)))?;
            let created = matches!(inserted, TryInsertResult::Inserted(rows) if rows > 0);

            match find_by_identity(&txn, &suite.name, &suite.file_path).await? {
                Some(resolved) => {
                    txn.commit().await?;
                    return Ok((resolved, created));
                }
                None => {
                    debug!(
                        name = %suite.name,
                        file_path = %suite.file_path,
                        attempt,
                        "Conflicting suite not visible yet, retrying"
                    );
                    txn.rollback().await?;
                }
            }
        }

        Err(AppError::Database(format!(
            "Failed to resolve test suite '{}' ({}) after {} attempts",
            suite.name, suite.file_path, MAX_SUITE_ATTEMPTS
        )))
    }

    /// List all suites ordered by name.
    pub async fn list_suites(&self) -> AppResult<Vec<test_suite::Model>> {
        let result = TestSuite::find()
            .order_by_asc(test_suite::Column::Name)
            .order_by_asc(test_suite::Column::FilePath)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list test suites: {}", e)))?;

        Ok(result)
    }
}
