//! Aggregate read queries backing the reporting endpoints.
//!
//! Queries here return raw projections; shaping into response types lives in
//! `services::reporting`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, EntityTrait, JoinType, QueryFilter, QuerySelect, RelationTrait,
};
use uuid::Uuid;

use crate::entity::test_case::{self, Entity as TestCase};
use crate::entity::test_run;
use crate::error::{AppError, AppResult};

use super::DbPool;

/// `(browser, status, duration_ms)` of one case.
pub type EngineRow = (String, String, i64);

impl DbPool {
    /// Browser, status and duration of every case, optionally for one run.
    pub async fn engine_rows(&self, run_id: Option<Uuid>) -> AppResult<Vec<EngineRow>> {
        let mut select = TestCase::find()
            .select_only()
            .column(test_case::Column::Browser)
            .column(test_case::Column::Status)
            .column(test_case::Column::DurationMs);

        if let Some(run_id) = run_id {
            select = select.filter(test_case::Column::TestRunId.eq(run_id));
        }

        let rows = select
            .into_tuple::<EngineRow>()
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load engine rows: {}", e)))?;

        Ok(rows)
    }

    /// Number of cases per suite.
    ///
    /// With `since`, only cases whose run started at or after that instant count.
    pub async fn suite_case_counts(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> AppResult<HashMap<Uuid, u64>> {
        let mut select = TestCase::find()
            .select_only()
            .column(test_case::Column::TestSuiteId)
            .column_as(test_case::Column::Id.count(), "case_count")
            .group_by(test_case::Column::TestSuiteId);

        if let Some(since) = since {
            select = select
                .join(JoinType::InnerJoin, test_case::Relation::Run.def())
                .filter(test_run::Column::StartedAt.gte(since));
        }

        let rows = select
            .into_tuple::<(Uuid, i64)>()
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count cases per suite: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|(suite_id, count)| (suite_id, count.max(0) as u64))
            .collect())
    }
}
