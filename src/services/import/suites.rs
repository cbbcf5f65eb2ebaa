//! Suite reconciliation: map report suites onto persisted suites.

use tracing::info;

use crate::config::ImportDefaults;
use crate::db::DbPool;
use crate::db::test_suites::NewTestSuite;
use crate::entity::test_suite;
use crate::error::AppResult;

/// Suite resolved for the current import.
#[derive(Debug, Clone)]
pub struct ResolvedSuite {
    pub model: test_suite::Model,
    /// This import created the row.
    pub created: bool,
}

/// The `(name, file_path)` identity for a report suite, with defaults applied
/// to absent or empty values.
pub fn suite_identity(
    defaults: &ImportDefaults,
    title: Option<&str>,
    file: Option<&str>,
) -> (String, String) {
    (
        title
            .filter(|t| !t.is_empty())
            .unwrap_or(defaults.suite_title.as_str())
            .to_string(),
        file.filter(|f| !f.is_empty())
            .unwrap_or(defaults.suite_file.as_str())
            .to_string(),
    )
}

/// Looks up or creates suites by `(name, file_path)`.
pub struct SuiteReconciler<'a> {
    pool: &'a DbPool,
    defaults: &'a ImportDefaults,
}

impl<'a> SuiteReconciler<'a> {
    pub fn new(pool: &'a DbPool, defaults: &'a ImportDefaults) -> Self {
        Self { pool, defaults }
    }

    /// Resolve a report suite to its persisted row, creating it on first sight.
    pub async fn reconcile(
        &self,
        title: Option<&str>,
        file: Option<&str>,
    ) -> AppResult<ResolvedSuite> {
        let (name, file_path) = suite_identity(self.defaults, title, file);

        let (model, created) = self
            .pool
            .get_or_create_suite(NewTestSuite {
                description: Some(format!("Test suite for {}", name)),
                name,
                file_path,
            })
            .await?;

        if created {
            info!(suite = %model.name, file_path = %model.file_path, "Suite created");
        }

        Ok(ResolvedSuite { model, created })
    }
}
