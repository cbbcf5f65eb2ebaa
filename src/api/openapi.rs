//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Testing Dashboard API",
        version = "0.1.0",
        description = "Read-only reporting over imported Playwright runs, suites and cases"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Run endpoints
        api::runs::list_runs,
        api::runs::get_run,
        // Suite endpoints
        api::suites::list_suites,
        // Statistics endpoints
        api::stats::dashboard,
        api::stats::daily_stats,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            models::Pagination,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Runs
            models::RunStatus,
            models::RunSummary,
            models::RunListResponse,
            models::RunDetail,
            models::SuiteGroup,
            models::CaseResponse,
            models::CaseStatus,
            models::Engine,
            models::EngineStats,
            // Suites
            models::SuiteSummary,
            // Statistics
            models::DashboardSummary,
            models::ChartData,
            api::stats::StatsQuery,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Runs", description = "Imported test runs"),
        (name = "Suites", description = "Suites seen across runs"),
        (name = "Statistics", description = "Dashboard aggregates and chart data")
    )
)]
pub struct ApiDoc;
