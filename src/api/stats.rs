//! Dashboard and chart statistics endpoints.

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{ChartData, DashboardSummary};
use crate::services::reporting;

use super::ReportingSettings;

/// Lookback used by `/stats` when none is given.
const DEFAULT_STATS_DAYS: u32 = 7;

/// Query parameters for the chart endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StatsQuery {
    /// Lookback window in days (default 7).
    pub days: Option<u32>,
}

/// Configure statistics routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard).service(daily_stats);
}

/// Store-wide totals, recent activity, latest runs and most active suites.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "Statistics",
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardSummary)
    )
)]
#[get("/dashboard")]
pub async fn dashboard(
    pool: web::Data<DbPool>,
    settings: web::Data<ReportingSettings>,
) -> AppResult<HttpResponse> {
    let summary = reporting::dashboard_summary(&pool, settings.recent_window_days).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Daily run counts and success rates.
///
/// GET /stats?days=7
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    tag = "Statistics",
    params(
        ("days" = Option<u32>, Query, description = "Lookback window in days (default: 7, max: 366)")
    ),
    responses(
        (status = 200, description = "Daily buckets", body = ChartData),
        (status = 400, description = "Invalid window", body = crate::error::ErrorResponse)
    )
)]
#[get("/stats")]
pub async fn daily_stats(
    pool: web::Data<DbPool>,
    query: web::Query<StatsQuery>,
) -> AppResult<HttpResponse> {
    let chart = reporting::daily_stats(&pool, query.days.unwrap_or(DEFAULT_STATS_DAYS)).await?;
    Ok(HttpResponse::Ok().json(chart))
}
