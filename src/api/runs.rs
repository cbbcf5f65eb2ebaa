//! Run API endpoints.

use actix_web::{HttpResponse, get, web};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{RunDetail, RunListQuery, RunListResponse};
use crate::services::reporting;

/// Configure run routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_runs).service(get_run);
}

/// List runs, newest first.
///
/// GET /runs?status=failed&date_from=2025-07-01&date_to=2025-07-31&page=1&limit=20
#[utoipa::path(
    get,
    path = "/api/v1/runs",
    tag = "Runs",
    params(
        ("status" = Option<String>, Query, description = "Run status (running, passed, failed, error)"),
        ("date_from" = Option<String>, Query, description = "First start date, inclusive (YYYY-MM-DD, UTC)"),
        ("date_to" = Option<String>, Query, description = "Last start date, inclusive (YYYY-MM-DD, UTC)"),
        ("page" = Option<u32>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u32>, Query, description = "Items per page (default: 20, max: 100)")
    ),
    responses(
        (status = 200, description = "List of runs", body = RunListResponse),
        (status = 400, description = "Invalid filter", body = crate::error::ErrorResponse)
    )
)]
#[get("/runs")]
pub async fn list_runs(
    pool: web::Data<DbPool>,
    query: web::Query<RunListQuery>,
) -> AppResult<HttpResponse> {
    let response = reporting::list_runs(&pool, &query).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Get a run with its cases grouped by suite.
///
/// GET /runs/{id}
#[utoipa::path(
    get,
    path = "/api/v1/runs/{id}",
    tag = "Runs",
    params(
        ("id" = String, Path, description = "Run UUID")
    ),
    responses(
        (status = 200, description = "Run details", body = RunDetail),
        (status = 400, description = "Invalid run ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Run not found", body = crate::error::ErrorResponse)
    )
)]
#[get("/runs/{id}")]
pub async fn get_run(pool: web::Data<DbPool>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = Uuid::parse_str(&path.into_inner())?;
    let detail = reporting::run_detail(&pool, id).await?;
    Ok(HttpResponse::Ok().json(detail))
}
