//! Suite API endpoints.

use actix_web::{HttpResponse, get, web};

use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::SuiteSummary;
use crate::services::reporting;

use super::ReportingSettings;

/// Configure suite routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_suites);
}

/// List suites ordered by name with total and recent case counts.
#[utoipa::path(
    get,
    path = "/api/v1/suites",
    tag = "Suites",
    responses(
        (status = 200, description = "List of suites", body = Vec<SuiteSummary>)
    )
)]
#[get("/suites")]
pub async fn list_suites(
    pool: web::Data<DbPool>,
    settings: web::Data<ReportingSettings>,
) -> AppResult<HttpResponse> {
    let suites = reporting::list_suites_with_counts(&pool, settings.recent_window_days).await?;
    Ok(HttpResponse::Ok().json(suites))
}
