//! API endpoint modules.

pub mod health;
pub mod openapi;
pub mod runs;
pub mod stats;
pub mod suites;

use actix_web::web;

use crate::config::defaults;

pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use runs::configure_routes as configure_run_routes;
pub use stats::configure_routes as configure_stats_routes;
pub use suites::configure_routes as configure_suite_routes;

/// Reporting knobs shared with handlers as app data.
#[derive(Debug, Clone, Copy)]
pub struct ReportingSettings {
    /// Lookback, in days, for "recent" counts.
    pub recent_window_days: u32,
}

impl Default for ReportingSettings {
    fn default() -> Self {
        Self {
            recent_window_days: defaults::RECENT_WINDOW_DAYS,
        }
    }
}

/// Mount every read endpoint. Callers wrap this in the `/api/v1` scope.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_health_routes)
        .configure(configure_run_routes)
        .configure(configure_suite_routes)
        .configure(configure_stats_routes);
}
