use actix_web::{web, HttpResponse};
use serde::Serialize;
use time::OffsetDateTime;

use crate::error::AppError;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    app_version: String,
    time: String,
}

/// GET /health
///
/// Liveness probe. All match state lives in-process, so there is no
/// downstream dependency to report on; a 200 here means the server is
/// accepting work.
async fn health() -> Result<HttpResponse, AppError> {
    let app_version = env!("CARGO_PKG_VERSION").to_string();

    let now = OffsetDateTime::now_utc();
    let time = now
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let response = HealthResponse {
        status: "ok".to_string(),
        app_version,
        time,
    };

    Ok(HttpResponse::Ok().json(response))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(health));
}
