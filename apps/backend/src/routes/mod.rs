use actix_web::web;

pub mod escrow;
pub mod health;
pub mod matches;
pub mod realtime;

/// Configure application routes for tests and non-HttpServer contexts.
///
/// In production, `main.rs` wires these under the same scopes with the
/// full middleware stack (CORS, structured logging, trace ids). Tests
/// register identical paths without those wrappers so endpoint behavior
/// can be exercised directly.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Match lifecycle and escrow routes: /api/matches/**
    cfg.service(
        web::scope("/api/matches")
            .configure(matches::configure_routes)
            .configure(escrow::configure_routes),
    );

    // Realtime routes: /api/ws/**
    cfg.service(web::scope("/api/ws").configure(realtime::configure_routes));
}
