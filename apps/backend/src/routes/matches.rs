//! Match lifecycle HTTP routes.

use actix_web::http::header::{ETAG, IF_MATCH, IF_NONE_MATCH};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use serde::Deserialize;

use crate::domain::moves::MoveAction;
use crate::domain::session::GameKind;
use crate::domain::view::SessionView;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::match_ref::MatchRef;
use crate::extractors::player_wallet::{MaybeWallet, PlayerWallet};
use crate::extractors::validated_json::ValidatedJson;
use crate::http::etag::{match_etag, parse_match_version_from_etag};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    pub game: GameKind,
    pub stake: u64,
}

#[derive(Debug, Deserialize)]
pub struct SubmitMoveRequest {
    pub action: MoveAction,
    /// Optimistic concurrency guard. `If-Match` takes precedence when
    /// both header and body carry a version.
    pub expected_version: Option<u64>,
}

/// POST /api/matches
///
/// Creates a match in `Waiting` with the caller seated as creator. The
/// returned match id doubles as the invite code to hand the opponent.
async fn create_match(
    wallet: PlayerWallet,
    body: ValidatedJson<CreateMatchRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let wallet = wallet.into_inner();
    let req = body.into_inner();

    let session = app_state
        .match_flow
        .create_match(wallet.clone(), req.game, req.stake)
        .await?;

    let etag_value = match_etag(&session.id, session.version);
    let view = SessionView::for_viewer(&session, Some(&wallet));
    Ok(HttpResponse::Created()
        .insert_header((ETAG, etag_value))
        .json(view))
}

/// POST /api/matches/{match_id}/join
///
/// Seats the caller as opponent and starts play. Exactly one of any
/// number of concurrent joiners wins the seat; the rest see MATCH_FULL.
async fn join_match(
    match_ref: MatchRef,
    wallet: PlayerWallet,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let match_id = match_ref.into_inner();
    let wallet = wallet.into_inner();

    let session = app_state
        .match_flow
        .join_match(&match_id, wallet.clone())
        .await?;

    let etag_value = match_etag(&session.id, session.version);
    let view = SessionView::for_viewer(&session, Some(&wallet));
    Ok(HttpResponse::Ok()
        .insert_header((ETAG, etag_value))
        .json(view))
}

/// POST /api/matches/{match_id}/moves
///
/// Applies one move for the calling player. The expected version can
/// ride in an `If-Match` ETag or in the body; omitting both submits
/// against whatever is live. A stale version is rejected without
/// touching the match.
async fn submit_move(
    http_req: HttpRequest,
    match_ref: MatchRef,
    wallet: PlayerWallet,
    body: ValidatedJson<SubmitMoveRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let match_id = match_ref.into_inner();
    let wallet = wallet.into_inner();
    let req = body.into_inner();

    let expected_version = match http_req.headers().get(IF_MATCH) {
        Some(raw) => {
            let tag = raw.to_str().map_err(|_| {
                AppError::bad_request(ErrorCode::InvalidHeader, "If-Match header must be ASCII")
            })?;
            Some(parse_match_version_from_etag(tag)?)
        }
        None => req.expected_version,
    };

    let session = app_state
        .match_flow
        .submit_move(&match_id, &wallet, req.action, expected_version)
        .await?;

    let etag_value = match_etag(&session.id, session.version);
    let view = SessionView::for_viewer(&session, Some(&wallet));
    Ok(HttpResponse::Ok()
        .insert_header((ETAG, etag_value))
        .json(view))
}

/// POST /api/matches/{match_id}/resign
async fn resign(
    match_ref: MatchRef,
    wallet: PlayerWallet,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let match_id = match_ref.into_inner();
    let wallet = wallet.into_inner();

    let session = app_state.match_flow.resign(&match_id, &wallet).await?;

    let etag_value = match_etag(&session.id, session.version);
    let view = SessionView::for_viewer(&session, Some(&wallet));
    Ok(HttpResponse::Ok()
        .insert_header((ETAG, etag_value))
        .json(view))
}

/// POST /api/matches/{match_id}/cancel
async fn cancel_match(
    match_ref: MatchRef,
    wallet: PlayerWallet,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let match_id = match_ref.into_inner();
    let wallet = wallet.into_inner();

    let session = app_state.match_flow.cancel_match(&match_id, &wallet).await?;

    let etag_value = match_etag(&session.id, session.version);
    let view = SessionView::for_viewer(&session, Some(&wallet));
    Ok(HttpResponse::Ok()
        .insert_header((ETAG, etag_value))
        .json(view))
}

/// GET /api/matches/{match_id}
///
/// Viewer-redacted snapshot with an ETag for optimistic concurrency.
/// Anyone may read; the wallet header only widens what the view shows.
///
/// Supports `If-None-Match` for HTTP caching: if the client's ETag
/// matches the current version, returns `304 Not Modified` with no body.
async fn get_match(
    http_req: HttpRequest,
    match_ref: MatchRef,
    viewer: MaybeWallet,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let match_id = match_ref.into_inner();
    let viewer = viewer.into_inner();

    let session = app_state.match_flow.get_match(&match_id).await?;
    let etag_value = match_etag(&session.id, session.version);

    // Check If-None-Match header for HTTP caching
    if let Some(if_none_match) = http_req.headers().get(IF_NONE_MATCH) {
        if let Ok(client_etag) = if_none_match.to_str() {
            // Check for wildcard match (RFC 9110) or specific ETag match
            // Wildcard "*" means "any representation exists"
            let matches = client_etag.trim() == "*"
                || client_etag
                    .split(',')
                    .map(str::trim)
                    .any(|etag| etag == etag_value);

            if matches {
                // Resource hasn't changed, return 304 Not Modified
                return Ok(HttpResponse::build(StatusCode::NOT_MODIFIED)
                    .insert_header((ETAG, etag_value))
                    .finish());
            }
        }
    }

    let view = SessionView::for_viewer(&session, viewer.as_ref());
    Ok(HttpResponse::Ok()
        .insert_header((ETAG, etag_value))
        .json(view))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::post().to(create_match)));
    cfg.service(web::resource("/{match_id}").route(web::get().to(get_match)));
    cfg.service(web::resource("/{match_id}/join").route(web::post().to(join_match)));
    cfg.service(web::resource("/{match_id}/moves").route(web::post().to(submit_move)));
    cfg.service(web::resource("/{match_id}/resign").route(web::post().to(resign)));
    cfg.service(web::resource("/{match_id}/cancel").route(web::post().to(cancel_match)));
}
