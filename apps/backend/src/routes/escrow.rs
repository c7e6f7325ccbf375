//! Escrow HTTP routes, nested under a match.
//!
//! These are thin shims over the escrow coordinator; every custody
//! invariant (matching amounts, one deposit per side, winner-only
//! claims) is enforced by the ledger itself.

use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::escrow::{EscrowAccount, EscrowPhase};
use crate::extractors::match_ref::MatchRef;
use crate::extractors::player_wallet::PlayerWallet;
use crate::extractors::validated_json::ValidatedJson;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    /// Must equal the match stake exactly.
    pub amount: u64,
}

#[derive(Debug, Serialize)]
struct EscrowAccountResponse {
    phase: EscrowPhase,
    #[serde(flatten)]
    account: EscrowAccount,
}

/// POST /api/matches/{match_id}/escrow/deposit
///
/// Deposits the caller's stake. At most once per seat; if the match
/// already completed, settlement is re-dispatched so a late deposit
/// still releases funds.
async fn deposit(
    match_ref: MatchRef,
    wallet: PlayerWallet,
    body: ValidatedJson<DepositRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let match_id = match_ref.into_inner();
    let wallet = wallet.into_inner();

    let receipt = app_state
        .escrow
        .fund(&match_id, &wallet, body.amount)
        .await?;

    Ok(HttpResponse::Ok().json(receipt))
}

/// POST /api/matches/{match_id}/escrow/claim
///
/// Pays the full pot out to the assigned winner. At most once.
async fn claim(
    match_ref: MatchRef,
    wallet: PlayerWallet,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let match_id = match_ref.into_inner();
    let wallet = wallet.into_inner();

    let receipt = app_state.escrow.claim(&match_id, &wallet).await?;

    Ok(HttpResponse::Ok().json(receipt))
}

/// GET /api/matches/{match_id}/escrow
///
/// Account view with the derived lifecycle phase. Escrow state is
/// public; it holds nothing a block explorer would not show.
async fn get_account(
    match_ref: MatchRef,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let match_id = match_ref.into_inner();

    let account = app_state.escrow.account(&match_id).await?;

    Ok(HttpResponse::Ok().json(EscrowAccountResponse {
        phase: account.phase(),
        account,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/{match_id}/escrow").route(web::get().to(get_account)));
    cfg.service(web::resource("/{match_id}/escrow/deposit").route(web::post().to(deposit)));
    cfg.service(web::resource("/{match_id}/escrow/claim").route(web::post().to(claim)));
}
