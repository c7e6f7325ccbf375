#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod escrow;
pub mod extractors;
pub mod http;
pub mod infra;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod trace_ctx;
pub mod utils;
pub mod ws;


// Re-exports for public API
pub use config::app::AppConfig;
pub use domain::session::{GameKind, MatchId, MatchOutcome, MatchSession, MatchStatus, Seat};
pub use domain::view::SessionView;
pub use domain::wallet::WalletAddr;
pub use error::AppError;
pub use errors::ErrorCode;
pub use escrow::{EscrowCoordinator, EscrowLedger, VaultLedger};
pub use extractors::match_ref::MatchRef;
pub use extractors::player_wallet::{MaybeWallet, PlayerWallet, WALLET_HEADER};
pub use extractors::validated_json::ValidatedJson;
pub use infra::state::build_state;
pub use middleware::cors::cors_middleware;
pub use middleware::request_trace::RequestTrace;
pub use middleware::structured_logger::StructuredLogger;
pub use middleware::trace_span::TraceSpan;
pub use services::match_flow::{DeadlineScheduler, MatchFlowService};
pub use state::app_state::AppState;
pub use store::{MemorySessionStore, SessionStore};

// Prelude for test convenience
pub mod prelude {
    pub use super::config::*;
    pub use super::domain::*;
    pub use super::error::*;
    pub use super::escrow::*;
    pub use super::extractors::*;
    pub use super::infra::*;
    pub use super::middleware::*;
    pub use super::state::*;
    pub use super::store::*;
}

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
