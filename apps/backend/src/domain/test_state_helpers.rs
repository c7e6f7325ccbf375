//! Test-only session builders for domain unit tests.

#[cfg(test)]
pub use session_helpers::{
    creator_wallet, opponent_wallet, playing_session, stranger_wallet, waiting_session, TEST_SEED,
};

#[cfg(test)]
mod session_helpers {
    use crate::domain::engine::{self, GameState};
    use crate::domain::session::{GameKind, MatchId, MatchSession, MatchStatus};
    use crate::domain::wallet::WalletAddr;

    pub const TEST_SEED: [u8; 32] = [42u8; 32];

    pub fn creator_wallet() -> WalletAddr {
        WalletAddr::parse("9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin").unwrap()
    }

    pub fn opponent_wallet() -> WalletAddr {
        WalletAddr::parse("So11111111111111111111111111111111111111112").unwrap()
    }

    pub fn stranger_wallet() -> WalletAddr {
        WalletAddr::parse("BPFLoaderUpgradeab1e11111111111111111111111").unwrap()
    }

    /// Fresh Waiting session with a fixed seed and a 100-unit stake.
    pub fn waiting_session(kind: GameKind) -> MatchSession {
        let state = GameState::new_for(kind, &TEST_SEED);
        MatchSession::new(MatchId::generate(), kind, creator_wallet(), 100, state)
    }

    /// Session after a successful join: Playing, creator to act.
    pub fn playing_session(kind: GameKind) -> MatchSession {
        let mut session = waiting_session(kind);
        session.opponent = Some(opponent_wallet());
        session.status = MatchStatus::Playing;
        session.turn = Some(engine::initial_turn(kind));
        session
    }
}
