//! Custody account state, as held by the ledger.

use serde::Serialize;

use crate::domain::session::MatchId;
use crate::domain::wallet::WalletAddr;

/// Lifecycle of one match's escrow, derived from the account fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowPhase {
    Created,
    PartiallyFunded,
    FullyFunded,
    WinnerAssigned,
    Claimed,
    Refunded,
}

/// One match's custody record. The ledger is the authority for every
/// field here; the session only mirrors the deposit flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EscrowAccount {
    pub match_id: MatchId,
    /// Match creator; fixed at open time.
    pub player1: WalletAddr,
    /// Bound at the first deposit from a wallet other than player1.
    pub player2: Option<WalletAddr>,
    /// Required deposit per player, in base units.
    pub stake: u64,
    pub deposited1: bool,
    pub deposited2: bool,
    /// Set at most once, only to a depositor, only when fully funded.
    pub winner: Option<WalletAddr>,
    pub claimed: bool,
    pub refunded: bool,
    /// Funds currently held: deposits in, payouts and refunds out.
    pub balance: u64,
}

impl EscrowAccount {
    pub fn new(match_id: MatchId, player1: WalletAddr, stake: u64) -> Self {
        Self {
            match_id,
            player1,
            player2: None,
            stake,
            deposited1: false,
            deposited2: false,
            winner: None,
            claimed: false,
            refunded: false,
            balance: 0,
        }
    }

    pub fn fully_funded(&self) -> bool {
        self.deposited1 && self.deposited2
    }

    pub fn is_party(&self, wallet: &WalletAddr) -> bool {
        *wallet == self.player1 || self.player2.as_ref() == Some(wallet)
    }

    pub fn phase(&self) -> EscrowPhase {
        if self.refunded {
            EscrowPhase::Refunded
        } else if self.claimed {
            EscrowPhase::Claimed
        } else if self.winner.is_some() {
            EscrowPhase::WinnerAssigned
        } else if self.fully_funded() {
            EscrowPhase::FullyFunded
        } else if self.deposited1 || self.deposited2 {
            EscrowPhase::PartiallyFunded
        } else {
            EscrowPhase::Created
        }
    }
}
