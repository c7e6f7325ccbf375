//! In-process custody program.
//!
//! Holds stakes for every open match and enforces the escrow rules
//! itself: deposits must match the stake exactly, each party deposits
//! once, a winner can only be assigned when fully funded, payout and
//! refund are mutually exclusive and happen at most once.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info};

use crate::domain::session::MatchId;
use crate::domain::wallet::WalletAddr;
use crate::escrow::account::EscrowAccount;
use crate::escrow::ledger::{EscrowLedger, LedgerError, LedgerOp, TxReceipt};
use crate::logging::wallet_tag;

#[derive(Default)]
pub struct VaultLedger {
    accounts: DashMap<MatchId, EscrowAccount>,
}

impl VaultLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_account<T>(
        &self,
        match_id: &MatchId,
        apply: impl FnOnce(&mut EscrowAccount) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        match self.accounts.get_mut(match_id) {
            Some(mut entry) => apply(entry.value_mut()),
            None => Err(LedgerError::UnknownMatch),
        }
    }
}

#[async_trait::async_trait]
impl EscrowLedger for VaultLedger {
    async fn open(
        &self,
        match_id: &MatchId,
        player1: &WalletAddr,
        stake: u64,
    ) -> Result<TxReceipt, LedgerError> {
        match self.accounts.entry(match_id.clone()) {
            Entry::Occupied(existing) => {
                let acct = existing.get();
                if acct.player1 == *player1 && acct.stake == stake {
                    debug!(match_id = %match_id, "escrow already open with identical terms");
                    Ok(TxReceipt::new(match_id.clone(), LedgerOp::Open, 0))
                } else {
                    Err(LedgerError::Unavailable {
                        reason: format!("escrow for {match_id} exists with different terms"),
                        transient: false,
                    })
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(EscrowAccount::new(
                    match_id.clone(),
                    player1.clone(),
                    stake,
                ));
                info!(match_id = %match_id, stake, "escrow account opened");
                Ok(TxReceipt::new(match_id.clone(), LedgerOp::Open, 0))
            }
        }
    }

    async fn deposit(
        &self,
        match_id: &MatchId,
        payer: &WalletAddr,
        amount: u64,
    ) -> Result<TxReceipt, LedgerError> {
        let receipt = self.with_account(match_id, |acct| {
            if acct.refunded {
                return Err(LedgerError::AlreadyRefunded);
            }
            if acct.claimed {
                return Err(LedgerError::AlreadyClaimed);
            }
            if amount != acct.stake {
                return Err(LedgerError::AmountMismatch {
                    expected: acct.stake,
                    got: amount,
                });
            }

            if *payer == acct.player1 {
                if acct.deposited1 {
                    return Err(LedgerError::AlreadyDeposited);
                }
                acct.deposited1 = true;
            } else if acct.player2.as_ref() == Some(payer) {
                if acct.deposited2 {
                    return Err(LedgerError::AlreadyDeposited);
                }
                acct.deposited2 = true;
            } else if acct.player2.is_none() {
                // First deposit from a second wallet binds that seat.
                acct.player2 = Some(payer.clone());
                acct.deposited2 = true;
            } else {
                return Err(LedgerError::Unauthorized);
            }

            acct.balance += amount;
            Ok(TxReceipt::new(match_id.clone(), LedgerOp::Deposit, amount))
        })?;
        info!(
            match_id = %match_id,
            payer = %wallet_tag(payer.as_str()),
            amount,
            "stake deposited"
        );
        Ok(receipt)
    }

    async fn assign_winner(
        &self,
        match_id: &MatchId,
        winner: &WalletAddr,
    ) -> Result<TxReceipt, LedgerError> {
        self.with_account(match_id, |acct| {
            if acct.refunded {
                return Err(LedgerError::AlreadyRefunded);
            }
            if acct.claimed {
                return Err(LedgerError::AlreadyClaimed);
            }
            if !acct.fully_funded() {
                return Err(LedgerError::DepositsIncomplete);
            }
            if !acct.is_party(winner) {
                return Err(LedgerError::Unauthorized);
            }
            match &acct.winner {
                Some(current) if current == winner => {
                    debug!(match_id = %match_id, "winner already assigned; no-op");
                }
                Some(_) => return Err(LedgerError::WinnerAlreadySet),
                None => {
                    acct.winner = Some(winner.clone());
                    info!(
                        match_id = %match_id,
                        winner = %wallet_tag(winner.as_str()),
                        "winner assigned"
                    );
                }
            }
            Ok(TxReceipt::new(match_id.clone(), LedgerOp::AssignWinner, 0))
        })
    }

    async fn claim(
        &self,
        match_id: &MatchId,
        claimant: &WalletAddr,
    ) -> Result<TxReceipt, LedgerError> {
        let receipt = self.with_account(match_id, |acct| {
            if acct.refunded {
                return Err(LedgerError::AlreadyRefunded);
            }
            if acct.claimed {
                return Err(LedgerError::AlreadyClaimed);
            }
            match &acct.winner {
                Some(winner) if winner == claimant => {
                    let amount = acct.balance;
                    acct.balance = 0;
                    acct.claimed = true;
                    Ok(TxReceipt::new(match_id.clone(), LedgerOp::Claim, amount))
                }
                // No winner yet falls in here too: whoever asks, the
                // answer is the same.
                _ => Err(LedgerError::NotWinner),
            }
        })?;
        info!(
            match_id = %match_id,
            claimant = %wallet_tag(claimant.as_str()),
            amount = receipt.amount,
            "escrow claimed"
        );
        Ok(receipt)
    }

    async fn refund(&self, match_id: &MatchId) -> Result<TxReceipt, LedgerError> {
        let receipt = self.with_account(match_id, |acct| {
            if acct.claimed {
                return Err(LedgerError::AlreadyClaimed);
            }
            if acct.winner.is_some() {
                return Err(LedgerError::WinnerAlreadySet);
            }
            if acct.refunded {
                return Ok(TxReceipt::new(match_id.clone(), LedgerOp::Refund, 0));
            }
            let amount = acct.balance;
            acct.balance = 0;
            acct.refunded = true;
            Ok(TxReceipt::new(match_id.clone(), LedgerOp::Refund, amount))
        })?;
        if receipt.amount > 0 {
            info!(match_id = %match_id, amount = receipt.amount, "deposits refunded");
        }
        Ok(receipt)
    }

    async fn balance(&self, match_id: &MatchId) -> Result<u64, LedgerError> {
        self.accounts
            .get(match_id)
            .map(|entry| entry.balance)
            .ok_or(LedgerError::UnknownMatch)
    }

    async fn account(&self, match_id: &MatchId) -> Result<EscrowAccount, LedgerError> {
        self.accounts
            .get(match_id)
            .map(|entry| entry.clone())
            .ok_or(LedgerError::UnknownMatch)
    }
}
