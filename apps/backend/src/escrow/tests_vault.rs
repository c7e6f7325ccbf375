use proptest::prelude::*;

use crate::domain::session::MatchId;
use crate::domain::test_state_helpers::{creator_wallet, opponent_wallet, stranger_wallet};
use crate::domain::wallet::WalletAddr;
use crate::escrow::account::EscrowPhase;
use crate::escrow::ledger::{EscrowLedger, LedgerError};
use crate::escrow::vault::VaultLedger;

const STAKE: u64 = 100;

async fn open_vault() -> (VaultLedger, MatchId) {
    let vault = VaultLedger::new();
    let id = MatchId::generate();
    vault.open(&id, &creator_wallet(), STAKE).await.unwrap();
    (vault, id)
}

async fn funded_vault() -> (VaultLedger, MatchId) {
    let (vault, id) = open_vault().await;
    vault.deposit(&id, &creator_wallet(), STAKE).await.unwrap();
    vault.deposit(&id, &opponent_wallet(), STAKE).await.unwrap();
    (vault, id)
}

#[tokio::test]
async fn open_and_account_round_trip() {
    let (vault, id) = open_vault().await;
    let acct = vault.account(&id).await.unwrap();
    assert_eq!(acct.player1, creator_wallet());
    assert_eq!(acct.stake, STAKE);
    assert_eq!(acct.phase(), EscrowPhase::Created);
    assert_eq!(vault.balance(&id).await.unwrap(), 0);
}

#[tokio::test]
async fn reopen_with_same_terms_is_a_noop() {
    let (vault, id) = open_vault().await;
    let receipt = vault.open(&id, &creator_wallet(), STAKE).await.unwrap();
    assert_eq!(receipt.amount, 0);
}

#[tokio::test]
async fn reopen_with_different_terms_is_rejected() {
    let (vault, id) = open_vault().await;
    let err = vault.open(&id, &creator_wallet(), STAKE + 1).await.unwrap_err();
    assert!(matches!(err, LedgerError::Unavailable { transient: false, .. }));
}

#[tokio::test]
async fn unknown_match_errors() {
    let vault = VaultLedger::new();
    let ghost = MatchId::generate();
    assert!(matches!(
        vault.deposit(&ghost, &creator_wallet(), STAKE).await,
        Err(LedgerError::UnknownMatch)
    ));
    assert!(matches!(
        vault.balance(&ghost).await,
        Err(LedgerError::UnknownMatch)
    ));
}

#[tokio::test]
async fn deposit_must_match_stake_exactly() {
    let (vault, id) = open_vault().await;
    for wrong in [0, STAKE - 1, STAKE + 1, STAKE * 2] {
        let err = vault
            .deposit(&id, &creator_wallet(), wrong)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::AmountMismatch {
                expected: STAKE,
                got: wrong
            }
        );
    }
    assert_eq!(vault.balance(&id).await.unwrap(), 0);
}

#[tokio::test]
async fn first_foreign_deposit_binds_player2() {
    let (vault, id) = open_vault().await;
    vault.deposit(&id, &opponent_wallet(), STAKE).await.unwrap();

    let acct = vault.account(&id).await.unwrap();
    assert_eq!(acct.player2, Some(opponent_wallet()));
    assert!(acct.deposited2);
    assert!(!acct.deposited1);
    assert_eq!(acct.phase(), EscrowPhase::PartiallyFunded);
}

#[tokio::test]
async fn double_deposit_rejected_and_balance_unchanged() {
    let (vault, id) = open_vault().await;
    vault.deposit(&id, &creator_wallet(), STAKE).await.unwrap();

    let err = vault
        .deposit(&id, &creator_wallet(), STAKE)
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::AlreadyDeposited);
    assert_eq!(vault.balance(&id).await.unwrap(), STAKE);
}

#[tokio::test]
async fn third_wallet_cannot_deposit() {
    let (vault, id) = funded_vault().await;
    let err = vault
        .deposit(&id, &stranger_wallet(), STAKE)
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::Unauthorized);
    assert_eq!(vault.balance(&id).await.unwrap(), 2 * STAKE);
}

#[tokio::test]
async fn winner_needs_full_funding() {
    let (vault, id) = open_vault().await;
    vault.deposit(&id, &creator_wallet(), STAKE).await.unwrap();

    let err = vault
        .assign_winner(&id, &creator_wallet())
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::DepositsIncomplete);
}

#[tokio::test]
async fn winner_must_be_a_party() {
    let (vault, id) = funded_vault().await;
    let err = vault
        .assign_winner(&id, &stranger_wallet())
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::Unauthorized);
}

#[tokio::test]
async fn winner_assignment_is_idempotent_for_same_winner_only() {
    let (vault, id) = funded_vault().await;
    vault.assign_winner(&id, &creator_wallet()).await.unwrap();
    vault.assign_winner(&id, &creator_wallet()).await.unwrap();

    let err = vault
        .assign_winner(&id, &opponent_wallet())
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::WinnerAlreadySet);
    assert_eq!(
        vault.account(&id).await.unwrap().phase(),
        EscrowPhase::WinnerAssigned
    );
}

#[tokio::test]
async fn claim_pays_the_pot_exactly_once() {
    let (vault, id) = funded_vault().await;
    vault.assign_winner(&id, &opponent_wallet()).await.unwrap();

    let receipt = vault.claim(&id, &opponent_wallet()).await.unwrap();
    assert_eq!(receipt.amount, 2 * STAKE);
    assert_eq!(vault.balance(&id).await.unwrap(), 0);
    assert_eq!(vault.account(&id).await.unwrap().phase(), EscrowPhase::Claimed);

    let err = vault.claim(&id, &opponent_wallet()).await.unwrap_err();
    assert_eq!(err, LedgerError::AlreadyClaimed);
}

#[tokio::test]
async fn only_the_winner_may_claim() {
    let (vault, id) = funded_vault().await;

    // No winner assigned yet.
    let err = vault.claim(&id, &creator_wallet()).await.unwrap_err();
    assert_eq!(err, LedgerError::NotWinner);

    vault.assign_winner(&id, &creator_wallet()).await.unwrap();
    let err = vault.claim(&id, &opponent_wallet()).await.unwrap_err();
    assert_eq!(err, LedgerError::NotWinner);
    assert_eq!(vault.balance(&id).await.unwrap(), 2 * STAKE);
}

#[tokio::test]
async fn refund_returns_partial_deposits() {
    let (vault, id) = open_vault().await;
    vault.deposit(&id, &creator_wallet(), STAKE).await.unwrap();

    let receipt = vault.refund(&id).await.unwrap();
    assert_eq!(receipt.amount, STAKE);
    assert_eq!(vault.balance(&id).await.unwrap(), 0);
    assert_eq!(
        vault.account(&id).await.unwrap().phase(),
        EscrowPhase::Refunded
    );

    // Idempotent repeat moves nothing.
    let receipt = vault.refund(&id).await.unwrap();
    assert_eq!(receipt.amount, 0);
}

#[tokio::test]
async fn refund_is_forbidden_once_a_winner_exists() {
    let (vault, id) = funded_vault().await;
    vault.assign_winner(&id, &creator_wallet()).await.unwrap();

    let err = vault.refund(&id).await.unwrap_err();
    assert_eq!(err, LedgerError::WinnerAlreadySet);
    assert_eq!(vault.balance(&id).await.unwrap(), 2 * STAKE);
}

#[tokio::test]
async fn refunded_escrow_accepts_nothing_further() {
    let (vault, id) = open_vault().await;
    vault.deposit(&id, &creator_wallet(), STAKE).await.unwrap();
    vault.refund(&id).await.unwrap();

    assert_eq!(
        vault
            .deposit(&id, &opponent_wallet(), STAKE)
            .await
            .unwrap_err(),
        LedgerError::AlreadyRefunded
    );
    assert_eq!(
        vault.claim(&id, &creator_wallet()).await.unwrap_err(),
        LedgerError::AlreadyRefunded
    );
}

/// Claim authorization over every (claimant, winner, already-claimed)
/// combination: payout happens iff the claimant is the assigned winner
/// and nothing was paid out yet.
fn wallet_by_index(idx: usize) -> WalletAddr {
    match idx {
        0 => creator_wallet(),
        1 => opponent_wallet(),
        _ => stranger_wallet(),
    }
}

proptest! {
    #![proptest_config(crate::domain::test_prelude::proptest_config())]

    #[test]
    fn prop_claim_iff_winner_and_unclaimed(
        claimant_idx in 0usize..3,
        winner_idx in 0usize..2,
        pre_claimed in any::<bool>(),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let (claim_ok, balance, expected_ok) = rt.block_on(async {
            let (vault, id) = funded_vault().await;
            let winner = wallet_by_index(winner_idx);
            let claimant = wallet_by_index(claimant_idx);
            vault.assign_winner(&id, &winner).await.unwrap();
            if pre_claimed {
                vault.claim(&id, &winner).await.unwrap();
            }

            let expected_ok = claimant == winner && !pre_claimed;
            let claim_ok = vault.claim(&id, &claimant).await.is_ok();
            let balance = vault.balance(&id).await.unwrap();
            (claim_ok, balance, expected_ok)
        });

        prop_assert_eq!(claim_ok, expected_ok);
        let paid_out = claim_ok || pre_claimed;
        prop_assert_eq!(balance, if paid_out { 0 } else { 2 * STAKE });
    }
}
