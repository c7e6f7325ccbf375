use std::time::Duration;

use super::test_harness::{flow_harness, test_config};
use crate::domain::engine::GameState;
use crate::domain::seed::derive_match_seed;
use crate::domain::session::{GameKind, MatchStatus, Seat};
use crate::domain::test_state_helpers::{creator_wallet, opponent_wallet, stranger_wallet};
use crate::errors::ErrorCode;
use crate::escrow::ledger::EscrowLedger;
use crate::store::SessionStore;

const LONG: Duration = Duration::from_secs(300);

#[tokio::test]
async fn create_starts_waiting_with_escrow_open() {
    let h = flow_harness(&test_config(LONG));

    let session = h
        .service
        .create_match(creator_wallet(), GameKind::Rps, 100)
        .await
        .unwrap();
    assert_eq!(session.status, MatchStatus::Waiting);
    assert_eq!(session.version, 1);
    assert_eq!(session.stake, 100);
    assert!(session.opponent.is_none());
    assert!(session.turn.is_none());
    assert!(!session.funding.creator_deposited);

    let account = h.vault.account(&session.id).await.unwrap();
    assert_eq!(account.stake, 100);
    assert_eq!(account.player1, creator_wallet());
}

#[tokio::test]
async fn create_rejects_zero_stake() {
    let h = flow_harness(&test_config(LONG));
    let err = h
        .service
        .create_match(creator_wallet(), GameKind::Rps, 0)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidStake);
}

#[tokio::test]
async fn hidden_state_derives_from_the_match_id() {
    let h = flow_harness(&test_config(LONG));
    let session = h
        .service
        .create_match(creator_wallet(), GameKind::Blackjack, 100)
        .await
        .unwrap();

    // Same secret + same id reproduces the deal; the client never
    // contributed anything to it.
    let seed = derive_match_seed(&[7u8; 32], session.id.as_str());
    let expected = GameState::new_for(GameKind::Blackjack, &seed);
    let (GameState::Blackjack(stored), GameState::Blackjack(rebuilt)) = (&session.state, &expected)
    else {
        panic!("blackjack match must carry blackjack state");
    };
    assert_eq!(stored.deck, rebuilt.deck);
    assert_eq!(stored.creator.cards, rebuilt.creator.cards);
    assert_eq!(stored.opponent.cards, rebuilt.opponent.cards);
}

#[tokio::test]
async fn distinct_matches_get_distinct_ids_and_deals() {
    let h = flow_harness(&test_config(LONG));
    let first = h
        .service
        .create_match(creator_wallet(), GameKind::Blackjack, 100)
        .await
        .unwrap();
    let second = h
        .service
        .create_match(creator_wallet(), GameKind::Blackjack, 100)
        .await
        .unwrap();

    assert_ne!(first.id, second.id);
    let (GameState::Blackjack(a), GameState::Blackjack(b)) = (&first.state, &second.state) else {
        panic!("blackjack match must carry blackjack state");
    };
    assert_ne!(a.deck, b.deck, "different ids produce different shuffles");
}

#[tokio::test]
async fn join_transitions_to_playing() {
    let h = flow_harness(&test_config(LONG));
    let created = h
        .service
        .create_match(creator_wallet(), GameKind::Minesweeper, 100)
        .await
        .unwrap();

    let joined = h
        .service
        .join_match(&created.id, opponent_wallet())
        .await
        .unwrap();
    assert_eq!(joined.status, MatchStatus::Playing);
    assert_eq!(joined.opponent, Some(opponent_wallet()));
    assert_eq!(joined.turn, Some(Seat::Creator));
    assert!(joined.turn_deadline.is_some());
    assert_eq!(joined.version, 2);
}

#[tokio::test]
async fn join_rejects_the_creator() {
    let h = flow_harness(&test_config(LONG));
    let created = h
        .service
        .create_match(creator_wallet(), GameKind::Rps, 100)
        .await
        .unwrap();

    let err = h
        .service
        .join_match(&created.id, creator_wallet())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::SelfJoin);
}

#[tokio::test]
async fn join_rejects_a_third_wallet() {
    let h = flow_harness(&test_config(LONG));
    let created = h
        .service
        .create_match(creator_wallet(), GameKind::Rps, 100)
        .await
        .unwrap();
    h.service
        .join_match(&created.id, opponent_wallet())
        .await
        .unwrap();

    let err = h
        .service
        .join_match(&created.id, stranger_wallet())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::MatchFull);
}

#[tokio::test]
async fn join_race_seats_exactly_one_wallet() {
    let h = flow_harness(&test_config(LONG));
    let created = h
        .service
        .create_match(creator_wallet(), GameKind::Rps, 100)
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        h.service.join_match(&created.id, opponent_wallet()),
        h.service.join_match(&created.id, stranger_wallet()),
    );

    let winners = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one joiner gets the seat");
    let loser = if first.is_ok() { second } else { first };
    assert_eq!(loser.unwrap_err().code(), ErrorCode::MatchFull);

    let session = h.store.get(&created.id).await.unwrap();
    assert_eq!(session.status, MatchStatus::Playing);
    assert!(session.opponent.is_some());
}

#[tokio::test]
async fn join_after_cancel_reports_match_full() {
    let h = flow_harness(&test_config(LONG));
    let created = h
        .service
        .create_match(creator_wallet(), GameKind::Rps, 100)
        .await
        .unwrap();
    h.service
        .cancel_match(&created.id, &creator_wallet())
        .await
        .unwrap();

    let err = h
        .service
        .join_match(&created.id, opponent_wallet())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::MatchFull);
}

#[tokio::test]
async fn get_match_returns_the_live_document() {
    let h = flow_harness(&test_config(LONG));
    let created = h
        .service
        .create_match(creator_wallet(), GameKind::Rps, 100)
        .await
        .unwrap();
    let fetched = h.service.get_match(&created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.version, created.version);
}
