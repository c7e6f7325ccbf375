use time::OffsetDateTime;
use tracing::{debug, info};

use super::MatchFlowService;
use crate::domain::engine;
use crate::domain::moves::MoveAction;
use crate::domain::session::{MatchId, MatchOutcome, MatchSession, MatchStatus};
use crate::domain::wallet::WalletAddr;
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, ForbiddenKind, ValidationKind};
use crate::logging::wallet_tag;

impl MatchFlowService {
    /// Apply one move for `actor`.
    ///
    /// `expected_version` is the version the client acted on. The write is
    /// a compare-and-set against the version we read, so a concurrent
    /// writer loses with `STALE_STATE` either way; the explicit check only
    /// fails faster and puts the caller's number in the detail.
    pub async fn submit_move(
        &self,
        match_id: &MatchId,
        actor: &WalletAddr,
        action: MoveAction,
        expected_version: Option<u64>,
    ) -> Result<MatchSession, AppError> {
        let session = self.store.get(match_id).await?;

        if let Some(expected) = expected_version {
            if session.version != expected {
                return Err(DomainError::conflict(
                    ConflictKind::StaleState,
                    format!(
                        "Match {match_id} moved on: expected v{expected}, live v{}",
                        session.version
                    ),
                )
                .into());
            }
        }

        let seat = session.seat_of(actor).ok_or_else(|| {
            DomainError::forbidden(
                ForbiddenKind::NotAParticipant,
                "Only seated players may move",
            )
        })?;

        if session.status != MatchStatus::Playing {
            return Err(DomainError::validation(
                ValidationKind::GameNotActive,
                format!("Match {match_id} is not accepting moves"),
            )
            .into());
        }
        if session.turn != Some(seat) {
            return Err(DomainError::validation(
                ValidationKind::NotYourTurn,
                "It is the other player's turn",
            )
            .into());
        }
        if self.require_funded_play && !session.funding.fully_funded() {
            return Err(DomainError::validation(
                ValidationKind::StakeNotFunded,
                "Both stakes must be deposited before play",
            )
            .into());
        }

        debug!(
            match_id = %match_id,
            seat = ?seat,
            action = action.kind_name(),
            "Applying move"
        );

        let mut next = session.clone();
        let outcome = engine::apply_move(&mut next.state, seat, &action)?;
        match outcome.terminal {
            Some(result) => {
                next.status = MatchStatus::Completed;
                next.outcome = Some(result.to_outcome());
                next.turn = None;
                next.turn_deadline = None;
            }
            None => {
                next.turn = outcome.next_turn;
                next.turn_deadline = Some(OffsetDateTime::now_utc() + self.turn_timeout);
            }
        }

        let stored = self.store.compare_and_set(session.version, next).await?;

        if stored.status == MatchStatus::Completed {
            info!(
                match_id = %match_id,
                outcome = ?stored.outcome,
                "Match completed"
            );
            self.escrow.dispatch_settlement(&stored);
        } else {
            self.deadlines.arm(match_id, stored.version, self.turn_timeout);
        }
        Ok(stored)
    }

    /// Concede the match. Either participant, any time while Playing; the
    /// opponent wins immediately.
    pub async fn resign(
        &self,
        match_id: &MatchId,
        actor: &WalletAddr,
    ) -> Result<MatchSession, AppError> {
        loop {
            let session = self.store.get(match_id).await?;
            let seat = session.seat_of(actor).ok_or_else(|| {
                DomainError::forbidden(
                    ForbiddenKind::NotAParticipant,
                    "Only seated players may resign",
                )
            })?;
            if session.status != MatchStatus::Playing {
                return Err(DomainError::validation(
                    ValidationKind::GameNotActive,
                    format!("Match {match_id} is not in play"),
                )
                .into());
            }

            let winner = seat.other();
            let mut next = session.clone();
            next.status = MatchStatus::Completed;
            next.outcome = Some(MatchOutcome::win_for(winner));
            next.turn = None;
            next.turn_deadline = None;

            match self.store.compare_and_set(session.version, next).await {
                Ok(stored) => {
                    info!(
                        match_id = %match_id,
                        resigned = %wallet_tag(actor.as_str()),
                        winner = ?winner,
                        "Match resigned"
                    );
                    self.escrow.dispatch_settlement(&stored);
                    return Ok(stored);
                }
                Err(DomainError::Conflict(ConflictKind::StaleState, _)) => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Tear down a match nobody joined. Creator only, Waiting only; any
    /// deposit already held in escrow is returned.
    pub async fn cancel_match(
        &self,
        match_id: &MatchId,
        actor: &WalletAddr,
    ) -> Result<MatchSession, AppError> {
        loop {
            let session = self.store.get(match_id).await?;
            if session.creator != *actor {
                return Err(DomainError::forbidden(
                    ForbiddenKind::NotCreator,
                    "Only the creator may cancel a match",
                )
                .into());
            }
            if session.status != MatchStatus::Waiting {
                return Err(DomainError::validation(
                    ValidationKind::GameNotActive,
                    format!("Match {match_id} already started; resign instead"),
                )
                .into());
            }

            let mut next = session.clone();
            next.status = MatchStatus::Completed;
            next.outcome = Some(MatchOutcome::Cancelled);
            next.turn = None;
            next.turn_deadline = None;

            match self.store.compare_and_set(session.version, next).await {
                Ok(stored) => {
                    info!(match_id = %match_id, "Match cancelled before start");
                    self.escrow.dispatch_settlement(&stored);
                    return Ok(stored);
                }
                Err(DomainError::Conflict(ConflictKind::StaleState, _)) => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }
}
