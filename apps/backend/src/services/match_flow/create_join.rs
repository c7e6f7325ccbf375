use time::OffsetDateTime;
use tracing::{debug, info};

use super::MatchFlowService;
use crate::domain::engine::{self, GameState};
use crate::domain::rules::validate_stake;
use crate::domain::seed::derive_match_seed;
use crate::domain::session::{GameKind, MatchId, MatchSession, MatchStatus};
use crate::domain::wallet::WalletAddr;
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::logging::wallet_tag;

/// A 10-character Crockford code collides roughly never; more than a
/// couple of retries means the RNG is broken, not the code space full.
const CREATE_ATTEMPTS: u32 = 4;

impl MatchFlowService {
    /// Create a match in Waiting and open its escrow account.
    ///
    /// Hidden game state (deck order, mine layout) is derived here from
    /// the process seed secret and the match id, so it exists before the
    /// opponent joins and no client input ever influences it.
    pub async fn create_match(
        &self,
        creator: WalletAddr,
        game: GameKind,
        stake: u64,
    ) -> Result<MatchSession, AppError> {
        validate_stake(stake)?;
        debug!(
            game = %game,
            stake,
            creator = %wallet_tag(creator.as_str()),
            "Creating match"
        );

        for _ in 0..CREATE_ATTEMPTS {
            let id = MatchId::generate();
            let seed = derive_match_seed(&self.seed_secret, id.as_str());
            let state = GameState::new_for(game, &seed);
            let session = MatchSession::new(id.clone(), game, creator.clone(), stake, state);
            let snapshot = session.clone();

            match self.store.create(session).await {
                Ok(_) => {
                    self.escrow.open(&id, &creator, stake).await?;
                    info!(match_id = %id, game = %game, stake, "Match created");
                    return Ok(snapshot);
                }
                Err(DomainError::Conflict(ConflictKind::InviteCodeConflict, _)) => {
                    debug!(match_id = %id, "Invite code collision; redrawing");
                    continue;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(AppError::internal(format!(
            "Could not allocate a unique invite code in {CREATE_ATTEMPTS} attempts"
        )))
    }

    /// Seat `joiner` as the opponent and start the game.
    ///
    /// Losing a join race surfaces as `MATCH_FULL` after a reread, not as
    /// a version conflict: from the second joiner's point of view the
    /// match simply filled up first.
    pub async fn join_match(
        &self,
        match_id: &MatchId,
        joiner: WalletAddr,
    ) -> Result<MatchSession, AppError> {
        loop {
            let session = self.store.get(match_id).await?;

            if session.creator == joiner {
                return Err(DomainError::validation(
                    ValidationKind::SelfJoin,
                    "Creators cannot join their own match",
                )
                .into());
            }
            if session.status != MatchStatus::Waiting || session.opponent.is_some() {
                return Err(DomainError::conflict(
                    ConflictKind::MatchFull,
                    format!("Match {match_id} is no longer open to join"),
                )
                .into());
            }

            let mut next = session.clone();
            next.opponent = Some(joiner.clone());
            next.status = MatchStatus::Playing;
            next.turn = Some(engine::initial_turn(session.game));
            next.turn_deadline = Some(OffsetDateTime::now_utc() + self.turn_timeout);

            match self.store.compare_and_set(session.version, next).await {
                Ok(stored) => {
                    self.deadlines
                        .arm(match_id, stored.version, self.turn_timeout);
                    info!(
                        match_id = %match_id,
                        joiner = %wallet_tag(joiner.as_str()),
                        "Opponent joined; match is live"
                    );
                    return Ok(stored);
                }
                Err(DomainError::Conflict(ConflictKind::StaleState, _)) => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Read one session. Visibility filtering happens in the view layer,
    /// not here.
    pub async fn get_match(&self, match_id: &MatchId) -> Result<MatchSession, AppError> {
        Ok(self.store.get(match_id).await?)
    }
}
