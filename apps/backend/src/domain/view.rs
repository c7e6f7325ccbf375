//! Per-viewer projections of a match session.
//!
//! [`MatchSession`] holds hidden information and never crosses the wire.
//! Every HTTP snapshot and WS push serializes a [`SessionView`] built
//! for one viewer: your own hidden state is visible, the other side's
//! is not until the match completes, and the minesweeper mine layout is
//! only ever exposed cell by cell as reveals happen.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::blackjack::{BlackjackState, Card, HandState};
use crate::domain::engine::GameState;
use crate::domain::minesweeper::MinesweeperState;
use crate::domain::rps::{RpsChoice, RpsState};
use crate::domain::rules::{GRID_SIZE, MINE_COUNT};
use crate::domain::session::{
    FundingMirror, GameKind, MatchId, MatchOutcome, MatchSession, MatchStatus, Seat,
};
use crate::domain::wallet::WalletAddr;

/// One player's RPS commitment as a given viewer may see it.
#[derive(Debug, Clone, Serialize)]
pub struct PickView {
    pub committed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<RpsChoice>,
}

/// One blackjack hand as a given viewer may see it.
#[derive(Debug, Clone, Serialize)]
pub struct HandView {
    pub card_count: u8,
    pub stood: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<Card>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u8>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CellView {
    Hidden,
    Safe { adjacent: u8 },
    Mine,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum GameView {
    Rps {
        creator: PickView,
        opponent: PickView,
    },
    Blackjack {
        creator: HandView,
        opponent: HandView,
    },
    Minesweeper {
        grid: Vec<Vec<CellView>>,
        revealed_count: u8,
        mines_total: u8,
    },
}

/// Snapshot of one match for one viewer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub match_id: MatchId,
    pub game: GameKind,
    pub status: MatchStatus,
    pub creator: WalletAddr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent: Option<WalletAddr>,
    pub stake: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn: Option<Seat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub your_seat: Option<Seat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<MatchOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<WalletAddr>,
    pub funding: FundingMirror,
    #[serde(with = "time::serde::rfc3339::option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_deadline: Option<OffsetDateTime>,
    pub version: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub game_view: GameView,
}

impl SessionView {
    /// Build the projection for `viewer`. `None` renders the spectator
    /// view, which sees no hidden state at all until the match ends.
    pub fn for_viewer(session: &MatchSession, viewer: Option<&WalletAddr>) -> Self {
        let your_seat = viewer.and_then(|wallet| session.seat_of(wallet));
        let terminal = session.status == MatchStatus::Completed;
        Self {
            match_id: session.id.clone(),
            game: session.game,
            status: session.status,
            creator: session.creator.clone(),
            opponent: session.opponent.clone(),
            stake: session.stake,
            turn: session.turn,
            your_seat,
            outcome: session.outcome,
            winner: session.winner_wallet().cloned(),
            funding: session.funding,
            turn_deadline: session.turn_deadline,
            version: session.version,
            created_at: session.created_at,
            updated_at: session.updated_at,
            game_view: project_game(&session.state, your_seat, terminal),
        }
    }
}

fn project_game(state: &GameState, your_seat: Option<Seat>, terminal: bool) -> GameView {
    match state {
        GameState::Rps(rps) => project_rps(rps, your_seat, terminal),
        GameState::Blackjack(bj) => project_blackjack(bj, your_seat, terminal),
        GameState::Minesweeper(ms) => project_minesweeper(ms),
    }
}

fn pick_view(pick: Option<RpsChoice>, visible: bool) -> PickView {
    PickView {
        committed: pick.is_some(),
        choice: if visible { pick } else { None },
    }
}

fn project_rps(rps: &RpsState, your_seat: Option<Seat>, terminal: bool) -> GameView {
    let visible = |seat: Seat| terminal || your_seat == Some(seat);
    GameView::Rps {
        creator: pick_view(rps.creator_pick, visible(Seat::Creator)),
        opponent: pick_view(rps.opponent_pick, visible(Seat::Opponent)),
    }
}

fn hand_view(hand: &HandState, visible: bool) -> HandView {
    HandView {
        card_count: hand.cards.len() as u8,
        stood: hand.stood,
        cards: visible.then(|| hand.cards.clone()),
        value: visible.then(|| hand.value()),
    }
}

fn project_blackjack(bj: &BlackjackState, your_seat: Option<Seat>, terminal: bool) -> GameView {
    let visible = |seat: Seat| terminal || your_seat == Some(seat);
    GameView::Blackjack {
        creator: hand_view(&bj.creator, visible(Seat::Creator)),
        opponent: hand_view(&bj.opponent, visible(Seat::Opponent)),
    }
}

fn project_minesweeper(ms: &MinesweeperState) -> GameView {
    let mut grid = Vec::with_capacity(GRID_SIZE);
    for row in 0..GRID_SIZE {
        let mut cells = Vec::with_capacity(GRID_SIZE);
        for col in 0..GRID_SIZE {
            let cell = if !ms.is_revealed(row, col) {
                CellView::Hidden
            } else if ms.mines[row][col] {
                CellView::Mine
            } else {
                CellView::Safe {
                    adjacent: ms.adjacent_mines(row, col),
                }
            };
            cells.push(cell);
        }
        grid.push(cells);
    }
    GameView::Minesweeper {
        grid,
        revealed_count: ms.revealed_count,
        mines_total: MINE_COUNT as u8,
    }
}
