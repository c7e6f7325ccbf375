//! Two-player blackjack engine.
//!
//! Both players draw from one shuffled deck. Hit draws a card and busts
//! immediately above the target; Stand ends that player's turn. Once both
//! have stood the higher hand wins and equal hands draw. There is no
//! dealer seat and no doubling or splitting.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::domain::engine::{MoveOutcome, TerminalResult};
use crate::domain::rules::{BLACKJACK_INITIAL_HAND, BLACKJACK_TARGET};
use crate::domain::session::Seat;
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardSuit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    /// Value before ace reduction: faces count 10, aces 11.
    fn base_value(self) -> u8 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Ace => 11,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: CardSuit,
    pub rank: Rank,
}

/// Hand value with aces counted 11 then reduced to 1 while over target.
pub fn hand_value(cards: &[Card]) -> u8 {
    let mut total: u16 = 0;
    let mut aces = 0u8;
    for card in cards {
        total += u16::from(card.rank.base_value());
        if card.rank == Rank::Ace {
            aces += 1;
        }
    }
    while total > u16::from(BLACKJACK_TARGET) && aces > 0 {
        total -= 10;
        aces -= 1;
    }
    // A full-deck hand tops out far below u8::MAX after reduction.
    total.min(u16::from(u8::MAX)) as u8
}

#[derive(Debug, Clone, Default)]
pub struct HandState {
    pub cards: Vec<Card>,
    pub stood: bool,
}

impl HandState {
    pub fn value(&self) -> u8 {
        hand_value(&self.cards)
    }
}

#[derive(Debug, Clone)]
pub struct BlackjackState {
    /// Undealt cards; the next draw pops from the back.
    pub deck: Vec<Card>,
    pub creator: HandState,
    pub opponent: HandState,
}

/// Full 52-card deck in standard order.
fn full_deck() -> Vec<Card> {
    let suits = [
        CardSuit::Clubs,
        CardSuit::Diamonds,
        CardSuit::Hearts,
        CardSuit::Spades,
    ];
    let ranks = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    let mut deck = Vec::with_capacity(52);
    for suit in suits {
        for rank in ranks {
            deck.push(Card { suit, rank });
        }
    }
    deck
}

impl BlackjackState {
    /// Shuffle a fresh deck with the match's seeded stream and deal the
    /// opening hands, alternating creator/opponent.
    pub fn deal(rng: &mut ChaCha8Rng) -> Self {
        let mut deck = full_deck();
        deck.shuffle(rng);

        let mut state = Self {
            deck,
            creator: HandState::default(),
            opponent: HandState::default(),
        };
        for _ in 0..BLACKJACK_INITIAL_HAND {
            for seat in [Seat::Creator, Seat::Opponent] {
                if let Some(card) = state.deck.pop() {
                    state.hand_mut(seat).cards.push(card);
                }
            }
        }
        state
    }

    pub fn hand(&self, seat: Seat) -> &HandState {
        match seat {
            Seat::Creator => &self.creator,
            Seat::Opponent => &self.opponent,
        }
    }

    fn hand_mut(&mut self, seat: Seat) -> &mut HandState {
        match seat {
            Seat::Creator => &mut self.creator,
            Seat::Opponent => &mut self.opponent,
        }
    }
}

/// Draw one card for `actor`. Busting is an immediate loss.
pub fn apply_hit(state: &mut BlackjackState, actor: Seat) -> Result<MoveOutcome, DomainError> {
    if state.hand(actor).stood {
        return Err(DomainError::validation(
            ValidationKind::IllegalMove,
            "Cannot hit after standing",
        ));
    }
    let card = state.deck.pop().ok_or_else(|| {
        DomainError::validation(ValidationKind::IllegalMove, "Deck exhausted; stand instead")
    })?;
    state.hand_mut(actor).cards.push(card);

    if state.hand(actor).value() > BLACKJACK_TARGET {
        return Ok(MoveOutcome::terminal(TerminalResult::Win(actor.other())));
    }

    // A player whose opponent has stood keeps acting until they stand
    // or bust; otherwise the turn alternates.
    let next = if state.hand(actor.other()).stood {
        actor
    } else {
        actor.other()
    };
    Ok(MoveOutcome::next(next))
}

/// End `actor`'s turn. Resolves the game once both players have stood.
pub fn apply_stand(state: &mut BlackjackState, actor: Seat) -> Result<MoveOutcome, DomainError> {
    if state.hand(actor).stood {
        return Err(DomainError::validation(
            ValidationKind::IllegalMove,
            "Already standing",
        ));
    }
    state.hand_mut(actor).stood = true;

    if !state.hand(actor.other()).stood {
        return Ok(MoveOutcome::next(actor.other()));
    }

    // Both stood: higher hand wins, equal hands draw. Busts never reach
    // this comparison because they are terminal at hit time.
    let creator_value = state.creator.value();
    let opponent_value = state.opponent.value();
    let terminal = match creator_value.cmp(&opponent_value) {
        std::cmp::Ordering::Greater => TerminalResult::Win(Seat::Creator),
        std::cmp::Ordering::Less => TerminalResult::Win(Seat::Opponent),
        std::cmp::Ordering::Equal => TerminalResult::Draw,
    };
    Ok(MoveOutcome::terminal(terminal))
}
