pub mod simulation;
pub mod strategy;
pub mod trials;

use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use simulation::{Card, GamePhase};
use strategy::{BasicStrategy, CardCounter, DealerSoft17, Passive, Strategy};
use thiserror::Error;

pub use simulation::{simulate, EveningOutcome, RoundOutcome, RoundResult, Simulator};
pub use trials::{run_trials, TrialPlan, TrialResults};

/// Table configuration for one simulated evening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub number_of_decks: u8,
    /// Fraction of the shoe dealt before a mandatory reshuffle, in (0, 1].
    pub penetration: f64,
    pub number_of_other_seats: u8,
    pub number_of_hands: u32,
    pub payout_blackjack: f64,
}

impl Rule {
    pub fn validate(&self) -> Result<()> {
        if self.number_of_decks == 0 {
            return Err(Error::InvalidRule(String::from(
                "number_of_decks must be at least 1",
            )));
        }
        if !(self.penetration > 0.0 && self.penetration <= 1.0) {
            return Err(Error::InvalidRule(format!(
                "penetration must be in (0, 1], got {}",
                self.penetration
            )));
        }
        if !self.payout_blackjack.is_finite() || self.payout_blackjack < 0.0 {
            return Err(Error::InvalidRule(format!(
                "payout_blackjack must be a non-negative number, got {}",
                self.payout_blackjack
            )));
        }
        Ok(())
    }
}

impl Default for Rule {
    fn default() -> Self {
        Rule {
            number_of_decks: 6,
            penetration: 0.7,
            number_of_other_seats: 7,
            number_of_hands: 100,
            payout_blackjack: 1.5,
        }
    }
}

/// A playing decision. The simulator only offers `Stay`, `Hit` and `Double`;
/// the other table moves are rejected as invalid decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Stay,
    Hit,
    Double,
    Surrender,
    Split,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_enum_str, Deserialize_enum_str)]
pub enum StrategyKind {
    Passive,
    DealerSoft17,
    BasicStrategy,
    CardCounter,
}

impl StrategyKind {
    /// Builds a fresh strategy with an empty hand and a zero count.
    pub fn build(self) -> Box<dyn Strategy + Send> {
        match self {
            StrategyKind::Passive => Box::new(Passive::default()),
            StrategyKind::DealerSoft17 => Box::new(DealerSoft17::default()),
            StrategyKind::BasicStrategy => Box::new(BasicStrategy::default()),
            StrategyKind::CardCounter => Box::new(CardCounter::default()),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("{0:?} is not a card rank")]
    InvalidRank(char),
    #[error("{0:?} is not a card suit")]
    InvalidSuit(char),
    #[error("card code must be exactly two characters, got {0:?}")]
    InvalidCode(String),
    #[error("{0} is not a valid ordinal card number")]
    InvalidOrdinal(u8),
    #[error("card {0} is not available in the shoe")]
    CardNotInShoe(Card),
    #[error("shoe has no undealt cards ({dealt} of {total} dealt)")]
    ShoeExhausted { dealt: usize, total: usize },
    #[error("invalid decision {decision:?}: {reason}")]
    InvalidDecision {
        decision: Decision,
        reason: &'static str,
    },
    #[error("invalid bet {bet}: {reason}")]
    InvalidBet { bet: u32, reason: &'static str },
    #[error("invalid rule: {0}")]
    InvalidRule(String),
    #[error("{method} is only allowed in {expected:?} phase, current phase is {actual:?}")]
    WrongPhase {
        method: &'static str,
        expected: GamePhase,
        actual: GamePhase,
    },
    #[error("trial worker thread panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, Error>;
