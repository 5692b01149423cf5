use super::{Card, Rank, Suit};
use crate::{Error, Result};

use strum::IntoEnumIterator;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Represents a shoe in the real world.
///
/// Cards at indices below `top` are undealt, the rest have been dealt since the
/// last shuffle. Dealing always happens at index `top - 1`.
#[derive(Debug, Clone)]
pub struct Shoe {
    number_of_decks: u8,
    cards: Vec<Card>,
    top: usize,
    rng: StdRng,
}

impl Shoe {
    /// Creates a new shoe with ordered cards, all undealt.
    pub fn new(number_of_decks: u8) -> Shoe {
        Self::with_rng(number_of_decks, StdRng::from_entropy())
    }

    /// Creates a new shoe with ordered cards whose shuffles are reproducible.
    pub fn with_seed(number_of_decks: u8, seed: u64) -> Shoe {
        Self::with_rng(number_of_decks, StdRng::seed_from_u64(seed))
    }

    fn with_rng(number_of_decks: u8, rng: StdRng) -> Shoe {
        let mut cards = Vec::with_capacity(number_of_decks as usize * 52);
        for _ in 0..number_of_decks {
            for suit in Suit::iter() {
                for rank in Rank::iter() {
                    cards.push(Card::new(rank, suit));
                }
            }
        }
        let top = cards.len();
        Shoe {
            number_of_decks,
            cards,
            top,
            rng,
        }
    }

    /// Deals the next card if the shoe is not empty. Returns None if empty.
    pub fn deal(&mut self) -> Option<Card> {
        if self.top == 0 {
            return None;
        }
        self.top -= 1;
        Some(self.cards[self.top])
    }

    /// Deals a card picked uniformly from the undealt cards. The picked card is
    /// swapped to the boundary before the boundary moves down.
    pub fn deal_random(&mut self) -> Option<Card> {
        if self.top == 0 {
            return None;
        }
        let pick = self.rng.gen_range(0..self.top);
        self.top -= 1;
        self.cards.swap(pick, self.top);
        Some(self.cards[self.top])
    }

    /// Returns the dealt cards back into the shoe and shuffles. Can be called at
    /// any time, including in the middle of a hand.
    pub fn shuffle(&mut self) {
        self.top = self.cards.len();
        while self.deal_random().is_some() {}
        self.top = self.cards.len();
    }

    /// Shuffles, then arranges the shoe so the next cards dealt are exactly
    /// `firsts`, in order. The remaining cards stay in random order.
    pub fn stack(&mut self, firsts: &[Card]) -> Result<()> {
        self.shuffle();
        for (i, card) in firsts.iter().enumerate() {
            if i >= self.cards.len() {
                return Err(Error::CardNotInShoe(*card));
            }
            let target = self.cards.len() - 1 - i;
            let position = self.cards[..=target]
                .iter()
                .position(|c| c == card)
                .ok_or(Error::CardNotInShoe(*card))?;
            self.cards.swap(position, target);
        }
        Ok(())
    }

    pub fn number_of_decks(&self) -> u8 {
        self.number_of_decks
    }

    pub fn dealt_count(&self) -> usize {
        self.cards.len() - self.top
    }

    pub fn undealt_count(&self) -> usize {
        self.top
    }

    pub fn total_count(&self) -> usize {
        self.cards.len()
    }

    /// Fraction of the shoe dealt since the last shuffle.
    pub fn penetration(&self) -> f64 {
        self.dealt_count() as f64 / self.total_count() as f64
    }
}
