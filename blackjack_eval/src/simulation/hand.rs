use std::fmt;

use super::Card;

/// Cards dealt to one participant since the last payoff, with the hard value
/// (aces counted as 1) kept up to date card by card.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hand {
    cards: Vec<Card>,
    value: u8,
    has_ace: bool,
}

impl Hand {
    pub fn new() -> Hand {
        Hand {
            cards: Vec::with_capacity(4),
            value: 0,
            has_ace: false,
        }
    }

    /// Receives the opening cards.
    pub fn dealt(&mut self, cards: &[Card]) {
        for &card in cards {
            self.hit(card);
        }
    }

    pub fn hit(&mut self, card: Card) {
        self.cards.push(card);
        self.value += card.points();
        if card.is_ace() {
            self.has_ace = true;
        }
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.value = 0;
        self.has_ace = false;
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Hard value, aces counted as 1.
    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn has_ace(&self) -> bool {
        self.has_ace
    }

    /// Value with one ace promoted to 11 when that keeps the hand at 21 or below.
    pub fn soft_value(&self) -> u8 {
        if self.value <= 11 && self.has_ace {
            self.value + 10
        } else {
            self.value
        }
    }

    pub fn busted(&self) -> bool {
        self.value > 21
    }

    /// Ace plus a ten-valued card as the opening two cards. A 21 built from
    /// more cards is not a blackjack.
    pub fn has_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.value == 11 && self.has_ace
    }

    /// True if this hand beats the other one.
    ///
    /// A busted hand never beats anything, even another busted hand. The
    /// simulator never compares two busted hands, because the dealer does not
    /// draw once the player has busted. Equal hands do not beat each other.
    pub fn beats(&self, other: &Hand) -> bool {
        if self.busted() {
            false
        } else if other.busted() {
            true
        } else if self.soft_value() > other.soft_value() {
            true
        } else {
            self.soft_value() == other.soft_value()
                && self.has_blackjack()
                && !other.has_blackjack()
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, card) in self.cards.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", card)?;
        }
        write!(f, "] {}", self.value)?;
        if self.soft_value() != self.value {
            write!(f, "/{}", self.soft_value())?;
        }
        Ok(())
    }
}
