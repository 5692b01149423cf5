use std::fmt;
use std::str::FromStr;

use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum Suit {
    Club = 0,
    Diamond,
    Heart,
    Spade,
}

impl Suit {
    pub fn code(&self) -> char {
        match self {
            Suit::Club => 'C',
            Suit::Diamond => 'D',
            Suit::Heart => 'H',
            Suit::Spade => 'S',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Suit::Club => "Clubs",
            Suit::Diamond => "Diamonds",
            Suit::Heart => "Hearts",
            Suit::Spade => "Spades",
        }
    }
}

impl TryFrom<char> for Suit {
    type Error = Error;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value.to_ascii_uppercase() {
            'C' => Ok(Suit::Club),
            'D' => Ok(Suit::Diamond),
            'H' => Ok(Suit::Heart),
            'S' => Ok(Suit::Spade),
            _ => Err(Error::InvalidSuit(value)),
        }
    }
}

/// Ranks in ascending order, aces high. The discriminant is the rank value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
#[repr(u8)]
pub enum Rank {
    Two = 2,
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
    pub fn code(&self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }

    /// 2 to 14, aces high.
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Blackjack points: aces count 1, faces count 10.
    pub fn points(&self) -> u8 {
        match self {
            Rank::Ace => 1,
            Rank::Jack | Rank::Queen | Rank::King => 10,
            _ => self.value(),
        }
    }

    /// Hi-Lo tag of the rank.
    pub fn hi_lo(&self) -> i32 {
        match self {
            Rank::Two | Rank::Three | Rank::Four | Rank::Five | Rank::Six => 1,
            Rank::Seven | Rank::Eight | Rank::Nine => 0,
            _ => -1,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Rank::Ace => String::from("Ace"),
            Rank::Two => String::from("Deuce"),
            Rank::Ten => String::from("Ten"),
            Rank::Jack => String::from("Jack"),
            Rank::Queen => String::from("Queen"),
            Rank::King => String::from("King"),
            _ => self.code().to_string(),
        }
    }
}

impl TryFrom<char> for Rank {
    type Error = Error;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        let upper = value.to_ascii_uppercase();
        Rank::iter()
            .find(|rank| rank.code() == upper)
            .ok_or(Error::InvalidRank(value))
    }
}

/// Represents a card in the real world with a rank and a suit.
///
/// Cards are ordered by rank (aces high), then by suit (clubs, diamonds,
/// hearts, spades). The field order matters for the derived ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card {
    rank: Rank,
    suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    pub fn rank_value(&self) -> u8 {
        self.rank.value()
    }

    pub fn points(&self) -> u8 {
        self.rank.points()
    }

    pub fn is_ace(&self) -> bool {
        self.rank == Rank::Ace
    }

    /// Long name of the card, e.g. "Ace of Hearts".
    pub fn name(&self) -> String {
        format!("{} of {}", self.rank.name(), self.suit.name())
    }

    /// Placement in a sorted deck: clubs 2..A, then diamonds, hearts, spades.
    pub fn ordinal(&self) -> u8 {
        self.suit as u8 * 13 + (self.rank.value() - 2)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.code(), self.suit.code())
    }
}

impl From<Card> for u8 {
    fn from(card: Card) -> u8 {
        card.ordinal()
    }
}

impl TryFrom<u8> for Card {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value >= 52 {
            return Err(Error::InvalidOrdinal(value));
        }
        let suit = Suit::iter()
            .nth((value / 13) as usize)
            .ok_or(Error::InvalidOrdinal(value))?;
        let rank = Rank::iter()
            .nth((value % 13) as usize)
            .ok_or(Error::InvalidOrdinal(value))?;
        Ok(Card { rank, suit })
    }
}

impl FromStr for Card {
    type Err = Error;

    /// Parses a two-character code such as `"TD"` or `"as"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(rank), Some(suit), None) => Ok(Card {
                rank: Rank::try_from(rank)?,
                suit: Suit::try_from(suit)?,
            }),
            _ => Err(Error::InvalidCode(s.to_string())),
        }
    }
}

impl TryFrom<&str> for Card {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}
