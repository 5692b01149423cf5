use crate::{
    simulation::{hand::Hand, Card, Rank},
    Decision,
};

/// A participant at the table. The simulator drives every strategy through
/// this protocol; the dealer is a strategy too.
///
/// Only `hand`, `hand_mut`, `bet`, `choose` and `title` are required. By
/// default a card received through `hit` is also reported to `sees`, so a
/// strategy observes its own cards the same way it observes everybody else's.
pub trait Strategy {
    fn hand(&self) -> &Hand;
    fn hand_mut(&mut self) -> &mut Hand;

    /// Wager for the upcoming hand.
    fn bet(&self) -> u32;

    fn choose(&self, dealer_up_card: Card) -> Decision;

    /// Descriptive heading for reports.
    fn title(&self) -> String;

    /// Receives the two opening cards.
    fn dealt(&mut self, cards: &[Card]) {
        for &card in cards {
            self.hit(card);
        }
    }

    /// Receives one more card after a hit or a double.
    fn hit(&mut self, card: Card) {
        self.hand_mut().hit(card);
        self.sees(&[card]);
    }

    /// Settles the hand. Positive amounts are won, negative amounts are lost.
    fn payoff(&mut self, _amount: i64) {
        self.hand_mut().clear();
    }

    /// Called when the shoe has been reshuffled.
    fn new_shoe(&mut self) {}

    /// Informs the strategy of visible cards other than the ones dealt to it.
    fn sees(&mut self, _cards: &[Card]) {}
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn hand(&self) -> &Hand {
        (**self).hand()
    }

    fn hand_mut(&mut self) -> &mut Hand {
        (**self).hand_mut()
    }

    fn bet(&self) -> u32 {
        (**self).bet()
    }

    fn choose(&self, dealer_up_card: Card) -> Decision {
        (**self).choose(dealer_up_card)
    }

    fn title(&self) -> String {
        (**self).title()
    }

    fn dealt(&mut self, cards: &[Card]) {
        (**self).dealt(cards)
    }

    fn hit(&mut self, card: Card) {
        (**self).hit(card)
    }

    fn payoff(&mut self, amount: i64) {
        (**self).payoff(amount)
    }

    fn new_shoe(&mut self) {
        (**self).new_shoe()
    }

    fn sees(&mut self, cards: &[Card]) {
        (**self).sees(cards)
    }
}

pub const DEFAULT_FLAT_BET: u32 = 100;

/// Never hits, bets a flat amount.
#[derive(Debug, Clone)]
pub struct Passive {
    hand: Hand,
    flat_bet: u32,
}

impl Passive {
    pub fn new(flat_bet: u32) -> Passive {
        Passive {
            hand: Hand::new(),
            flat_bet,
        }
    }
}

impl Default for Passive {
    fn default() -> Self {
        Passive::new(DEFAULT_FLAT_BET)
    }
}

impl Strategy for Passive {
    fn hand(&self) -> &Hand {
        &self.hand
    }

    fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    fn bet(&self) -> u32 {
        self.flat_bet
    }

    fn choose(&self, _: Card) -> Decision {
        Decision::Stay
    }

    fn title(&self) -> String {
        format!("${} wager, no strategy (never hits)", self.flat_bet)
    }
}

/// Standard American dealer policy: hits 16, stays on 17, except hits soft 17.
#[derive(Debug, Clone, Default)]
pub struct DealerSoft17 {
    hand: Hand,
}

impl Strategy for DealerSoft17 {
    fn hand(&self) -> &Hand {
        &self.hand
    }

    fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    fn bet(&self) -> u32 {
        0
    }

    fn choose(&self, _: Card) -> Decision {
        if self.hand.has_blackjack() || self.hand.value() > 16 {
            Decision::Stay
        } else if self.hand.has_ace() && self.hand.soft_value() > 17 {
            Decision::Stay
        } else {
            Decision::Hit
        }
    }

    fn title(&self) -> String {
        String::from("dealer soft-17 policy")
    }
}

/// A chart cell: the decision on the first two cards, and the one used once
/// the hand has more cards and can no longer double.
type Cell = (Decision, Decision);

const H: Cell = (Decision::Hit, Decision::Hit);
const S: Cell = (Decision::Stay, Decision::Stay);
const DH: Cell = (Decision::Double, Decision::Hit);
const DS: Cell = (Decision::Double, Decision::Stay);

// Columns: dealer up card 2, 3, 4, 5, 6, 7, 8, 9, ten-valued, ace.
static HARD_CHART: [[Cell; 10]; 13] = [
    [H, H, H, H, H, H, H, H, H, H], // 4
    [H, H, H, H, H, H, H, H, H, H],
    [H, H, H, H, H, H, H, H, H, H],
    [H, H, H, H, H, H, H, H, H, H],
    [H, H, H, H, H, H, H, H, H, H], // 8
    [H, DH, DH, DH, DH, H, H, H, H, H],
    [DH, DH, DH, DH, DH, DH, DH, DH, H, H],
    [DH, DH, DH, DH, DH, DH, DH, DH, DH, DH], // 11
    [H, H, S, S, S, H, H, H, H, H],
    [S, S, S, S, S, H, H, H, H, H],
    [S, S, S, S, S, H, H, H, H, H],
    [S, S, S, S, S, H, H, H, H, H],
    [S, S, S, S, S, H, H, H, H, H], // 16
];

// Rows are the hard value with the ace counted as 1: A+A up to A+9.
static SOFT_CHART: [[Cell; 10]; 9] = [
    [H, H, H, H, H, H, H, H, H, H], // Ace + Ace
    [H, H, H, DH, DH, H, H, H, H, H], // Ace + 2
    [H, H, H, DH, DH, H, H, H, H, H],
    [H, H, DH, DH, DH, H, H, H, H, H],
    [H, H, DH, DH, DH, H, H, H, H, H],
    [H, DH, DH, DH, DH, H, H, H, H, H], // Ace + 6
    [DS, DS, DS, DS, DS, S, S, H, H, H],
    [S, S, S, S, DS, S, S, S, S, S],
    [S, S, S, S, S, S, S, S, S, S], // Ace + 9
];

fn up_card_column(dealer_up_card: Card) -> usize {
    match dealer_up_card.rank() {
        Rank::Ace => 9,
        rank if rank.points() == 10 => 8,
        rank => (rank.value() - 2) as usize,
    }
}

/// Statistically best play for a full shoe, looked up from fixed charts.
#[derive(Debug, Clone)]
pub struct BasicStrategy {
    hand: Hand,
    flat_bet: u32,
}

impl BasicStrategy {
    pub fn new(flat_bet: u32) -> BasicStrategy {
        BasicStrategy {
            hand: Hand::new(),
            flat_bet,
        }
    }

    /// Chart decision for a hand against the dealer's up card.
    pub fn decide(hand: &Hand, dealer_up_card: Card) -> Decision {
        if hand.has_blackjack() || hand.value() > 16 {
            return Decision::Stay;
        }

        let col = up_card_column(dealer_up_card);
        let value = hand.value() as usize;
        let cell = if hand.has_ace() && value <= 10 {
            SOFT_CHART[value.max(2) - 2][col]
        } else {
            HARD_CHART[value.max(4) - 4][col]
        };

        if hand.len() == 2 {
            cell.0
        } else {
            cell.1
        }
    }
}

impl Default for BasicStrategy {
    fn default() -> Self {
        BasicStrategy::new(DEFAULT_FLAT_BET)
    }
}

impl Strategy for BasicStrategy {
    fn hand(&self) -> &Hand {
        &self.hand
    }

    fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    fn bet(&self) -> u32 {
        self.flat_bet
    }

    fn choose(&self, dealer_up_card: Card) -> Decision {
        Self::decide(&self.hand, dealer_up_card)
    }

    fn title(&self) -> String {
        format!("${} wager, basic strategy", self.flat_bet)
    }
}

/// Wagers indexed by running count, from 0 or less up to 5 or more.
pub static BET_RAMP: [u32; 6] = [10, 50, 100, 200, 500, 1000];

/// Plays basic strategy and sizes bets with a Hi-Lo running count.
#[derive(Debug, Clone, Default)]
pub struct CardCounter {
    basic: BasicStrategy,
    running_count: i32,
}

impl CardCounter {
    pub fn new() -> CardCounter {
        Default::default()
    }

    pub fn running_count(&self) -> i32 {
        self.running_count
    }
}

impl Strategy for CardCounter {
    fn hand(&self) -> &Hand {
        self.basic.hand()
    }

    fn hand_mut(&mut self) -> &mut Hand {
        self.basic.hand_mut()
    }

    fn bet(&self) -> u32 {
        BET_RAMP[self.running_count.clamp(0, BET_RAMP.len() as i32 - 1) as usize]
    }

    fn choose(&self, dealer_up_card: Card) -> Decision {
        self.basic.choose(dealer_up_card)
    }

    fn title(&self) -> String {
        format!(
            "CardCounter strategy, bets range between ${} - ${}",
            BET_RAMP[0],
            BET_RAMP[BET_RAMP.len() - 1]
        )
    }

    fn new_shoe(&mut self) {
        self.running_count = 0;
    }

    fn sees(&mut self, cards: &[Card]) {
        self.running_count += cards.iter().map(|card| card.rank().hi_lo()).sum::<i32>();
    }
}
