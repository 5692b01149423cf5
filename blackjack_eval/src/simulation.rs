pub mod card;
pub mod hand;
pub mod shoe;

use crate::{
    strategy::{DealerSoft17, Strategy},
    Decision, Error, Result, Rule,
};
use blackjack_eval_macros::allowed_phase;

pub use self::{
    card::{Card, Rank, Suit},
    hand::Hand,
    shoe::Shoe,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    StartNewShoe,
    PlaceBets,
    DealInitialCards,
    CheckNaturals,
    PlayerTurn,
    DealerTurn,
    Settle,
    Payoff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundResult {
    PlayerBlackjack,
    DealerBlackjack,
    PlayerBust,
    DealerBust,
    PlayerHigher,
    DealerHigher,
    Push,
}

impl RoundResult {
    /// Signed amount the player wins for a (possibly doubled) bet. Only a
    /// natural is paid at the blackjack rate, rounded down to a whole unit.
    pub fn settlement(&self, bet: u32, payout_blackjack: f64) -> i64 {
        let bet = bet as i64;
        match self {
            RoundResult::PlayerBlackjack => (bet as f64 * payout_blackjack).floor() as i64,
            RoundResult::DealerBust | RoundResult::PlayerHigher => bet,
            RoundResult::DealerBlackjack | RoundResult::PlayerBust | RoundResult::DealerHigher => {
                -bet
            }
            RoundResult::Push => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundOutcome {
    /// The committed bet, doubled if the player doubled down.
    pub bet: u32,
    pub result: RoundResult,
    pub amount: i64,
    pub doubled: bool,
    /// Whether the shoe was reshuffled before this hand.
    pub reshuffled: bool,
}

/// Accumulated winnings of one simulated evening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EveningOutcome {
    pub final_winnings: i64,
    /// Running minimum of the accumulated winnings, starting from 0.
    pub low_watermark: i64,
    /// Running maximum of the accumulated winnings, starting from 0.
    pub high_watermark: i64,
    pub hands: u32,
    pub wins: u32,
    pub losses: u32,
    pub pushes: u32,
    pub player_blackjacks: u32,
    pub doubles: u32,
    pub shuffles: u32,
}

impl EveningOutcome {
    pub fn record(&mut self, outcome: &RoundOutcome) {
        self.hands += 1;
        self.final_winnings += outcome.amount;
        self.low_watermark = self.low_watermark.min(self.final_winnings);
        self.high_watermark = self.high_watermark.max(self.final_winnings);
        match outcome.result {
            RoundResult::PlayerBlackjack => {
                self.wins += 1;
                self.player_blackjacks += 1;
            }
            RoundResult::DealerBust | RoundResult::PlayerHigher => self.wins += 1,
            RoundResult::DealerBlackjack | RoundResult::PlayerBust | RoundResult::DealerHigher => {
                self.losses += 1
            }
            RoundResult::Push => self.pushes += 1,
        }
        if outcome.doubled {
            self.doubles += 1;
        }
        if outcome.reshuffled {
            self.shuffles += 1;
        }
    }

    /// The `(final, low watermark, high watermark)` triple.
    pub fn triple(&self) -> (i64, i64, i64) {
        (self.final_winnings, self.low_watermark, self.high_watermark)
    }
}

/// Simulates a Blackjack table with one tracked player, a dealer and a number
/// of untracked seats whose cards the player only gets to see.
pub struct Simulator {
    rule: Rule,
    shoe: Shoe,

    // Game state
    current_game_phase: GamePhase,
    current_bet: u32,
    doubled: bool,
}

impl Simulator {
    /// Creates a simulator with a freshly shuffled shoe.
    pub fn new(rule: &Rule) -> Result<Self> {
        let mut shoe = Shoe::new(rule.number_of_decks);
        shoe.shuffle();
        Self::with_shoe(rule, shoe)
    }

    /// Creates a simulator whose shoe shuffles are reproducible.
    pub fn with_seed(rule: &Rule, seed: u64) -> Result<Self> {
        let mut shoe = Shoe::with_seed(rule.number_of_decks, seed);
        shoe.shuffle();
        Self::with_shoe(rule, shoe)
    }

    /// Creates a simulator that deals from the given shoe as it is.
    pub fn with_shoe(rule: &Rule, shoe: Shoe) -> Result<Self> {
        rule.validate()?;
        if shoe.number_of_decks() != rule.number_of_decks {
            return Err(Error::InvalidRule(format!(
                "shoe has {} decks but the rule asks for {}",
                shoe.number_of_decks(),
                rule.number_of_decks
            )));
        }
        Ok(Self {
            rule: *rule,
            shoe,
            current_game_phase: GamePhase::StartNewShoe,
            current_bet: 0,
            doubled: false,
        })
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    pub fn current_game_phase(&self) -> GamePhase {
        self.current_game_phase
    }

    /// Plays `number_of_hands` hands and returns the player's accumulated
    /// winnings with their low and high watermarks.
    ///
    /// If the shoe has not been dealt from yet, both strategies are told that
    /// a new shoe starts.
    pub fn simulate_evening<P, D, H>(
        &mut self,
        player: &mut P,
        dealer: &mut D,
        handler: &mut H,
    ) -> Result<EveningOutcome>
    where
        P: Strategy + ?Sized,
        D: Strategy + ?Sized,
        H: SimulatorEventHandler,
    {
        if self.shoe.dealt_count() == 0 {
            player.new_shoe();
            dealer.new_shoe();
            handler.on_new_shoe(&self.shoe);
        }

        let mut evening = EveningOutcome::default();
        for _ in 0..self.rule.number_of_hands {
            let outcome = self.play_hand(player, dealer, handler)?;
            evening.record(&outcome);
        }

        log::debug!(
            "{:<32}{:>10}{:>10}{:>10}",
            "evening final / low / high",
            evening.final_winnings,
            evening.low_watermark,
            evening.high_watermark
        );
        Ok(evening)
    }

    /// Plays one complete hand, from the penetration check to the payoff.
    pub fn play_hand<P, D, H>(
        &mut self,
        player: &mut P,
        dealer: &mut D,
        handler: &mut H,
    ) -> Result<RoundOutcome>
    where
        P: Strategy + ?Sized,
        D: Strategy + ?Sized,
        H: SimulatorEventHandler,
    {
        let reshuffled = self.start_new_shoe_if_necessary(player, dealer)?;
        if reshuffled {
            handler.on_new_shoe(&self.shoe);
        }

        let bet = player.bet();
        self.place_bets(bet)?;
        handler.on_bet_money(bet);

        let dealer_up_card = self.deal_initial_cards(player, dealer)?;
        handler.on_deal_cards(player.hand(), dealer_up_card);

        let result = match self.check_naturals(player, dealer)? {
            Some(result) => result,
            None => {
                self.play_player(player, dealer_up_card, handler)?;
                self.play_dealer(player, dealer, dealer_up_card)?;
                self.settle(player, dealer)?
            }
        };

        let outcome = RoundOutcome {
            bet: self.current_bet,
            result,
            amount: result.settlement(self.current_bet, self.rule.payout_blackjack),
            doubled: self.doubled,
            reshuffled,
        };
        log::trace!(
            "player {} dealer {} -> {:?} {}",
            player.hand(),
            dealer.hand(),
            outcome.result,
            outcome.amount
        );
        handler.on_summary_game(player.hand(), dealer.hand(), &outcome);

        self.pay_off(player, dealer, outcome.amount)?;
        Ok(outcome)
    }

    /// Can be called at StartNewShoe phase.
    /// Reshuffles once the dealt fraction reaches the penetration, then tells
    /// the player and the dealer, in that order. Returns true if reshuffled.
    #[allowed_phase(StartNewShoe)]
    pub fn start_new_shoe_if_necessary<P, D>(&mut self, player: &mut P, dealer: &mut D) -> Result<bool>
    where
        P: Strategy + ?Sized,
        D: Strategy + ?Sized,
    {
        let reshuffle = self.shoe.penetration() >= self.rule.penetration;
        if reshuffle {
            log::debug!(
                "{:<32}{:>10}{:>10}",
                "reshuffling shoe at dealt/total",
                self.shoe.dealt_count(),
                self.shoe.total_count()
            );
            self.shoe.shuffle();
            player.new_shoe();
            dealer.new_shoe();
        }
        self.current_game_phase = GamePhase::PlaceBets;
        Ok(reshuffle)
    }

    /// Can be called at PlaceBets phase.
    #[allowed_phase(PlaceBets)]
    pub fn place_bets(&mut self, bet: u32) -> Result<()> {
        self.current_bet = bet;
        self.doubled = false;
        self.current_game_phase = GamePhase::DealInitialCards;
        Ok(())
    }

    /// Can be called at DealInitialCards phase.
    /// Deals two cards to the player, two to every other seat and two to the
    /// dealer. The player sees the other seats' cards and the dealer's up card,
    /// which is the dealer's second card. Returns the dealer's up card.
    #[allowed_phase(DealInitialCards)]
    pub fn deal_initial_cards<P, D>(&mut self, player: &mut P, dealer: &mut D) -> Result<Card>
    where
        P: Strategy + ?Sized,
        D: Strategy + ?Sized,
    {
        let player_cards = [self.deal_card()?, self.deal_card()?];
        player.dealt(&player_cards);

        for _ in 0..self.rule.number_of_other_seats {
            let seat_cards = [self.deal_card()?, self.deal_card()?];
            player.sees(&seat_cards);
        }

        let dealer_cards = [self.deal_card()?, self.deal_card()?];
        dealer.dealt(&dealer_cards);
        let dealer_up_card = dealer_cards[1];
        player.sees(&[dealer_up_card]);

        self.current_game_phase = GamePhase::CheckNaturals;
        Ok(dealer_up_card)
    }

    /// Can be called at CheckNaturals phase.
    /// Returns the result if either side has a blackjack, which ends the hand.
    #[allowed_phase(CheckNaturals)]
    pub fn check_naturals<P, D>(&mut self, player: &P, dealer: &D) -> Result<Option<RoundResult>>
    where
        P: Strategy + ?Sized,
        D: Strategy + ?Sized,
    {
        let result = match (
            player.hand().has_blackjack(),
            dealer.hand().has_blackjack(),
        ) {
            (true, true) => Some(RoundResult::Push),
            (true, false) => Some(RoundResult::PlayerBlackjack),
            (false, true) => Some(RoundResult::DealerBlackjack),
            (false, false) => None,
        };
        self.current_game_phase = match result {
            Some(_) => GamePhase::Payoff,
            None => GamePhase::PlayerTurn,
        };
        Ok(result)
    }

    /// Can be called at PlayerTurn phase.
    /// Asks the player for decisions until it stays, doubles or busts.
    #[allowed_phase(PlayerTurn)]
    pub fn play_player<P, H>(&mut self, player: &mut P, dealer_up_card: Card, handler: &mut H) -> Result<()>
    where
        P: Strategy + ?Sized,
        H: SimulatorEventHandler,
    {
        while !player.hand().busted() {
            let decision = player.choose(dealer_up_card);
            handler.on_make_decision(decision);
            match decision {
                Decision::Stay => break,
                Decision::Hit => {
                    let card = self.deal_card()?;
                    player.hit(card);
                }
                Decision::Double => {
                    if player.hand().len() != 2 {
                        return Err(Error::InvalidDecision {
                            decision,
                            reason: "double down is only allowed on the first two cards",
                        });
                    }
                    let card = self.deal_card()?;
                    player.hit(card);
                    self.current_bet = self.current_bet.checked_mul(2).ok_or(Error::InvalidBet {
                        bet: self.current_bet,
                        reason: "bet is too large to double",
                    })?;
                    self.doubled = true;
                    break;
                }
                Decision::Surrender | Decision::Split => {
                    return Err(Error::InvalidDecision {
                        decision,
                        reason: "only stay, hit and double are offered",
                    });
                }
            }
        }

        if player.hand().busted() {
            handler.on_player_bust();
        }
        self.current_game_phase = GamePhase::DealerTurn;
        Ok(())
    }

    /// Can be called at DealerTurn phase.
    /// The dealer plays by its own policy unless the player has busted. Every
    /// dealer hit is shown to the player.
    #[allowed_phase(DealerTurn)]
    pub fn play_dealer<P, D>(&mut self, player: &mut P, dealer: &mut D, dealer_up_card: Card) -> Result<()>
    where
        P: Strategy + ?Sized,
        D: Strategy + ?Sized,
    {
        if !player.hand().busted() {
            while !dealer.hand().busted() {
                match dealer.choose(dealer_up_card) {
                    Decision::Stay => break,
                    Decision::Hit => {
                        let card = self.deal_card()?;
                        dealer.hit(card);
                        player.sees(&[card]);
                    }
                    decision => {
                        return Err(Error::InvalidDecision {
                            decision,
                            reason: "the dealer can only stay or hit",
                        });
                    }
                }
            }
        }
        self.current_game_phase = GamePhase::Settle;
        Ok(())
    }

    /// Can be called at Settle phase.
    #[allowed_phase(Settle)]
    pub fn settle<P, D>(&mut self, player: &P, dealer: &D) -> Result<RoundResult>
    where
        P: Strategy + ?Sized,
        D: Strategy + ?Sized,
    {
        let player_hand = player.hand();
        let dealer_hand = dealer.hand();
        let result = if player_hand.busted() {
            RoundResult::PlayerBust
        } else if dealer_hand.beats(player_hand) {
            RoundResult::DealerHigher
        } else if player_hand.beats(dealer_hand) {
            if dealer_hand.busted() {
                RoundResult::DealerBust
            } else {
                RoundResult::PlayerHigher
            }
        } else {
            RoundResult::Push
        };
        self.current_game_phase = GamePhase::Payoff;
        Ok(result)
    }

    /// Can be called at Payoff phase.
    /// Pays the player and the dealer the opposite amount, which clears both hands.
    #[allowed_phase(Payoff)]
    pub fn pay_off<P, D>(&mut self, player: &mut P, dealer: &mut D, amount: i64) -> Result<()>
    where
        P: Strategy + ?Sized,
        D: Strategy + ?Sized,
    {
        player.payoff(amount);
        dealer.payoff(-amount);
        self.current_game_phase = GamePhase::StartNewShoe;
        Ok(())
    }

    fn deal_card(&mut self) -> Result<Card> {
        self.shoe.deal().ok_or(Error::ShoeExhausted {
            dealt: self.shoe.dealt_count(),
            total: self.shoe.total_count(),
        })
    }
}

/// Observer of the simulated hands. Every method does nothing by default.
pub trait SimulatorEventHandler {
    fn on_new_shoe(&mut self, _shoe: &Shoe) {}
    fn on_bet_money(&mut self, _bet: u32) {}
    fn on_deal_cards(&mut self, _player_hand: &Hand, _dealer_up_card: Card) {}
    fn on_make_decision(&mut self, _decision: Decision) {}
    fn on_player_bust(&mut self) {}
    fn on_summary_game(&mut self, _player_hand: &Hand, _dealer_hand: &Hand, _outcome: &RoundOutcome) {}
}

impl SimulatorEventHandler for () {}

/// Simulates one evening for `player` against `dealer` on a freshly shuffled shoe.
pub fn simulate<P, D>(player: &mut P, dealer: &mut D, rule: &Rule) -> Result<EveningOutcome>
where
    P: Strategy + ?Sized,
    D: Strategy + ?Sized,
{
    let mut simulator = Simulator::new(rule)?;
    simulator.simulate_evening(player, dealer, &mut ())
}

/// Same as [`simulate`] with the standard soft-17 dealer.
pub fn simulate_against_soft17<P>(player: &mut P, rule: &Rule) -> Result<EveningOutcome>
where
    P: Strategy + ?Sized,
{
    simulate(player, &mut DealerSoft17::default(), rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{BasicStrategy, CardCounter, Passive};

    fn one_hand_rule(number_of_other_seats: u8) -> Rule {
        Rule {
            number_of_decks: 1,
            penetration: 0.9,
            number_of_other_seats,
            number_of_hands: 1,
            payout_blackjack: 1.5,
        }
    }

    fn stacked(rule: &Rule, codes: &[&str]) -> Simulator {
        let firsts: Vec<Card> = codes.iter().map(|code| code.parse().unwrap()).collect();
        let mut shoe = Shoe::with_seed(rule.number_of_decks, 1);
        shoe.stack(&firsts).unwrap();
        Simulator::with_shoe(rule, shoe).unwrap()
    }

    /// Plays the decisions in order, one per card received after the first two.
    struct Scripted {
        hand: Hand,
        script: Vec<Decision>,
    }

    impl Scripted {
        fn new(script: Vec<Decision>) -> Self {
            Scripted {
                hand: Hand::new(),
                script,
            }
        }
    }

    impl Strategy for Scripted {
        fn hand(&self) -> &Hand {
            &self.hand
        }

        fn hand_mut(&mut self) -> &mut Hand {
            &mut self.hand
        }

        fn bet(&self) -> u32 {
            100
        }

        fn choose(&self, _: Card) -> Decision {
            let index = self.hand.len().saturating_sub(2);
            self.script.get(index).copied().unwrap_or(Decision::Stay)
        }

        fn title(&self) -> String {
            String::from("scripted")
        }
    }

    #[derive(Default)]
    struct Recorder {
        new_shoes: u32,
        bets: Vec<u32>,
        decisions: Vec<Decision>,
        busts: u32,
        dealer_cards: Vec<usize>,
        outcomes: Vec<RoundOutcome>,
    }

    impl SimulatorEventHandler for Recorder {
        fn on_new_shoe(&mut self, _: &Shoe) {
            self.new_shoes += 1;
        }

        fn on_bet_money(&mut self, bet: u32) {
            self.bets.push(bet);
        }

        fn on_make_decision(&mut self, decision: Decision) {
            self.decisions.push(decision);
        }

        fn on_player_bust(&mut self) {
            self.busts += 1;
        }

        fn on_summary_game(&mut self, _: &Hand, dealer_hand: &Hand, outcome: &RoundOutcome) {
            self.dealer_cards.push(dealer_hand.len());
            self.outcomes.push(*outcome);
        }
    }

    #[test]
    fn passive_loses_to_higher_dealer() {
        let rule = one_hand_rule(0);
        let mut simulator = stacked(&rule, &["TS", "6H", "9C", "9D"]);
        let evening = simulator
            .simulate_evening(&mut Passive::default(), &mut DealerSoft17::default(), &mut ())
            .unwrap();
        assert_eq!(evening.triple(), (-100, -100, 0));
        assert_eq!(evening.losses, 1);
    }

    #[test]
    fn player_blackjack_pays_one_and_a_half() {
        let rule = one_hand_rule(0);
        let mut simulator = stacked(&rule, &["AS", "KH", "9C", "8D"]);
        let evening = simulator
            .simulate_evening(&mut Passive::default(), &mut DealerSoft17::default(), &mut ())
            .unwrap();
        assert_eq!(evening.triple(), (150, 0, 150));
        assert_eq!(evening.player_blackjacks, 1);
        assert_eq!(evening.wins, 1);
    }

    #[test]
    fn both_blackjacks_push() {
        let rule = one_hand_rule(0);
        let mut simulator = stacked(&rule, &["AS", "KH", "AC", "QD"]);
        let evening = simulator
            .simulate_evening(&mut Passive::default(), &mut DealerSoft17::default(), &mut ())
            .unwrap();
        assert_eq!(evening.triple(), (0, 0, 0));
        assert_eq!(evening.pushes, 1);
    }

    #[test]
    fn dealer_blackjack_takes_the_bet() {
        let rule = one_hand_rule(0);
        let mut simulator = stacked(&rule, &["9S", "8H", "AC", "QD"]);
        let mut recorder = Recorder::default();
        let evening = simulator
            .simulate_evening(
                &mut BasicStrategy::default(),
                &mut DealerSoft17::default(),
                &mut recorder,
            )
            .unwrap();
        assert_eq!(evening.final_winnings, -100);
        assert_eq!(recorder.outcomes[0].result, RoundResult::DealerBlackjack);
        assert!(recorder.decisions.is_empty());
    }

    #[test]
    fn equal_totals_push() {
        let rule = one_hand_rule(0);
        let mut simulator = stacked(&rule, &["TS", "7H", "9C", "8D"]);
        let evening = simulator
            .simulate_evening(&mut Passive::default(), &mut DealerSoft17::default(), &mut ())
            .unwrap();
        assert_eq!(evening.triple(), (0, 0, 0));
        assert_eq!(evening.pushes, 1);
    }

    #[test]
    fn double_down_doubles_the_bet() {
        let rule = one_hand_rule(0);
        let mut simulator = stacked(&rule, &["6C", "5D", "TC", "6H", "9S", "TS"]);
        let mut player = BasicStrategy::default();
        let mut dealer = DealerSoft17::default();
        let mut recorder = Recorder::default();
        let outcome = simulator
            .play_hand(&mut player, &mut dealer, &mut recorder)
            .unwrap();
        assert_eq!(outcome.result, RoundResult::DealerBust);
        assert_eq!(outcome.bet, 200);
        assert_eq!(outcome.amount, 200);
        assert!(outcome.doubled);
        assert_eq!(recorder.decisions, vec![Decision::Double]);
        assert_eq!(recorder.dealer_cards, vec![3]);
        assert!(player.hand().is_empty());
        assert!(dealer.hand().is_empty());
        assert_eq!(simulator.current_game_phase(), GamePhase::StartNewShoe);
    }

    #[test]
    fn dealer_does_not_draw_after_player_busts() {
        let rule = one_hand_rule(0);
        let mut simulator = stacked(&rule, &["TC", "2D", "9H", "2H", "KS"]);
        let mut recorder = Recorder::default();
        let outcome = simulator
            .play_hand(
                &mut BasicStrategy::default(),
                &mut DealerSoft17::default(),
                &mut recorder,
            )
            .unwrap();
        assert_eq!(outcome.result, RoundResult::PlayerBust);
        assert_eq!(outcome.amount, -100);
        assert_eq!(recorder.busts, 1);
        assert_eq!(recorder.dealer_cards, vec![2]);
    }

    #[test]
    fn counter_sees_seats_up_card_and_hits_but_not_hole_card() {
        let rule = one_hand_rule(2);
        let mut simulator = stacked(
            &rule,
            &["2C", "3C", "4C", "5C", "6C", "7C", "KD", "TD", "TH", "5H"],
        );
        let mut player = CardCounter::new();
        let mut dealer = DealerSoft17::default();
        let outcome = simulator
            .play_hand(&mut player, &mut dealer, &mut ())
            .unwrap();
        assert_eq!(outcome.bet, 10);
        assert_eq!(outcome.result, RoundResult::Push);
        assert_eq!(player.running_count(), 4);
        assert_eq!(player.bet(), 500);
        assert_eq!(simulator.shoe().dealt_count(), 10);
    }

    #[test]
    fn late_double_is_an_invalid_decision() {
        let rule = one_hand_rule(0);
        let mut simulator = stacked(&rule, &["2C", "3C", "4C", "5C", "2D"]);
        let mut player = Scripted::new(vec![Decision::Hit, Decision::Double]);
        let result = simulator.play_hand(&mut player, &mut DealerSoft17::default(), &mut ());
        assert!(matches!(
            result,
            Err(Error::InvalidDecision {
                decision: Decision::Double,
                ..
            })
        ));
    }

    #[test]
    fn unsupported_decisions_are_rejected() {
        let rule = one_hand_rule(0);
        let mut simulator = stacked(&rule, &["2C", "3C", "4C", "5C"]);
        let mut player = Scripted::new(vec![Decision::Surrender]);
        let result = simulator.play_hand(&mut player, &mut DealerSoft17::default(), &mut ());
        assert!(matches!(
            result,
            Err(Error::InvalidDecision {
                decision: Decision::Surrender,
                ..
            })
        ));

        let mut simulator = stacked(&rule, &["TC", "8C", "4C", "5C"]);
        let mut dealer = Scripted::new(vec![Decision::Double]);
        let result = simulator.play_hand(&mut Passive::default(), &mut dealer, &mut ());
        assert!(matches!(
            result,
            Err(Error::InvalidDecision {
                decision: Decision::Double,
                ..
            })
        ));
    }

    #[test]
    fn phases_must_be_called_in_order() {
        let rule = one_hand_rule(0);
        let mut simulator = stacked(&rule, &["TS", "6H", "9C", "9D"]);
        assert_eq!(
            simulator.place_bets(100),
            Err(Error::WrongPhase {
                method: "place_bets",
                expected: GamePhase::PlaceBets,
                actual: GamePhase::StartNewShoe,
            })
        );
        let mut player = Passive::default();
        let mut dealer = DealerSoft17::default();
        assert_eq!(
            simulator.start_new_shoe_if_necessary(&mut player, &mut dealer),
            Ok(false)
        );
        assert!(simulator.place_bets(100).is_ok());
        assert!(simulator.settle(&player, &dealer).is_err());
    }

    #[test]
    fn odd_bets_are_accepted() {
        let rule = one_hand_rule(0);
        let mut simulator = stacked(&rule, &["TS", "6H", "9C", "9D"]);
        let outcome = simulator
            .play_hand(&mut Passive::new(25), &mut DealerSoft17::default(), &mut ())
            .unwrap();
        assert_eq!(outcome.result, RoundResult::DealerHigher);
        assert_eq!(outcome.amount, -25);
    }

    #[test]
    fn fractional_blackjack_payout_rounds_down() {
        let rule = one_hand_rule(0);
        let mut simulator = stacked(&rule, &["AS", "KH", "9C", "8D"]);
        let outcome = simulator
            .play_hand(&mut Passive::new(25), &mut DealerSoft17::default(), &mut ())
            .unwrap();
        assert_eq!(outcome.result, RoundResult::PlayerBlackjack);
        assert_eq!(outcome.bet, 25);
        assert_eq!(outcome.amount, 37);
    }

    #[test]
    fn exhausted_shoe_is_fatal() {
        let rule = Rule {
            penetration: 1.0,
            ..one_hand_rule(0)
        };
        let mut shoe = Shoe::with_seed(1, 3);
        shoe.shuffle();
        for _ in 0..50 {
            shoe.deal();
        }
        let mut simulator = Simulator::with_shoe(&rule, shoe).unwrap();
        let result = simulator.play_hand(&mut Passive::default(), &mut DealerSoft17::default(), &mut ());
        assert_eq!(result, Err(Error::ShoeExhausted { dealt: 52, total: 52 }));
    }

    #[test]
    fn shoe_must_match_the_rule() {
        let rule = one_hand_rule(0);
        let shoe = Shoe::with_seed(2, 3);
        assert!(matches!(
            Simulator::with_shoe(&rule, shoe),
            Err(Error::InvalidRule(_))
        ));
    }

    #[test]
    fn reshuffles_at_penetration() {
        let rule = Rule {
            number_of_decks: 1,
            penetration: 0.5,
            number_of_other_seats: 3,
            number_of_hands: 40,
            payout_blackjack: 1.5,
        };
        let mut simulator = Simulator::with_seed(&rule, 17).unwrap();
        let mut recorder = Recorder::default();
        let evening = simulator
            .simulate_evening(
                &mut Passive::default(),
                &mut DealerSoft17::default(),
                &mut recorder,
            )
            .unwrap();
        assert!(evening.shuffles >= 1);
        // The first notification is the fresh shoe at the start of the evening.
        assert_eq!(recorder.new_shoes, evening.shuffles + 1);
        assert_eq!(evening.hands, 40);
        assert_eq!(evening.wins + evening.losses + evening.pushes, 40);
        assert_eq!(recorder.bets, vec![100; 40]);
    }

    /// Always stays and counts how often it is told about a new shoe.
    struct ShoeWatcher {
        hand: Hand,
        flat_bet: u32,
        new_shoes: u32,
    }

    impl ShoeWatcher {
        fn new(flat_bet: u32) -> Self {
            ShoeWatcher {
                hand: Hand::new(),
                flat_bet,
                new_shoes: 0,
            }
        }
    }

    impl Strategy for ShoeWatcher {
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
            String::from("shoe watcher")
        }

        fn new_shoe(&mut self) {
            self.new_shoes += 1;
        }
    }

    #[test]
    fn strategies_are_told_about_every_new_shoe() {
        let rule = Rule {
            number_of_decks: 1,
            penetration: 0.5,
            number_of_other_seats: 3,
            number_of_hands: 40,
            payout_blackjack: 1.5,
        };
        let mut simulator = Simulator::with_seed(&rule, 23).unwrap();
        let mut player = ShoeWatcher::new(100);
        let mut dealer = ShoeWatcher::new(0);
        let evening = simulator
            .simulate_evening(&mut player, &mut dealer, &mut ())
            .unwrap();
        assert!(evening.shuffles >= 1);
        assert_eq!(player.new_shoes, evening.shuffles + 1);
        assert_eq!(dealer.new_shoes, evening.shuffles + 1);
    }

    #[test]
    fn reshuffle_resets_the_running_count() {
        let rule = Rule {
            number_of_decks: 1,
            penetration: 0.5,
            number_of_other_seats: 3,
            number_of_hands: 1,
            payout_blackjack: 1.5,
        };
        let mut simulator = Simulator::with_seed(&rule, 31).unwrap();
        let mut counter = CardCounter::new();
        let mut dealer = DealerSoft17::default();
        while simulator.shoe().penetration() < rule.penetration {
            simulator
                .play_hand(&mut counter, &mut dealer, &mut ())
                .unwrap();
        }
        if counter.running_count() == 0 {
            counter.sees(&["2C".parse().unwrap()]);
        }
        assert_ne!(counter.running_count(), 0);

        assert_eq!(
            simulator.start_new_shoe_if_necessary(&mut counter, &mut dealer),
            Ok(true)
        );
        assert_eq!(simulator.shoe().dealt_count(), 0);
        assert_eq!(counter.running_count(), 0);
        assert_eq!(counter.bet(), 10);
    }

    #[test]
    fn watermarks_bound_the_evening() {
        let rule = Rule::default();
        let mut simulator = Simulator::with_seed(&rule, 2024).unwrap();
        let evening = simulator
            .simulate_evening(
                &mut BasicStrategy::default(),
                &mut DealerSoft17::default(),
                &mut (),
            )
            .unwrap();
        let (last, low, high) = evening.triple();
        assert!(low <= 0 && 0 <= high);
        assert!(low <= last && last <= high);
        assert_eq!(evening.hands, 100);
        assert_eq!(evening.wins + evening.losses + evening.pushes, 100);
    }

    #[test]
    fn same_seed_same_evening() {
        let rule = Rule::default();
        let run = |seed| {
            let mut simulator = Simulator::with_seed(&rule, seed).unwrap();
            simulator
                .simulate_evening(
                    &mut CardCounter::new(),
                    &mut DealerSoft17::default(),
                    &mut (),
                )
                .unwrap()
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn simulate_against_the_soft17_dealer() {
        let rule = Rule {
            number_of_hands: 25,
            ..Rule::default()
        };
        let evening = simulate_against_soft17(&mut BasicStrategy::default(), &rule).unwrap();
        assert_eq!(evening.hands, 25);
    }

    #[test]
    fn settlement_amounts() {
        assert_eq!(RoundResult::PlayerBlackjack.settlement(100, 1.5), 150);
        assert_eq!(RoundResult::PlayerBlackjack.settlement(10, 1.2), 12);
        assert_eq!(RoundResult::PlayerBlackjack.settlement(25, 1.5), 37);
        assert_eq!(RoundResult::PlayerBlackjack.settlement(15, 1.5), 22);
        assert_eq!(RoundResult::DealerBust.settlement(200, 1.5), 200);
        assert_eq!(RoundResult::PlayerHigher.settlement(100, 1.5), 100);
        assert_eq!(RoundResult::DealerBlackjack.settlement(100, 1.5), -100);
        assert_eq!(RoundResult::PlayerBust.settlement(200, 1.5), -200);
        assert_eq!(RoundResult::DealerHigher.settlement(100, 1.5), -100);
        assert_eq!(RoundResult::Push.settlement(100, 1.5), 0);
    }
}
