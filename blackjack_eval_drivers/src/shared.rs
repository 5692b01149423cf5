use anyhow::Context;
use blackjack_eval::{EveningOutcome, StrategyKind};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rule: ConfigRule,
    pub blackjack_evaluator: ConfigBlackjackEvaluator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRule {
    pub number_of_decks: u8,
    pub penetration: f64,
    pub number_of_other_seats: u8,
    pub number_of_hands: u32,
    pub payout_blackjack: f64,
}

impl TryInto<blackjack_eval::Rule> for ConfigRule {
    type Error = blackjack_eval::Error;

    fn try_into(self) -> Result<blackjack_eval::Rule, Self::Error> {
        let rule = blackjack_eval::Rule {
            number_of_decks: self.number_of_decks,
            penetration: self.penetration,
            number_of_other_seats: self.number_of_other_seats,
            number_of_hands: self.number_of_hands,
            payout_blackjack: self.payout_blackjack,
        };
        rule.validate()?;

        Ok(rule)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigBlackjackEvaluator {
    pub number_of_trials: u32,
    pub number_of_threads: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    pub player: String,
    #[serde(default = "default_dealer")]
    pub dealer: String,
}

fn default_dealer() -> String {
    StrategyKind::DealerSoft17.to_string()
}

impl TryInto<blackjack_eval::TrialPlan> for ConfigBlackjackEvaluator {
    type Error = serde::de::value::Error;

    fn try_into(self) -> Result<blackjack_eval::TrialPlan, Self::Error> {
        let plan = blackjack_eval::TrialPlan {
            number_of_trials: self.number_of_trials,
            number_of_threads: self.number_of_threads,
            seed: self.seed,
            player: self.player.parse()?,
            dealer: self.dealer.parse()?,
        };

        Ok(plan)
    }
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file(filename: &str) -> anyhow::Result<Config> {
    let file_content = fs::read_to_string(filename)
        .with_context(|| format!("cannot read config file {}", filename))?;
    let config = serde_yaml::from_str(&file_content)
        .with_context(|| format!("cannot parse config file {}", filename))?;
    Ok(config)
}

/// Summary over the outcomes of many evenings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub trials: usize,
    pub hands: u64,
    pub mean_final: f64,
    pub min_final: i64,
    pub max_final: i64,
    pub mean_low_watermark: f64,
    pub mean_high_watermark: f64,
    pub worst_low_watermark: i64,
    pub best_high_watermark: i64,
    pub winning_evenings: usize,
    pub losing_evenings: usize,
    pub doubles: u64,
    pub player_blackjacks: u64,
    pub shuffles: u64,
}

impl Statistics {
    pub fn from_outcomes(outcomes: &[EveningOutcome]) -> Statistics {
        if outcomes.is_empty() {
            return Statistics::default();
        }
        let mut stat = Statistics {
            trials: outcomes.len(),
            min_final: i64::MAX,
            max_final: i64::MIN,
            worst_low_watermark: i64::MAX,
            best_high_watermark: i64::MIN,
            ..Statistics::default()
        };
        let mut sum_final = 0;
        let mut sum_low = 0;
        let mut sum_high = 0;
        for outcome in outcomes {
            stat.hands += outcome.hands as u64;
            stat.min_final = stat.min_final.min(outcome.final_winnings);
            stat.max_final = stat.max_final.max(outcome.final_winnings);
            stat.worst_low_watermark = stat.worst_low_watermark.min(outcome.low_watermark);
            stat.best_high_watermark = stat.best_high_watermark.max(outcome.high_watermark);
            if outcome.final_winnings > 0 {
                stat.winning_evenings += 1;
            } else if outcome.final_winnings < 0 {
                stat.losing_evenings += 1;
            }
            stat.doubles += outcome.doubles as u64;
            stat.player_blackjacks += outcome.player_blackjacks as u64;
            stat.shuffles += outcome.shuffles as u64;
            sum_final += outcome.final_winnings;
            sum_low += outcome.low_watermark;
            sum_high += outcome.high_watermark;
        }
        let n = outcomes.len() as f64;
        stat.mean_final = sum_final as f64 / n;
        stat.mean_low_watermark = sum_low as f64 / n;
        stat.mean_high_watermark = sum_high as f64 / n;
        stat
    }
}

/// What the evaluator writes out: the three per-evening sequences, in trial order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub player: String,
    pub dealer: String,
    pub finals: Vec<i64>,
    pub low_watermarks: Vec<i64>,
    pub high_watermarks: Vec<i64>,
}

impl Report {
    pub fn new(plan: &blackjack_eval::TrialPlan, results: &blackjack_eval::TrialResults) -> Report {
        Report {
            player: plan.player.to_string(),
            dealer: plan.dealer.to_string(),
            finals: results.finals(),
            low_watermarks: results.low_watermarks(),
            high_watermarks: results.high_watermarks(),
        }
    }
}
