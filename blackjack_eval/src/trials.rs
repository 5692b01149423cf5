use std::thread;

use serde::{Deserialize, Serialize};

use crate::{
    simulation::{EveningOutcome, Simulator},
    Error, Result, Rule, StrategyKind,
};

/// How many evenings to simulate, on how many threads and for which pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialPlan {
    pub number_of_trials: u32,
    /// 0 means one thread per available core.
    pub number_of_threads: usize,
    /// Trial `i` shuffles with `seed + i`. Drawn from entropy if absent.
    pub seed: Option<u64>,
    pub player: StrategyKind,
    pub dealer: StrategyKind,
}

impl TrialPlan {
    fn threads(&self) -> usize {
        match self.number_of_threads {
            0 => thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            n => n,
        }
    }
}

impl Default for TrialPlan {
    fn default() -> Self {
        TrialPlan {
            number_of_trials: 1000,
            number_of_threads: 0,
            seed: None,
            player: StrategyKind::BasicStrategy,
            dealer: StrategyKind::DealerSoft17,
        }
    }
}

/// One outcome per trial, in trial order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialResults {
    pub outcomes: Vec<EveningOutcome>,
}

impl TrialResults {
    pub fn finals(&self) -> Vec<i64> {
        self.outcomes.iter().map(|o| o.final_winnings).collect()
    }

    pub fn low_watermarks(&self) -> Vec<i64> {
        self.outcomes.iter().map(|o| o.low_watermark).collect()
    }

    pub fn high_watermarks(&self) -> Vec<i64> {
        self.outcomes.iter().map(|o| o.high_watermark).collect()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Runs independent evenings, each with fresh strategies and its own shoe.
///
/// Trials are dispatched round-robin over the worker threads. The results do
/// not depend on the number of threads when a seed is given.
pub fn run_trials(rule: &Rule, plan: &TrialPlan) -> Result<TrialResults> {
    rule.validate()?;
    let number_of_trials = plan.number_of_trials as usize;
    let number_of_threads = plan.threads().clamp(1, number_of_trials.max(1));
    let base_seed = plan.seed.unwrap_or_else(rand::random);
    log::info!(
        "{:<32}{:>10}{:>10}",
        "running trials / threads",
        number_of_trials,
        number_of_threads
    );
    log::debug!("{:<32}{:>10}", "base seed", base_seed);

    let mut dispatched_trials: Vec<Vec<usize>> = vec![Vec::new(); number_of_threads];
    for index in 0..number_of_trials {
        dispatched_trials[index % number_of_threads].push(index);
    }

    let batches: Vec<Result<Vec<(usize, EveningOutcome)>>> = thread::scope(|scope| {
        let workers: Vec<_> = dispatched_trials
            .into_iter()
            .map(|indices| scope.spawn(move || run_evenings(rule, plan, base_seed, &indices)))
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().map_err(|_| Error::WorkerPanicked)?)
            .collect()
    });

    let mut outcomes = vec![EveningOutcome::default(); number_of_trials];
    for batch in batches {
        for (index, outcome) in batch? {
            outcomes[index] = outcome;
        }
    }
    Ok(TrialResults { outcomes })
}

fn run_evenings(
    rule: &Rule,
    plan: &TrialPlan,
    base_seed: u64,
    indices: &[usize],
) -> Result<Vec<(usize, EveningOutcome)>> {
    let mut finished = Vec::with_capacity(indices.len());
    for &index in indices {
        let mut player = plan.player.build();
        let mut dealer = plan.dealer.build();
        let mut simulator = Simulator::with_seed(rule, base_seed.wrapping_add(index as u64))?;
        let outcome = simulator.simulate_evening(player.as_mut(), dealer.as_mut(), &mut ())?;
        log::trace!("trial {} finished at {}", index, outcome.final_winnings);
        finished.push((index, outcome));
    }
    Ok(finished)
}
