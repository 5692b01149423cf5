use anyhow::{bail, Context};
use blackjack_eval::{run_trials, Rule, StrategyKind, TrialPlan};
use blackjack_eval_drivers::{parse_config_from_file, Report, Statistics};
use clap::Parser;
use std::fs;

const DEFAULT_CONFIG_PATH: &str = "~/.blackjack_eval.yml";

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    /// Number of evenings to simulate, overrides the config file
    #[arg(short, long)]
    trials: Option<u32>,

    /// Number of worker threads, 0 for one per core
    #[arg(long)]
    threads: Option<usize>,

    /// Player strategy: Passive, BasicStrategy or CardCounter
    #[arg(short, long)]
    player: Option<StrategyKind>,

    /// Dealer strategy, DealerSoft17 unless configured otherwise
    #[arg(short, long)]
    dealer: Option<StrategyKind>,

    /// Seed for reproducible shuffles
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write a YAML report here instead of printing the final winnings
    #[arg(short, long)]
    output: Option<String>,
}

/// Loads rule and plan from the config file. The default config file is optional.
fn load(args: &CommandLineArgs) -> anyhow::Result<(Rule, TrialPlan)> {
    let path = if args.config == DEFAULT_CONFIG_PATH {
        let home_dir = home::home_dir().context("cannot find home directory")?;
        let config_file_path = home_dir.join(".blackjack_eval.yml");
        if !config_file_path.exists() {
            log::warn!(
                "{:<32}{}",
                "no config file, using defaults",
                config_file_path.display()
            );
            return Ok((Rule::default(), TrialPlan::default()));
        }
        if config_file_path.is_dir() {
            bail!("{} should be a file rather than a directory", config_file_path.display());
        }
        config_file_path.to_string_lossy().into_owned()
    } else {
        args.config.clone()
    };

    let config = parse_config_from_file(&path)?;
    log::debug!("{:#?}", config);
    let rule: Rule = config.rule.try_into()?;
    let plan: TrialPlan = config.blackjack_evaluator.try_into()?;
    Ok((rule, plan))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CommandLineArgs::parse();
    let (rule, mut plan) = load(&args)?;
    if let Some(trials) = args.trials {
        plan.number_of_trials = trials;
    }
    if let Some(threads) = args.threads {
        plan.number_of_threads = threads;
    }
    if let Some(player) = args.player {
        plan.player = player;
    }
    if let Some(dealer) = args.dealer {
        plan.dealer = dealer;
    }
    if args.seed.is_some() {
        plan.seed = args.seed;
    }
    log::info!("{:<32}{} vs {}", "evaluating", plan.player, plan.dealer);

    let results = run_trials(&rule, &plan)?;

    let stat = Statistics::from_outcomes(&results.outcomes);
    log::info!("{:<32}{:>12}", "evenings", stat.trials);
    log::info!("{:<32}{:>12}", "hands", stat.hands);
    log::info!("{:<32}{:>12.2}", "mean final", stat.mean_final);
    log::info!("{:<32}{:>12}{:>12}", "min / max final", stat.min_final, stat.max_final);
    log::info!(
        "{:<32}{:>12.2}{:>12.2}",
        "mean low / high watermark",
        stat.mean_low_watermark,
        stat.mean_high_watermark
    );
    log::info!(
        "{:<32}{:>12}{:>12}",
        "worst low / best high",
        stat.worst_low_watermark,
        stat.best_high_watermark
    );
    log::info!(
        "{:<32}{:>12}{:>12}",
        "winning / losing evenings",
        stat.winning_evenings,
        stat.losing_evenings
    );

    match &args.output {
        Some(path) => {
            let report = serde_yaml::to_string(&Report::new(&plan, &results))?;
            fs::write(path, report).with_context(|| format!("cannot write report to {}", path))?;
            log::info!("{:<32}{}", "report written to", path);
        }
        None => {
            for final_winnings in results.finals() {
                println!("{}", final_winnings);
            }
        }
    }
    Ok(())
}
