//! Simulation driver: single budgeted trials and Monte Carlo sweeps.
//!
//! A trial is the strictly sequential loop `select → pull → record` until
//! the accumulated cost exceeds the budget. Trials are fully independent —
//! each owns a fresh policy and a freshly seeded environment — which makes
//! the outer Monte Carlo loop embarrassingly parallel: with the `parallel`
//! feature, trials fan out across threads and join only to aggregate.
//! Per-trial seeds are derived from the sweep seed with a SplitMix64
//! counter mix, so serial and parallel execution produce identical numbers.

use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::arm::ArmSet;
use crate::error::{Error, Result};
use crate::policy::BudgetPolicy;
use crate::sampler::Environment;

/// Outcome of one budgeted trial.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialOutcome {
    /// Total reward gathered, including the final budget-crossing epoch.
    pub total_reward: f64,
    /// Total cost spent (first value strictly above the budget).
    pub total_cost: f64,
    /// Number of epochs (arm pulls) used.
    pub epochs: u64,
    /// Per-arm pull counts, aligned to arm indices.
    pub pulls: Vec<u64>,
}

impl TrialOutcome {
    /// Regret against the optimal static policy: `optimal_rate·B − reward`.
    pub fn regret(&self, optimal_rate: f64, budget: f64) -> f64 {
        optimal_rate * budget - self.total_reward
    }
}

/// One aggregate result row per (algorithm, budget) — the reporting
/// boundary. Serialize it into whatever sink the caller uses.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SweepRow {
    /// Policy identifier ([`BudgetPolicy::name`]).
    pub algorithm: String,
    /// Budget this row was run at.
    pub budget: f64,
    /// Mean total reward over the trials.
    pub avg_reward: f64,
    /// Population standard deviation of total reward.
    pub std_reward: f64,
    /// Mean regret over the trials.
    pub avg_regret: f64,
    /// Population standard deviation of regret.
    pub std_regret: f64,
    /// The benchmark `optimal_rate · budget` the regret is measured against.
    pub optimal_static_reward: f64,
}

/// Monte Carlo sweep parameters.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SweepConfig {
    /// Budgets to sweep, one [`SweepRow`] each.
    pub budgets: Vec<f64>,
    /// Independent trials per budget.
    pub trials: u32,
    /// Base seed; per-trial seeds are derived from it deterministically.
    pub seed: u64,
    /// Defensive cap on epochs per trial. Termination is almost-sure from
    /// `mean_cost > 0` alone, but a heavy-tailed environment can stall a
    /// trial on pathological draws; the cap bounds the worst case.
    pub max_rounds: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            budgets: vec![1_000.0, 2_000.0, 5_000.0],
            trials: 200,
            seed: 0,
            max_rounds: 1_000_000,
        }
    }
}

/// SplitMix64 mix of a base seed and a trial counter.
///
/// Gives every trial a well-separated, reproducible RNG stream regardless
/// of which thread runs it.
pub(crate) fn trial_seed(base: u64, counter: u64) -> u64 {
    let mut z = base.wrapping_add(counter.wrapping_mul(0x9e37_79b9_7f4a_7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Run a single trial: pull arms until the accumulated cost exceeds
/// `budget` (the budget-crossing epoch's reward counts), or until
/// `max_rounds` epochs have elapsed.
pub fn run_trial<P: BudgetPolicy + ?Sized>(
    policy: &mut P,
    env: &mut Environment,
    budget: f64,
    max_rounds: u64,
) -> Result<TrialOutcome> {
    if policy.arms() != env.arms() {
        return Err(Error::ArmCountMismatch {
            policy_arms: policy.arms(),
            env_arms: env.arms(),
        });
    }
    let mut pulls = vec![0u64; env.arms()];
    let mut total_cost = 0.0;
    let mut total_reward = 0.0;
    let mut epoch = 0u64;
    while total_cost <= budget && epoch < max_rounds {
        epoch += 1;
        let arm = policy.select_arm(total_cost, epoch);
        let sample = env.pull(arm)?;
        policy.record(arm, sample)?;
        pulls[arm] += 1;
        total_cost += sample.cost;
        total_reward += sample.reward;
    }
    Ok(TrialOutcome {
        total_reward,
        total_cost,
        epochs: epoch,
        pulls,
    })
}

/// Run the full Monte Carlo sweep for one policy family: for every budget,
/// `cfg.trials` independent trials, each with a fresh policy from
/// `make_policy` and a fresh environment seeded per trial.
///
/// Returns one [`SweepRow`] per budget, in budget order.
pub fn run_sweep<P, F>(arms: &ArmSet, make_policy: F, cfg: &SweepConfig) -> Result<Vec<SweepRow>>
where
    P: BudgetPolicy,
    F: Fn(&ArmSet) -> P + Sync,
{
    let algorithm = make_policy(arms).name().to_string();
    let optimal_rate = arms.optimal_rate();
    let mut rows = Vec::with_capacity(cfg.budgets.len());

    for (budget_idx, &budget) in cfg.budgets.iter().enumerate() {
        debug!(algorithm = %algorithm, budget, trials = cfg.trials, "sweep point start");

        let run_one = |trial_idx: u32| -> Result<TrialOutcome> {
            let counter = budget_idx as u64 * cfg.trials as u64 + trial_idx as u64;
            let mut env = Environment::with_seed(arms, trial_seed(cfg.seed, counter))?;
            let mut policy = make_policy(arms);
            run_trial(&mut policy, &mut env, budget, cfg.max_rounds)
        };

        #[cfg(feature = "parallel")]
        let outcomes: Vec<TrialOutcome> = (0..cfg.trials)
            .into_par_iter()
            .map(run_one)
            .collect::<Result<Vec<_>>>()?;
        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<TrialOutcome> =
            (0..cfg.trials).map(run_one).collect::<Result<Vec<_>>>()?;

        let rewards: Vec<f64> = outcomes.iter().map(|o| o.total_reward).collect();
        let regrets: Vec<f64> = outcomes
            .iter()
            .map(|o| o.regret(optimal_rate, budget))
            .collect();
        let (avg_reward, std_reward) = mean_std(&rewards);
        let (avg_regret, std_regret) = mean_std(&regrets);

        info!(
            algorithm = %algorithm,
            budget,
            avg_reward,
            avg_regret,
            "sweep point done"
        );
        rows.push(SweepRow {
            algorithm: algorithm.clone(),
            budget,
            avg_reward,
            std_reward,
            avg_regret,
            std_regret,
            optimal_static_reward: optimal_rate * budget,
        });
    }
    Ok(rows)
}

/// Mean and population standard deviation.
fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}
