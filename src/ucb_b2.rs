//! UCB-B2: bounded, uncorrelated cost and reward, unknown second moments.
//!
//! Only the almost-sure bounds `M_X`, `M_R` are assumed known; variances are
//! estimated from running sums and enter Bernstein-style widths with the
//! `3·M·ln(n^α)/T` bias term. No correlation is exploited: the reward-side
//! deviation multiplies the full rate estimate.

use crate::arm::ArmSet;
use crate::policy::{
    check_arm_index, first_cold_arm, rate_estimate, stability_holds, stabilized_cost,
    stable_argmax, BudgetPolicy, PolicyParams,
};
use crate::{error::Result, ArmStats, Sample};

/// Budget-constrained UCB for bounded, uncorrelated arms with empirical
/// variance estimates.
#[derive(Debug, Clone)]
pub struct UcbB2 {
    params: PolicyParams,
    stats: Vec<ArmStats>,
    cost_bound: Vec<f64>,
    reward_bound: Vec<f64>,
}

impl UcbB2 {
    /// Build the policy for `arms`, reading `M_X`/`M_R` from each spec.
    pub fn new(arms: &ArmSet, params: PolicyParams) -> Self {
        Self {
            params,
            stats: vec![ArmStats::default(); arms.len()],
            cost_bound: arms.iter().map(|a| a.cost_bound).collect(),
            reward_bound: arms.iter().map(|a| a.reward_bound).collect(),
        }
    }
}

impl BudgetPolicy for UcbB2 {
    fn name(&self) -> &'static str {
        "ucb-b2"
    }

    fn arms(&self) -> usize {
        self.stats.len()
    }

    fn select_arm(&mut self, _spent: f64, epoch: u64) -> usize {
        if let Some(cold) = first_cold_arm(&self.stats.iter().map(|s| s.pulls).collect::<Vec<_>>())
        {
            return cold;
        }
        let p = self.params;
        // ln(n^α) = α·ln n.
        let log_n_alpha = p.alpha * (epoch.max(1) as f64).ln();
        let scores: Vec<f64> = self
            .stats
            .iter()
            .enumerate()
            .map(|(k, s)| {
                let t = s.pulls as f64;
                let mean_x = s.mean_cost();
                let mean_r = s.mean_reward();
                let var_x = s.var_cost();
                let var_r = s.var_reward();
                let r_hat = rate_estimate(mean_r, mean_x, p.b_min_cost);

                let eps = (2.0 * var_r * log_n_alpha / t).sqrt()
                    + 3.0 * self.reward_bound[k] * log_n_alpha / t;
                let eta = (2.0 * var_x * log_n_alpha / t).sqrt()
                    + 3.0 * self.cost_bound[k] * log_n_alpha / t;

                let theta_plus = stabilized_cost(mean_x, p.b_min_cost);
                let width = if stability_holds(eta, theta_plus) {
                    1.4 * (eps + r_hat * eta) / theta_plus
                } else {
                    f64::INFINITY
                };
                r_hat + width
            })
            .collect();
        stable_argmax(&scores)
    }

    fn record(&mut self, arm: usize, sample: Sample) -> Result<()> {
        check_arm_index(arm, self.stats.len())?;
        self.stats[arm].record(sample);
        Ok(())
    }

    fn reset(&mut self) {
        for s in &mut self.stats {
            s.clear();
        }
    }
}
