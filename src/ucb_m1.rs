//! UCB-M1: heavy-tailed cost and reward, median-of-means estimation.
//!
//! Designed for arms whose draws have finite variance but fat tails (a
//! Pareto cost, say): plain empirical means are too easily dragged by a
//! single extreme draw, so both the rate and the cost-mean in the
//! denominator are medians over group means. The group count grows as
//! `⌊3.5·α·ln n⌋ + 1`, and the deviation terms need no `M·ln n/T` bias —
//! grouping already controls the tails. Second moments are assumed known,
//! as in UCB-B1.

use crate::arm::ArmSet;
use crate::estimators::{median, median_group_count};
use crate::policy::{
    check_arm_index, first_cold_arm, known_residual_variance, known_slope, rate_estimate,
    stability_holds, stabilized_cost, stable_argmax, BudgetPolicy, PolicyParams,
};
use crate::{error::Result, ArmHistory, Sample};

/// Budget-constrained UCB with median-of-means estimators for heavy-tailed
/// arms.
#[derive(Debug, Clone)]
pub struct UcbM1 {
    params: PolicyParams,
    history: Vec<ArmHistory>,
    omega: Vec<f64>,
    resid_var: Vec<f64>,
    var_cost: Vec<f64>,
}

impl UcbM1 {
    /// Build the policy for `arms`, deriving the known LMMSE slope and
    /// residual variance from each arm's true moments.
    pub fn new(arms: &ArmSet, params: PolicyParams) -> Self {
        let k = arms.len();
        let mut omega = Vec::with_capacity(k);
        let mut resid_var = Vec::with_capacity(k);
        let mut var_cost = Vec::with_capacity(k);
        for spec in arms.iter() {
            let w = known_slope(spec.var_cost, spec.cov);
            omega.push(w);
            resid_var.push(known_residual_variance(spec.var_cost, spec.var_reward, w));
            var_cost.push(spec.var_cost);
        }
        Self {
            params,
            history: vec![ArmHistory::default(); k],
            omega,
            resid_var,
            var_cost,
        }
    }

    /// Median-of-group-means rate and cost-mean for one arm.
    ///
    /// Samples are partitioned in observation order into `m` contiguous
    /// groups at query time; each group contributes one (rate, cost-mean)
    /// pair and the medians are taken per coordinate. With too few samples
    /// to fill `m` groups this degrades to the plain empirical estimators.
    fn median_estimates(&self, arm: usize, epoch: u64) -> (f64, f64) {
        let h = &self.history[arm];
        let samples = h.samples();
        let n = samples.len() as u64;
        let b_min = self.params.b_min_cost;
        if n == 0 {
            return (0.0, b_min);
        }
        let m = median_group_count(self.params.alpha, epoch, n);
        let group = samples.len() / m;
        if group == 0 {
            let mean_x = h.mean_cost();
            let mean_r = h.mean_reward();
            return (rate_estimate(mean_r, mean_x, b_min), mean_x);
        }
        let mut rates = Vec::with_capacity(m);
        let mut cost_means = Vec::with_capacity(m);
        for j in 0..m {
            let chunk = &samples[j * group..(j + 1) * group];
            let gx = chunk.iter().map(|s| s.cost).sum::<f64>() / group as f64;
            let gr = chunk.iter().map(|s| s.reward).sum::<f64>() / group as f64;
            rates.push(rate_estimate(gr, gx, b_min));
            cost_means.push(gx);
        }
        (median(&mut rates), median(&mut cost_means))
    }
}

impl BudgetPolicy for UcbM1 {
    fn name(&self) -> &'static str {
        "ucb-m1"
    }

    fn arms(&self) -> usize {
        self.history.len()
    }

    fn select_arm(&mut self, _spent: f64, epoch: u64) -> usize {
        if let Some(cold) =
            first_cold_arm(&self.history.iter().map(|h| h.pulls()).collect::<Vec<_>>())
        {
            return cold;
        }
        let p = self.params;
        let log_n = (epoch.max(1) as f64).ln();
        let scores: Vec<f64> = (0..self.history.len())
            .map(|k| {
                let t = self.history[k].pulls() as f64;
                let (r_bar, median_mean_x) = self.median_estimates(k, epoch);

                let eps = 11.0 * (p.alpha * self.resid_var[k] * log_n / t).sqrt();
                let eta = 11.0 * (p.alpha * self.var_cost[k] * log_n / t).sqrt();

                let theta_plus = stabilized_cost(median_mean_x, p.b_min_cost);
                let width = if stability_holds(eta, theta_plus) {
                    2.0 * std::f64::consts::SQRT_2 * (eps + (r_bar - self.omega[k]) * eta)
                        / theta_plus
                } else {
                    f64::INFINITY
                };
                r_bar + width
            })
            .collect();
        stable_argmax(&scores)
    }

    fn record(&mut self, arm: usize, sample: Sample) -> Result<()> {
        check_arm_index(arm, self.history.len())?;
        self.history[arm].record(sample);
        Ok(())
    }

    fn reset(&mut self) {
        for h in &mut self.history {
            h.clear();
        }
    }
}
