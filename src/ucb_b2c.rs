//! UCB-B2C: bounded, *correlated* cost and reward, unknown second moments.
//!
//! Like UCB-B2 this assumes only the almost-sure bounds, but it estimates
//! the cost/reward dependence instead of ignoring it: each round the LMMSE
//! slope `ω̂` and the residual variance of `R − ω̂X` are recomputed from the
//! arm's full sample history, and the reward-side deviation uses the
//! combined bound `M_Z = M_R + ω̄·M_X` (with `ω̄` the configured slope cap).

use crate::arm::ArmSet;
use crate::estimators::{empirical_variance, lmmse_residual_variance, lmmse_slope};
use crate::policy::{
    check_arm_index, first_cold_arm, rate_estimate, stability_holds, stabilized_cost,
    stable_argmax, BudgetPolicy, PolicyParams,
};
use crate::{error::Result, ArmHistory, Sample};

/// Budget-constrained UCB for bounded, correlated arms with an empirical
/// LMMSE correction.
#[derive(Debug, Clone)]
pub struct UcbB2c {
    params: PolicyParams,
    history: Vec<ArmHistory>,
    cost_bound: Vec<f64>,
    reward_bound: Vec<f64>,
}

impl UcbB2c {
    /// Build the policy for `arms`, reading `M_X`/`M_R` from each spec.
    pub fn new(arms: &ArmSet, params: PolicyParams) -> Self {
        Self {
            params,
            history: vec![ArmHistory::default(); arms.len()],
            cost_bound: arms.iter().map(|a| a.cost_bound).collect(),
            reward_bound: arms.iter().map(|a| a.reward_bound).collect(),
        }
    }
}

impl BudgetPolicy for UcbB2c {
    fn name(&self) -> &'static str {
        "ucb-b2c"
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
        let log_n_alpha = p.alpha * (epoch.max(1) as f64).ln();
        let scores: Vec<f64> = self
            .history
            .iter()
            .enumerate()
            .map(|(k, h)| {
                let n = h.pulls();
                let t = n as f64;
                let (sum_x, sum_r, sum_xx, sum_rr, sum_xr) = h.sums();
                let mean_x = sum_x / t;
                let mean_r = sum_r / t;
                let r_hat = rate_estimate(mean_r, mean_x, p.b_min_cost);

                let omega_hat = lmmse_slope(sum_x, sum_r, sum_xx, sum_rr, sum_xr, n);
                let resid =
                    lmmse_residual_variance(sum_x, sum_r, sum_xx, sum_rr, sum_xr, n, omega_hat);
                let var_x = empirical_variance(sum_xx, sum_x, n);

                let m_z = self.reward_bound[k] + p.omega_bar * self.cost_bound[k];
                let eps = (2.0 * resid * log_n_alpha / t).sqrt() + 3.0 * m_z * log_n_alpha / t;
                let eta = (2.0 * var_x * log_n_alpha / t).sqrt()
                    + 3.0 * self.cost_bound[k] * log_n_alpha / t;

                let theta_plus = stabilized_cost(mean_x, p.b_min_cost);
                let width = if stability_holds(eta, theta_plus) {
                    1.4 * (eps + (r_hat - omega_hat).max(0.0) * eta) / theta_plus
                } else {
                    f64::INFINITY
                };
                r_hat + width
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm::ArmSpec;

    fn set() -> ArmSet {
        ArmSet::new(vec![
            ArmSpec::bounded_uniform("good", (0.5, 1.5), (2.0, 4.0), 0.3),
            ArmSpec::bounded_uniform("poor", (0.5, 1.5), (0.5, 1.5), 0.3),
        ])
        .unwrap()
    }

    #[test]
    fn cold_start_walks_arms_in_order() {
        let mut p = UcbB2c::new(&set(), PolicyParams::default());
        assert_eq!(p.select_arm(0.0, 1), 0);
        p.record(0, Sample { cost: 1.0, reward: 3.0 }).unwrap();
        assert_eq!(p.select_arm(1.0, 2), 1);
    }

    #[test]
    fn prefers_the_higher_rate_arm_once_confident() {
        let mut p = UcbB2c::new(&set(), PolicyParams::default());
        // Correlated wobble: reward moves with cost, exercising the LMMSE
        // path with a genuinely nonzero slope. The count is large enough
        // that the M_Z bias decays below the stability margin.
        for i in 0..2500 {
            let wobble = if i % 2 == 0 { 0.05 } else { -0.05 };
            p.record(0, Sample { cost: 1.0 + wobble, reward: 3.0 + 2.0 * wobble }).unwrap();
            p.record(1, Sample { cost: 1.0 + wobble, reward: 1.0 + 2.0 * wobble }).unwrap();
        }
        assert_eq!(p.select_arm(5000.0, 5001), 0);
    }

    #[test]
    fn exact_linear_reward_shrinks_the_reward_deviation() {
        // R = 2X exactly: residual variance is 0, so the width comes only
        // from the bias terms and the cost deviation.
        let mut p = UcbB2c::new(&set(), PolicyParams::default());
        for i in 0..2500 {
            let x = 0.8 + 0.01 * (i % 5) as f64;
            p.record(0, Sample { cost: x, reward: 2.0 * x }).unwrap();
            p.record(1, Sample { cost: x, reward: 0.5 * x }).unwrap();
        }
        assert_eq!(p.select_arm(0.0, 5001), 0);
    }

    #[test]
    fn reset_matches_a_fresh_instance() {
        let arms = set();
        let mut used = UcbB2c::new(&arms, PolicyParams::default());
        for i in 0..30 {
            used.record(i % 2, Sample { cost: 1.0, reward: (i % 4) as f64 }).unwrap();
        }
        used.reset();
        let mut fresh = UcbB2c::new(&arms, PolicyParams::default());
        for epoch in 1..8 {
            assert_eq!(used.select_arm(0.0, epoch), fresh.select_arm(0.0, epoch));
            let s = Sample { cost: 0.9, reward: 2.1 };
            used.record(1, s).unwrap();
            fresh.record(1, s).unwrap();
        }
    }

    #[test]
    fn record_rejects_out_of_range_arm() {
        let mut p = UcbB2c::new(&set(), PolicyParams::default());
        assert!(p.record(9, Sample { cost: 1.0, reward: 1.0 }).is_err());
    }
}
