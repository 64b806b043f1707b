//! Arm descriptors and the validated problem instance.
//!
//! An [`ArmSpec`] is an immutable description of one arm: its sampling
//! family, its true first and second moments (used for the optimal-rate
//! benchmark, and handed to policies that assume moments are known), and
//! almost-sure bounds for the bounded-variable confidence terms.
//!
//! [`ArmSet`] is the validated, ordered collection: construction is where
//! all fatal configuration errors surface (empty set, non-positive expected
//! cost, non-PSD Gaussian covariance). A successfully built `ArmSet` can
//! always be turned into an environment and scored against its true optimal
//! rate.

use crate::error::{Error, Result};
use crate::sampler::cholesky2;

/// Sampling family and family-specific shape parameters for one arm.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistributionKind {
    /// Jointly Gaussian (cost, reward) with the covariance taken from the
    /// arm's true second moments. The covariance matrix must be positive
    /// semi-definite; this is checked when the [`ArmSet`] is built.
    Gaussian,
    /// Independent uniform cost and reward on the given ranges, with a
    /// crude linear correlation nudge driven by one shared uniform draw.
    ///
    /// The nudge adds `correlation · (u − 0.5) · range` to each coordinate.
    /// This is an approximation: it neither achieves the exact target
    /// correlation nor preserves the uniform marginals precisely.
    BoundedUniform {
        /// Lower end of the cost range.
        min_cost: f64,
        /// Upper end of the cost range.
        max_cost: f64,
        /// Lower end of the reward range.
        min_reward: f64,
        /// Upper end of the reward range.
        max_reward: f64,
        /// Strength of the shared-draw nudge (0 disables).
        correlation: f64,
    },
    /// Heavy-tailed pair: Pareto-I cost (minimum value `pareto_scale`,
    /// shape `pareto_shape`) and Lognormal reward, with an optional shared
    /// standard-normal common factor scaled by `correlation` added to both.
    ///
    /// As with [`DistributionKind::BoundedUniform`], the injected
    /// correlation is a proxy, not an exact copula construction; it perturbs
    /// the marginals slightly. Exact correlated heavy-tailed sampling would
    /// need a copula and is deliberately out of scope.
    HeavyTailed {
        /// Pareto shape parameter (`> 1` for a finite mean, `> 2` for a
        /// finite variance).
        pareto_shape: f64,
        /// Pareto scale: the almost-sure minimum cost.
        pareto_scale: f64,
        /// Mean of the underlying normal for the Lognormal reward.
        lognormal_mu: f64,
        /// Std-dev of the underlying normal for the Lognormal reward.
        lognormal_sigma: f64,
        /// Scale of the shared common factor (0 disables).
        correlation: f64,
    },
}

/// Immutable descriptor for a single arm.
///
/// True moments are what the environment samples from (Gaussian) or what
/// the benchmark and the known-moment policies consume (all families). The
/// bounds are the `M` constants of the bounded-variable confidence terms.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmSpec {
    /// Human-readable arm name (used in errors and result rows).
    pub name: String,
    /// Sampling family and shape parameters.
    pub kind: DistributionKind,
    /// True expected cost. Must be strictly positive.
    pub mean_cost: f64,
    /// True expected reward.
    pub mean_reward: f64,
    /// True cost variance.
    pub var_cost: f64,
    /// True reward variance.
    pub var_reward: f64,
    /// True cost/reward covariance.
    pub cov: f64,
    /// Almost-sure upper bound on a single cost draw (`M_X`).
    pub cost_bound: f64,
    /// Almost-sure upper bound on a single reward draw (`M_R`).
    pub reward_bound: f64,
}

impl ArmSpec {
    /// Jointly Gaussian arm from its true moments.
    pub fn gaussian(
        name: impl Into<String>,
        mean_cost: f64,
        mean_reward: f64,
        var_cost: f64,
        var_reward: f64,
        cov: f64,
    ) -> Self {
        Self {
            name: name.into(),
            kind: DistributionKind::Gaussian,
            mean_cost,
            mean_reward,
            var_cost,
            var_reward,
            cov,
            cost_bound: 0.0,
            reward_bound: 0.0,
        }
    }

    /// Bounded-uniform arm; true moments are derived from the ranges.
    pub fn bounded_uniform(
        name: impl Into<String>,
        (min_cost, max_cost): (f64, f64),
        (min_reward, max_reward): (f64, f64),
        correlation: f64,
    ) -> Self {
        let span_c = max_cost - min_cost;
        let span_r = max_reward - min_reward;
        Self {
            name: name.into(),
            kind: DistributionKind::BoundedUniform {
                min_cost,
                max_cost,
                min_reward,
                max_reward,
                correlation,
            },
            mean_cost: 0.5 * (min_cost + max_cost),
            mean_reward: 0.5 * (min_reward + max_reward),
            var_cost: span_c * span_c / 12.0,
            var_reward: span_r * span_r / 12.0,
            cov: 0.0,
            cost_bound: max_cost,
            reward_bound: max_reward,
        }
    }

    /// Heavy-tailed arm. The caller supplies the true moments explicitly:
    /// the injected correlation makes closed forms for the joint moments
    /// approximate, so they are configuration inputs, as in any benchmark
    /// against declared ground truth.
    #[allow(clippy::too_many_arguments)]
    pub fn heavy_tailed(
        name: impl Into<String>,
        pareto_shape: f64,
        pareto_scale: f64,
        lognormal_mu: f64,
        lognormal_sigma: f64,
        correlation: f64,
        mean_cost: f64,
        mean_reward: f64,
    ) -> Self {
        Self {
            name: name.into(),
            kind: DistributionKind::HeavyTailed {
                pareto_shape,
                pareto_scale,
                lognormal_mu,
                lognormal_sigma,
                correlation,
            },
            mean_cost,
            mean_reward,
            var_cost: 0.0,
            var_reward: 0.0,
            cov: 0.0,
            cost_bound: 0.0,
            reward_bound: 0.0,
        }
    }

    /// Set the true second moments (used by known-moment policies and the
    /// Gaussian sampler).
    pub fn with_moments(mut self, var_cost: f64, var_reward: f64, cov: f64) -> Self {
        self.var_cost = var_cost;
        self.var_reward = var_reward;
        self.cov = cov;
        self
    }

    /// Set the almost-sure bounds consumed by the bounded-variable
    /// confidence terms (`M_X`, `M_R`).
    pub fn with_bounds(mut self, cost_bound: f64, reward_bound: f64) -> Self {
        self.cost_bound = cost_bound;
        self.reward_bound = reward_bound;
        self
    }

    /// True reward rate `mean_reward / mean_cost`.
    pub fn rate(&self) -> f64 {
        self.mean_reward / self.mean_cost
    }
}

/// Validated, ordered collection of arms — the problem instance.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmSet {
    arms: Vec<ArmSpec>,
}

impl ArmSet {
    /// Validate and build an arm set.
    ///
    /// Errors are the fatal configuration class: empty set, any arm with
    /// `mean_cost <= 0`, or a Gaussian arm whose covariance matrix is not
    /// positive semi-definite.
    pub fn new(arms: Vec<ArmSpec>) -> Result<Self> {
        if arms.is_empty() {
            return Err(Error::EmptyArms);
        }
        for spec in &arms {
            if !(spec.mean_cost > 0.0) {
                return Err(Error::NonPositiveMeanCost {
                    arm: spec.name.clone(),
                    mean_cost: spec.mean_cost,
                });
            }
            if matches!(spec.kind, DistributionKind::Gaussian)
                && cholesky2(spec.var_cost, spec.cov, spec.var_reward).is_none()
            {
                return Err(Error::CovarianceNotPsd {
                    arm: spec.name.clone(),
                });
            }
        }
        Ok(Self { arms })
    }

    /// Number of arms.
    pub fn len(&self) -> usize {
        self.arms.len()
    }

    /// Whether the set is empty (never true for a constructed set; kept for
    /// the conventional pairing with `len`).
    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    /// The arm specs, in problem order.
    pub fn specs(&self) -> &[ArmSpec] {
        &self.arms
    }

    /// Iterate over the arm specs in problem order.
    pub fn iter(&self) -> impl Iterator<Item = &ArmSpec> + '_ {
        self.arms.iter()
    }

    /// Best achievable static reward rate over all arms.
    pub fn optimal_rate(&self) -> f64 {
        self.arms
            .iter()
            .map(ArmSpec::rate)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Index of the arm achieving [`ArmSet::optimal_rate`] (lowest index on
    /// ties).
    pub fn optimal_arm(&self) -> usize {
        let best = self.optimal_rate();
        self.arms
            .iter()
            .position(|a| a.rate() == best)
            .unwrap_or(0)
    }

    /// Minimum expected cost over all arms. Strictly positive by
    /// construction; it appears in the `log(2B/μ*)` terms of the regret
    /// analysis and is exposed for reporting.
    pub fn min_mean_cost(&self) -> f64 {
        self.arms
            .iter()
            .map(|a| a.mean_cost)
            .fold(f64::INFINITY, f64::min)
    }
}

impl std::ops::Index<usize> for ArmSet {
    type Output = ArmSpec;

    fn index(&self, index: usize) -> &ArmSpec {
        &self.arms[index]
    }
}
