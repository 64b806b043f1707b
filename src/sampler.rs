//! Stochastic environment: per-arm (cost, reward) samplers.
//!
//! An [`Environment`] owns one sampler per arm plus a seeded [`StdRng`].
//! It is **seedable and deterministic**: two environments built from the
//! same arm set and seed produce bit-identical sample sequences, and
//! [`Environment::reset`] rewinds to the initial seed. Reproducibility is a
//! functional requirement here (regression tests diff whole trial
//! trajectories), not an optimization.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal, Pareto, StandardNormal};

use crate::arm::{ArmSet, DistributionKind};
use crate::error::{Error, Result};
use crate::Sample;

/// Cholesky factor of the 2×2 covariance matrix `[[var_x, cov], [cov, var_r]]`.
///
/// Returns `(l11, l21, l22)` such that `L·Lᵀ` reproduces the matrix, or
/// `None` when the matrix is not positive semi-definite. A tiny negative
/// Schur complement from floating-point noise is tolerated and clamped.
pub(crate) fn cholesky2(var_x: f64, cov: f64, var_r: f64) -> Option<(f64, f64, f64)> {
    if !(var_x >= 0.0 && var_r >= 0.0) || !cov.is_finite() {
        return None;
    }
    if var_x == 0.0 {
        // Degenerate cost coordinate: any nonzero covariance is impossible.
        if cov != 0.0 {
            return None;
        }
        return Some((0.0, 0.0, var_r.sqrt()));
    }
    let l11 = var_x.sqrt();
    let l21 = cov / l11;
    let rem = var_r - l21 * l21;
    if rem < -1e-9 {
        return None;
    }
    Some((l11, l21, rem.max(0.0).sqrt()))
}

/// One arm's sampler, specialized from its [`DistributionKind`] at
/// environment construction.
#[derive(Debug, Clone)]
enum ArmSampler {
    Gaussian {
        mean_cost: f64,
        mean_reward: f64,
        l11: f64,
        l21: f64,
        l22: f64,
    },
    BoundedUniform {
        min_cost: f64,
        max_cost: f64,
        min_reward: f64,
        max_reward: f64,
        correlation: f64,
    },
    HeavyTailed {
        pareto: Pareto<f64>,
        lognormal: LogNormal<f64>,
        correlation: f64,
    },
}

impl ArmSampler {
    fn build(spec: &crate::arm::ArmSpec) -> Result<Self> {
        match spec.kind {
            DistributionKind::Gaussian => {
                let (l11, l21, l22) = cholesky2(spec.var_cost, spec.cov, spec.var_reward)
                    .ok_or_else(|| Error::CovarianceNotPsd {
                        arm: spec.name.clone(),
                    })?;
                Ok(Self::Gaussian {
                    mean_cost: spec.mean_cost,
                    mean_reward: spec.mean_reward,
                    l11,
                    l21,
                    l22,
                })
            }
            DistributionKind::BoundedUniform {
                min_cost,
                max_cost,
                min_reward,
                max_reward,
                correlation,
            } => {
                if !(min_cost <= max_cost && min_reward <= max_reward) {
                    return Err(Error::InvalidDistribution {
                        arm: spec.name.clone(),
                        reason: "uniform range has min > max",
                    });
                }
                Ok(Self::BoundedUniform {
                    min_cost,
                    max_cost,
                    min_reward,
                    max_reward,
                    correlation,
                })
            }
            DistributionKind::HeavyTailed {
                pareto_shape,
                pareto_scale,
                lognormal_mu,
                lognormal_sigma,
                correlation,
            } => {
                let pareto =
                    Pareto::new(pareto_scale, pareto_shape).map_err(|_| Error::InvalidDistribution {
                        arm: spec.name.clone(),
                        reason: "Pareto scale and shape must be positive",
                    })?;
                let lognormal = LogNormal::new(lognormal_mu, lognormal_sigma).map_err(|_| {
                    Error::InvalidDistribution {
                        arm: spec.name.clone(),
                        reason: "Lognormal sigma must be non-negative",
                    }
                })?;
                Ok(Self::HeavyTailed {
                    pareto,
                    lognormal,
                    correlation,
                })
            }
        }
    }

    fn sample(&self, rng: &mut StdRng) -> Sample {
        match *self {
            ArmSampler::Gaussian {
                mean_cost,
                mean_reward,
                l11,
                l21,
                l22,
            } => {
                let z1: f64 = rng.sample(StandardNormal);
                let z2: f64 = rng.sample(StandardNormal);
                Sample {
                    cost: mean_cost + l11 * z1,
                    reward: mean_reward + l21 * z1 + l22 * z2,
                }
            }
            ArmSampler::BoundedUniform {
                min_cost,
                max_cost,
                min_reward,
                max_reward,
                correlation,
            } => {
                let mut cost = if max_cost > min_cost {
                    rng.random_range(min_cost..max_cost)
                } else {
                    min_cost
                };
                let mut reward = if max_reward > min_reward {
                    rng.random_range(min_reward..max_reward)
                } else {
                    min_reward
                };
                if correlation != 0.0 {
                    // One shared draw nudges both coordinates linearly. This
                    // is not a copula: the target correlation is approximate
                    // and the marginals are perturbed slightly.
                    let u: f64 = rng.random();
                    cost += correlation * (u - 0.5) * (max_cost - min_cost);
                    reward += correlation * (u - 0.5) * (max_reward - min_reward);
                }
                Sample { cost, reward }
            }
            ArmSampler::HeavyTailed {
                pareto,
                lognormal,
                correlation,
            } => {
                let mut cost = pareto.sample(rng);
                let mut reward = lognormal.sample(rng);
                if correlation != 0.0 {
                    // Shared latent normal, same caveat as the uniform nudge.
                    let z: f64 = rng.sample(StandardNormal);
                    cost += correlation * z;
                    reward += correlation * z;
                }
                Sample { cost, reward }
            }
        }
    }
}

/// Seeded sampling environment over a validated arm set.
#[derive(Debug, Clone)]
pub struct Environment {
    samplers: Vec<ArmSampler>,
    rng: StdRng,
    seed: u64,
}

impl Environment {
    /// Build an environment over `arms` with the given seed.
    ///
    /// Family-parameter problems (a Pareto scale of zero, an inverted
    /// uniform range) surface here as fatal configuration errors; the PSD
    /// gate has already run in [`ArmSet::new`] but is re-applied when the
    /// factor is materialized.
    pub fn with_seed(arms: &ArmSet, seed: u64) -> Result<Self> {
        let samplers = arms
            .iter()
            .map(ArmSampler::build)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            samplers,
            rng: StdRng::seed_from_u64(seed),
            seed,
        })
    }

    /// Number of arms.
    pub fn arms(&self) -> usize {
        self.samplers.len()
    }

    /// Draw one (cost, reward) realization from arm `index`.
    ///
    /// An out-of-range index is rejected, never clamped.
    pub fn pull(&mut self, index: usize) -> Result<Sample> {
        let sampler = self.samplers.get(index).ok_or(Error::ArmIndex {
            index,
            arms: self.samplers.len(),
        })?;
        Ok(sampler.sample(&mut self.rng))
    }

    /// Rewind the RNG to the construction seed: the next pull sequence is
    /// identical to a freshly built environment's.
    pub fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    /// The construction seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}
