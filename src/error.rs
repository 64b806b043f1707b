//! Error types for `costwise`.
//!
//! Construction-time configuration problems are fatal and surface here;
//! numerical-stability issues during a run never do — those degrade through
//! the floors documented on the estimators and policies.

use thiserror::Error;

/// Result type alias for `costwise` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or driving a bandit problem.
#[derive(Debug, Error)]
pub enum Error {
    /// An arm set must contain at least one arm.
    #[error("arm set is empty")]
    EmptyArms,

    /// Every arm needs a strictly positive expected cost; the reward rate
    /// (reward per unit cost) is undefined otherwise.
    #[error("arm `{arm}` has non-positive expected cost {mean_cost}")]
    NonPositiveMeanCost {
        /// Name of the offending arm.
        arm: String,
        /// The configured expected cost.
        mean_cost: f64,
    },

    /// A Gaussian arm's cost/reward covariance matrix failed the Cholesky
    /// factorization attempt, so no joint sampler can be built from it.
    #[error("arm `{arm}` has a covariance matrix that is not positive semi-definite")]
    CovarianceNotPsd {
        /// Name of the offending arm.
        arm: String,
    },

    /// A distribution family was configured with parameters its sampler
    /// cannot be built from (inverted uniform range, non-positive Pareto
    /// scale/shape, negative Lognormal sigma).
    #[error("arm `{arm}` has invalid distribution parameters: {reason}")]
    InvalidDistribution {
        /// Name of the offending arm.
        arm: String,
        /// What was wrong.
        reason: &'static str,
    },

    /// An arm index outside `[0, arms)` was passed at runtime.
    #[error("arm index {index} out of bounds for {arms} arms")]
    ArmIndex {
        /// The index that was passed.
        index: usize,
        /// Number of arms in the problem.
        arms: usize,
    },

    /// A policy was constructed against a different arm count than the
    /// environment it is being driven with.
    #[error("policy expects {policy_arms} arms but the environment has {env_arms}")]
    ArmCountMismatch {
        /// Arm count the policy was built with.
        policy_arms: usize,
        /// Arm count of the environment.
        env_arms: usize,
    },
}
