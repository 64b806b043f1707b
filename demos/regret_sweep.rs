//! Regret sweep over the two-arm Gaussian benchmark.
//!
//! Runs all four policies over a budget grid and prints one row per
//! (policy, budget): average reward/regret with standard deviations against
//! the optimal static benchmark. The normalized regret column is the one to
//! watch — it shrinks as budgets grow.
//!
//! Run with: cargo run --release --example regret_sweep

use costwise::{
    run_sweep, ArmSet, ArmSpec, PolicyParams, SweepConfig, SweepRow, UcbB1, UcbB2, UcbB2c, UcbM1,
};

fn main() {
    let arms = ArmSet::new(vec![
        ArmSpec::gaussian("strong", 1.0, 3.0, 0.1, 0.3, 0.05),
        ArmSpec::gaussian("weak", 1.0, 1.5, 0.1, 0.3, 0.05),
    ])
    .expect("valid arm set");

    let cfg = SweepConfig {
        budgets: vec![500.0, 1_000.0, 2_000.0, 5_000.0],
        trials: 200,
        seed: 7,
        max_rounds: 1_000_000,
    };

    println!(
        "K = {} arms, optimal rate = {:.3}, {} trials per point\n",
        arms.len(),
        arms.optimal_rate(),
        cfg.trials
    );
    println!(
        "{:<8} {:>8} {:>12} {:>10} {:>12} {:>10} {:>10}",
        "policy", "budget", "avg_reward", "std", "avg_regret", "std", "regret/B"
    );

    let params = PolicyParams::default();
    let mut all: Vec<SweepRow> = Vec::new();
    all.extend(run_sweep(&arms, |s| UcbB1::new(s, params), &cfg).expect("sweep"));
    all.extend(run_sweep(&arms, |s| UcbB2::new(s, params), &cfg).expect("sweep"));
    all.extend(run_sweep(&arms, |s| UcbB2c::new(s, params), &cfg).expect("sweep"));
    all.extend(run_sweep(&arms, |s| UcbM1::new(s, params), &cfg).expect("sweep"));

    for row in &all {
        println!(
            "{:<8} {:>8.0} {:>12.1} {:>10.1} {:>12.1} {:>10.1} {:>10.4}",
            row.algorithm,
            row.budget,
            row.avg_reward,
            row.std_reward,
            row.avg_regret,
            row.std_regret,
            row.avg_regret / row.budget,
        );
    }
}
