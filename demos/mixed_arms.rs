//! Mixed-family instance: two Gaussians, a Pareto/Lognormal arm, and a
//! bounded-uniform arm, pitting the bounded-aware and heavy-tail-aware
//! policies against each other.
//!
//! Prints the sweep rows plus the per-arm pull split of one sample trial,
//! which shows where each policy actually spends its budget.
//!
//! Run with: cargo run --release --example mixed_arms

use costwise::{
    run_sweep, run_trial, ArmSet, ArmSpec, BudgetPolicy, Environment, PolicyParams, SweepConfig,
    UcbB2, UcbM1,
};

fn main() {
    let arms = ArmSet::new(vec![
        ArmSpec::gaussian("gauss-strong", 1.0, 2.5, 0.1, 0.3, 0.05).with_bounds(10.0, 10.0),
        ArmSpec::gaussian("gauss-weak", 1.2, 2.0, 0.2, 0.4, 0.02).with_bounds(10.0, 10.0),
        ArmSpec::heavy_tailed("pareto", 2.5, 0.8, 1.2, 0.6, 0.1, 4.0 / 3.0, 3.97)
            .with_moments(2.0, 2.0, 0.15)
            .with_bounds(100.0, 100.0),
        ArmSpec::bounded_uniform("uniform", (0.5, 1.5), (1.0, 3.0), 0.0),
    ])
    .expect("valid arm set");

    println!(
        "optimal arm: {} (rate {:.3}), min expected cost {:.3}\n",
        arms[arms.optimal_arm()].name,
        arms.optimal_rate(),
        arms.min_mean_cost()
    );

    let cfg = SweepConfig {
        budgets: vec![1_000.0, 5_000.0],
        trials: 100,
        seed: 21,
        max_rounds: 1_000_000,
    };
    let params = PolicyParams::default();

    println!("{:<8} {:>8} {:>12} {:>12}", "policy", "budget", "avg_reward", "avg_regret");
    for rows in [
        run_sweep(&arms, |s| UcbB2::new(s, params), &cfg).expect("sweep"),
        run_sweep(&arms, |s| UcbM1::new(s, params), &cfg).expect("sweep"),
    ] {
        for row in &rows {
            println!(
                "{:<8} {:>8.0} {:>12.1} {:>12.1}",
                row.algorithm, row.budget, row.avg_reward, row.avg_regret
            );
        }
    }

    println!("\npull split of one trial at B = 2000:");
    let mut show = |policy: &mut dyn BudgetPolicy| {
        let mut env = Environment::with_seed(&arms, 99).expect("environment");
        let out = run_trial(policy, &mut env, 2_000.0, 1_000_000).expect("trial");
        let total = out.epochs.max(1) as f64;
        print!("  {:<8}", policy.name());
        for (spec, pulls) in arms.iter().zip(&out.pulls) {
            print!(" {}={:.1}%", spec.name, 100.0 * *pulls as f64 / total);
        }
        println!(" ({} epochs)", out.epochs);
    };
    show(&mut UcbB2::new(&arms, params));
    show(&mut UcbM1::new(&arms, params));
}
