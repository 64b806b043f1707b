use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use costwise::{
    ArmSet, ArmSpec, BudgetPolicy, PolicyParams, Sample, UcbB1, UcbB2, UcbB2c, UcbM1,
};

fn arms(k: usize) -> ArmSet {
    let specs = (0..k)
        .map(|i| {
            ArmSpec::gaussian(
                format!("arm{i}"),
                1.0 + 0.05 * i as f64,
                2.0 + 0.3 * i as f64,
                0.1,
                0.3,
                0.05,
            )
            .with_bounds(10.0, 10.0)
        })
        .collect();
    ArmSet::new(specs).unwrap()
}

/// Warm a policy with `t` deterministic pulls per arm, then benchmark one
/// select_arm call at the resulting state.
fn warm<P: BudgetPolicy>(policy: &mut P, k: usize, t: usize) -> u64 {
    let mut epoch = 0u64;
    for i in 0..t {
        for arm in 0..k {
            epoch += 1;
            let wobble = 0.9 + 0.01 * (i % 20) as f64;
            policy
                .record(arm, Sample { cost: wobble, reward: 2.0 * wobble })
                .unwrap();
        }
    }
    epoch + 1
}

fn bench_select(c: &mut Criterion) {
    const K: usize = 6;
    let set = arms(K);

    let mut group = c.benchmark_group("select_arm");
    for &t in &[64usize, 1024usize] {
        group.bench_with_input(BenchmarkId::new("ucb_b1", t), &t, |b, &t| {
            let mut p = UcbB1::new(&set, PolicyParams::default());
            let epoch = warm(&mut p, K, t);
            b.iter(|| black_box(p.select_arm(black_box(0.0), epoch)));
        });
        group.bench_with_input(BenchmarkId::new("ucb_b2", t), &t, |b, &t| {
            let mut p = UcbB2::new(&set, PolicyParams::default());
            let epoch = warm(&mut p, K, t);
            b.iter(|| black_box(p.select_arm(black_box(0.0), epoch)));
        });
        // The history-based variants rescan their buffers per call, so the
        // pull count is the interesting axis here.
        group.bench_with_input(BenchmarkId::new("ucb_b2c", t), &t, |b, &t| {
            let mut p = UcbB2c::new(&set, PolicyParams::default());
            let epoch = warm(&mut p, K, t);
            b.iter(|| black_box(p.select_arm(black_box(0.0), epoch)));
        });
        group.bench_with_input(BenchmarkId::new("ucb_m1", t), &t, |b, &t| {
            let mut p = UcbM1::new(&set, PolicyParams::default());
            let epoch = warm(&mut p, K, t);
            b.iter(|| black_box(p.select_arm(black_box(0.0), epoch)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_select);
criterion_main!(benches);
