//! Moment estimators over running sufficient statistics and raw sample
//! buffers.
//!
//! Everything here is a pure function. None of these return errors: with
//! too little data they degrade to `0.0`, and callers treat an arm with zero
//! pulls as "must explore" long before any of these values matter.

/// Near-zero floor below which an empirical cost variance is treated as
/// "no linear dependence" when forming the LMMSE slope.
pub(crate) const VAR_FLOOR: f64 = 1e-9;

/// Empirical mean `sum / n`, or `0.0` when `n == 0`.
pub fn empirical_mean(sum: f64, n: u64) -> f64 {
    if n == 0 {
        return 0.0;
    }
    sum / n as f64
}

/// Empirical variance from `sum` and `sum_sq`, clamped to be non-negative.
///
/// Uses `E[X²] − (E[X])²`. Returns `0.0` for fewer than two samples; the
/// clamp absorbs the negative values floating-point cancellation can produce.
pub fn empirical_variance(sum_sq: f64, sum: f64, n: u64) -> f64 {
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean = sum / nf;
    (sum_sq / nf - mean * mean).max(0.0)
}

/// Empirical LMMSE slope `Cov(X, R) / Var(X)`.
///
/// Returns `0.0` when fewer than two samples exist or when the empirical
/// cost variance is below [`VAR_FLOOR`] (near-zero cost variance means the
/// linear predictor is ill-defined, and `0.0` keeps downstream confidence
/// widths finite).
pub fn lmmse_slope(sum_x: f64, sum_r: f64, sum_xx: f64, _sum_rr: f64, sum_xr: f64, n: u64) -> f64 {
    if n < 2 {
        return 0.0;
    }
    let var_x = empirical_variance(sum_xx, sum_x, n);
    if var_x < VAR_FLOOR {
        return 0.0;
    }
    let mean_x = empirical_mean(sum_x, n);
    let mean_r = empirical_mean(sum_r, n);
    let cov = empirical_mean(sum_xr, n) - mean_x * mean_r;
    cov / var_x
}

/// Empirical residual variance of the best linear predictor,
/// `Var(R − ω·X) = Var(R) − ω²·Var(X)`, clamped to be non-negative.
///
/// Equals `0.0` when R is an exact linear function of X (and `omega` is the
/// matching slope), and degrades to `0.0` for fewer than two samples.
pub fn lmmse_residual_variance(
    sum_x: f64,
    sum_r: f64,
    sum_xx: f64,
    sum_rr: f64,
    _sum_xr: f64,
    n: u64,
    omega: f64,
) -> f64 {
    if n < 2 {
        return 0.0;
    }
    let var_r = empirical_variance(sum_rr, sum_r, n);
    let var_x = empirical_variance(sum_xx, sum_x, n);
    (var_r - omega * omega * var_x).max(0.0)
}

/// Median of a slice. Averages the two middle elements for even lengths;
/// `0.0` for an empty slice.
pub fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        0.5 * (values[mid - 1] + values[mid])
    }
}

/// Group count for median-of-means at epoch `n`: `⌊3.5·α·ln n⌋ + 1`,
/// capped to the number of available samples (and at least 1).
pub fn median_group_count(alpha: f64, epoch: u64, samples: u64) -> usize {
    let base = (3.5 * alpha * (epoch.max(1) as f64).ln()).floor() as i64 + 1;
    let m = base.max(1) as u64;
    m.min(samples.max(1)) as usize
}

/// Median-of-means over `values` partitioned into `m` contiguous groups.
///
/// Partitioning happens in observation order: each of the `m` groups gets
/// `len / m` consecutive samples (the remainder tail is ignored, as the
/// grouped estimator's guarantees are stated for equal-size groups). When
/// the group size would be zero the plain empirical mean is returned —
/// with so few samples the grouping has nothing to control.
pub fn median_of_means(values: &[f64], m: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = m.max(1);
    let group = values.len() / m;
    if group == 0 {
        return values.iter().sum::<f64>() / values.len() as f64;
    }
    let mut group_means: Vec<f64> = (0..m)
        .map(|j| {
            let chunk = &values[j * group..(j + 1) * group];
            chunk.iter().sum::<f64>() / group as f64
        })
        .collect();
    median(&mut group_means)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empirical_mean_handles_zero_pulls() {
        assert_eq!(empirical_mean(0.0, 0), 0.0);
        assert_eq!(empirical_mean(15.0, 3), 5.0);
    }

    #[test]
    fn empirical_variance_matches_hand_computation() {
        // Samples [1, 2, 3]: sum 6, sum of squares 14, variance 2/3.
        let v = empirical_variance(14.0, 6.0, 3);
        assert!((v - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn empirical_variance_degrades_below_two_samples() {
        assert_eq!(empirical_variance(4.0, 2.0, 1), 0.0);
        assert_eq!(empirical_variance(0.0, 0.0, 0), 0.0);
    }

    #[test]
    fn empirical_variance_clamps_cancellation() {
        // Constant samples can go epsilon-negative through cancellation.
        let x = 1e8 + 0.5;
        let v = empirical_variance(2.0 * x * x, 2.0 * x, 2);
        assert!(v >= 0.0);
    }

    #[test]
    fn lmmse_recovers_exact_linear_dependence() {
        // R = 3·X over X in {1, 2, 3, 4}.
        let xs = [1.0, 2.0, 3.0, 4.0];
        let c = 3.0;
        let (mut sx, mut sr, mut sxx, mut srr, mut sxr) = (0.0, 0.0, 0.0, 0.0, 0.0);
        for &x in &xs {
            let r = c * x;
            sx += x;
            sr += r;
            sxx += x * x;
            srr += r * r;
            sxr += x * r;
        }
        let omega = lmmse_slope(sx, sr, sxx, srr, sxr, xs.len() as u64);
        assert!((omega - c).abs() < 1e-9);
        let resid = lmmse_residual_variance(sx, sr, sxx, srr, sxr, xs.len() as u64, omega);
        assert!(resid.abs() < 1e-9);
    }

    #[test]
    fn lmmse_slope_floors_degenerate_cost_variance() {
        // All costs identical: Var(X) ~ 0 ⇒ slope must be 0, not a blow-up.
        let omega = lmmse_slope(4.0, 10.0, 8.0, 30.0, 20.0, 2);
        assert_eq!(omega, 0.0);
    }

    #[test]
    fn median_of_odd_and_even_slices() {
        let mut odd = [3.0, 1.0, 2.0];
        assert_eq!(median(&mut odd), 2.0);
        let mut even = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(median(&mut even), 2.5);
        let mut empty: [f64; 0] = [];
        assert_eq!(median(&mut empty), 0.0);
    }

    #[test]
    fn median_of_means_ignores_one_outlier() {
        // 9 ones and one huge outlier; with 3 groups the outlier is confined
        // to a single group mean, so the median stays near 1.
        let mut values = vec![1.0; 9];
        values.push(1_000.0);
        let est = median_of_means(&values, 3);
        assert!(est < 2.0, "median-of-means should shrug off the outlier, got {est}");
    }

    #[test]
    fn median_of_means_falls_back_to_plain_mean() {
        // More groups than samples ⇒ plain empirical mean.
        let values = [2.0, 4.0];
        assert_eq!(median_of_means(&values, 5), 3.0);
    }

    #[test]
    fn median_group_count_grows_with_epoch_and_caps_at_samples() {
        let early = median_group_count(2.1, 2, 100);
        let late = median_group_count(2.1, 10_000, 100);
        assert!(late >= early);
        assert!(median_group_count(2.1, 10_000, 4) <= 4);
        assert_eq!(median_group_count(2.1, 1, 10), 1);
    }
}
