//! Two-Sample Kolmogorov-Smirnov Test

/// Largest distance between the empirical CDFs of `a` and `b`.
///
/// NaNs are ignored. Returns 0.0 when either sample is empty.
pub fn ks_statistic(a: &[f64], b: &[f64]) -> f64 {
    let mut a: Vec<f64> = a.iter().copied().filter(|v| !v.is_nan()).collect();
    let mut b: Vec<f64> = b.iter().copied().filter(|v| !v.is_nan()).collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    a.sort_by(f64::total_cmp);
    b.sort_by(f64::total_cmp);

    let (n, m) = (a.len() as f64, b.len() as f64);
    let (mut i, mut j) = (0usize, 0usize);
    let mut d = 0.0_f64;

    while i < a.len() && j < b.len() {
        let x = a[i].min(b[j]);
        // Step past every tie at x in both samples
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        d = d.max((i as f64 / n - j as f64 / m).abs());
    }
    d
}

/// Asymptotic p-value for statistic `d` with sample sizes `n` and `m`
pub fn ks_p_value(d: f64, n: usize, m: usize) -> f64 {
    if n == 0 || m == 0 {
        return 1.0;
    }
    let en = ((n * m) as f64 / (n + m) as f64).sqrt();
    let lambda = (en + 0.12 + 0.11 / en) * d;
    kolmogorov_q(lambda)
}

/// Survival function of the Kolmogorov distribution
fn kolmogorov_q(lambda: f64) -> f64 {
    let a2 = -2.0 * lambda * lambda;
    let mut sign = 2.0;
    let mut sum = 0.0;
    let mut prev_term = 0.0_f64;

    for j in 1..=100 {
        let jf = j as f64;
        let term = sign * (a2 * jf * jf).exp();
        sum += term;
        if term.abs() <= 0.001 * prev_term || term.abs() <= 1e-8 * sum {
            return sum.clamp(0.0, 1.0);
        }
        sign = -sign;
        prev_term = term.abs();
    }
    // Series fails to converge only for tiny lambda, where p is 1
    1.0
}
