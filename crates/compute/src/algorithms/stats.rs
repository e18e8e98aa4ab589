//! Distribution approximations and population statistics.
//!
//! - [`normal_cdf`]: Abramowitz–Stegun 26.2.17 rational approximation
//! - [`poisson_probability`]: exact pmf for small counts, Gaussian otherwise
//! - [`factorial`]: memoized table, exact up to 170!
//! - [`mean`] / [`variance`]: population moments

use std::sync::OnceLock;

/// Above this mean the Poisson distribution is approximated by a normal one.
pub const GAUSSIAN_LAMBDA_CUTOVER: f64 = 30.0;

/// Largest n whose factorial is a finite f64.
pub const MAX_FACTORIAL: u64 = 170;

const INV_SQRT_2PI: f64 = 0.39894228;

/// Standard normal CDF, Φ(x).
///
/// Max absolute error of the underlying approximation is ~7.5e-8. Negative
/// arguments use Φ(−x) = 1 − Φ(x).
pub fn normal_cdf(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.2316419 * z);
    let d = t
        * (0.31938153
            + t * (-0.356563782 + t * (1.781477937 + t * (-1.821255978 + t * 1.330274429))));
    let upper = (1.0 - INV_SQRT_2PI * (-z * z / 2.0).exp() * d).min(1.0);
    if x >= 0.0 {
        upper
    } else {
        1.0 - upper
    }
}

fn factorial_table() -> &'static [f64] {
    static TABLE: OnceLock<Vec<f64>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = Vec::with_capacity(MAX_FACTORIAL as usize + 1);
        let mut acc = 1.0f64;
        table.push(acc);
        for n in 1..=MAX_FACTORIAL {
            acc *= n as f64;
            table.push(acc);
        }
        table
    })
}

/// n! as f64, or `None` once it would overflow.
pub fn factorial(n: u64) -> Option<f64> {
    factorial_table().get(n as usize).copied()
}

/// Exact Poisson pmf e^(−λ)·λ^k / k!, or `None` when k! is out of range.
pub fn exact_poisson_pmf(k: u64, lambda: f64) -> Option<f64> {
    let k_fact = factorial(k)?;
    let pmf = (-lambda).exp() * lambda.powi(k as i32) / k_fact;
    pmf.is_finite().then_some(pmf)
}

/// Likelihood of observing `observed` events when `expected` are expected.
///
/// The exact pmf is used only while both the mean is at most
/// [`GAUSSIAN_LAMBDA_CUTOVER`] and the count is at most `exact_max_events`;
/// beyond either bound the tail mass Φ(−|z|) with z = (k − λ)/√λ stands in,
/// which keeps large counts away from factorial overflow.
pub fn poisson_probability(observed: u64, expected: f64, exact_max_events: u64) -> f64 {
    if !(expected > 0.0) {
        return if observed == 0 { 1.0 } else { 0.0 };
    }

    let exact_allowed = expected <= GAUSSIAN_LAMBDA_CUTOVER
        && observed <= exact_max_events.min(MAX_FACTORIAL);
    if exact_allowed {
        if let Some(pmf) = exact_poisson_pmf(observed, expected) {
            return pmf;
        }
    }

    let z = (observed as f64 - expected) / expected.sqrt();
    normal_cdf(-z.abs())
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance; 0 for an empty slice.
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}
