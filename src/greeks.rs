//! Black-Scholes Greek primitives.
//!
//! Pure math, no state. Degenerate inputs (non-positive spot, strike,
//! time-to-expiry or volatility) yield 0.0 for every output so one bad
//! strike never aborts a whole-chain computation. Volatility clamping is
//! the caller's job, not done here.

use std::f64::consts::PI;

const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// Standard normal probability density.
fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Standard normal CDF via the Abramowitz-Stegun 7.1.26 erf approximation
/// (|error| < 1.5e-7).
fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / SQRT_2))
}

fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    sign * y
}

fn is_degenerate(s: f64, k: f64, t: f64, sigma: f64) -> bool {
    s <= 0.0 || k <= 0.0 || t <= 0.0 || sigma <= 0.0
}

fn d1(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt())
}

/// Black-Scholes gamma; identical for calls and puts.
pub fn gamma(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    if is_degenerate(s, k, t, sigma) {
        return 0.0;
    }
    norm_pdf(d1(s, k, t, r, sigma)) / (s * sigma * t.sqrt())
}

/// Call delta, in [0, 1] for valid inputs.
pub fn call_delta(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    if is_degenerate(s, k, t, sigma) {
        return 0.0;
    }
    norm_cdf(d1(s, k, t, r, sigma))
}

/// Put delta, in [-1, 0] for valid inputs. Put delta = call delta - 1.
pub fn put_delta(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    if is_degenerate(s, k, t, sigma) {
        return 0.0;
    }
    norm_cdf(d1(s, k, t, r, sigma)) - 1.0
}
