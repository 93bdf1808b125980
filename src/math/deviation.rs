//! Geometric deviation function.
//!
//! `β(w) = |1 - 2 sin(w/2) / w|`
//!
//! Numerical notes:
//! - `2 sin(w/2) / w → 1` as `w → 0`, so the closed form subtracts two nearly
//!   equal numbers and loses most of its significant digits for small `w`.
//!   Below `SMALL_W` we switch to the even Taylor series of `1 - sin(x)/x`
//!   evaluated at `x = w/2`.
//! - The series is truncated after the `w⁸` term; at `|w| = 1e-3` the first
//!   omitted term is below `1e-30`, far under f64 resolution of `β ≈ 4e-8`.
//! - `β` is even and increasing in `|w|` on `(0, 2π)`; the model only uses
//!   `(-π/2, π/2)`.

/// Threshold below which we evaluate the small-angle series.
pub const SMALL_W: f64 = 1e-3;

/// Compute `β(w)` in a numerically stable way.
pub fn beta_dev(w: f64) -> f64 {
    let a = w.abs();

    if a < SMALL_W {
        // 1 - sin(x)/x with x = w/2:
        // w²/24 - w⁴/1920 + w⁶/322560 - w⁸/92897280
        let w2 = a * a;
        return w2 * (1.0 / 24.0 - w2 * (1.0 / 1920.0 - w2 * (1.0 / 322_560.0 - w2 / 92_897_280.0)));
    }

    (1.0 - 2.0 * (0.5 * a).sin() / a).abs()
}

/// Element-wise `β(w)`; the output has the same length and order as the input.
pub fn beta_dev_slice(ws: &[f64]) -> Vec<f64> {
    ws.iter().map(|&w| beta_dev(w)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn zero_is_exact() {
        assert_eq!(beta_dev(0.0), 0.0);
        assert_eq!(beta_dev(-0.0), 0.0);
    }

    #[test]
    fn even_function() {
        for &w in &[1e-8, 1e-5, 5e-4, 1e-3, 0.2, 0.9, 1.5] {
            assert_eq!(beta_dev(w), beta_dev(-w), "β not even at w={w}");
        }
    }

    #[test]
    fn small_angle_matches_leading_term() {
        let w = 1e-5;
        let expected = w * w / 24.0;
        let rel = (beta_dev(w) - expected).abs() / expected;
        assert!(rel < 1e-9, "relative error {rel}");
    }

    #[test]
    fn series_and_closed_form_agree_at_threshold() {
        let below = beta_dev(SMALL_W * (1.0 - 1e-12));
        let above = beta_dev(SMALL_W);
        let rel = (below - above).abs() / above;
        // The closed form carries ~1e-16 / 4e-8 relative rounding noise here.
        assert!(rel < 1e-6, "discontinuity at threshold: {below} vs {above}");
    }

    #[test]
    fn increasing_in_magnitude() {
        let n = 2000;
        let mut prev = beta_dev(0.0);
        for i in 1..n {
            let w = (FRAC_PI_2 - 1e-9) * i as f64 / n as f64;
            let b = beta_dev(w);
            assert!(b >= prev, "β decreased at w={w}: {b} < {prev}");
            assert!(b >= 0.0);
            prev = b;
        }
    }

    #[test]
    fn slice_preserves_length_and_order() {
        let ws = [0.3, 0.0, -0.3, 1.2];
        let out = beta_dev_slice(&ws);
        assert_eq!(out.len(), ws.len());
        assert_eq!(out[1], 0.0);
        assert_eq!(out[0], out[2]);
        assert!(out[3] > out[0]);
    }
}
