//! UAM expansion rate.
//!
//! ```text
//! E²(z) = Ωm (1+z)³ + (1 - Ωm) sec²(w) [1 / (1 + β(w) z/(1+z))]²
//! ```
//!
//! with `w = w(z)` from `models::solver` and `β` from `math::deviation`.
//! At `z = 0` we have `w = 0`, `β = 0`, `sec² = 1`, hence `E² = 1`.

use chrono::Utc;
use rayon::prelude::*;

use crate::domain::{DEFAULT_OMEGA_M, RatePoint, RateTable, SolverOptions};
use crate::error::ModelError;
use crate::math::beta_dev;
use crate::models::solver::{clamped_cos, solve_w_of_z_batch, solve_w_of_z_par, solve_w_of_z_with, validate_z};

/// Reject matter densities outside `[0, 1]`.
pub fn validate_omega_m(omega_m: f64) -> Result<(), ModelError> {
    if !(omega_m.is_finite() && (0.0..=1.0).contains(&omega_m)) {
        return Err(ModelError::InvalidOmegaM { omega_m });
    }
    Ok(())
}

/// Evaluate every derived quantity for a solved pair `(z, w)`.
pub fn compose(z: f64, w: f64, omega_m: f64) -> Result<RatePoint, ModelError> {
    let c = clamped_cos(w);
    let sec2 = 1.0 / (c * c);
    let beta = beta_dev(w);
    let fac = 1.0 / (1.0 + beta * (z / (1.0 + z)));
    let e2 = omega_m * (1.0 + z).powi(3) + (1.0 - omega_m) * sec2 * fac * fac;

    if !(sec2.is_finite() && e2.is_finite()) {
        return Err(ModelError::Degenerate { z, stage: "E2(z)" });
    }
    Ok(RatePoint { z, w, beta, sec2, e2 })
}

/// `E²(z)` with default solver options.
pub fn e2_uam(z: f64, omega_m: f64) -> Result<f64, ModelError> {
    e2_uam_with(z, omega_m, &SolverOptions::default())
}

/// `E²(z)` for the default `Ωm = π³/100`.
pub fn e2_uam_default(z: f64) -> Result<f64, ModelError> {
    e2_uam(z, DEFAULT_OMEGA_M)
}

pub fn e2_uam_with(z: f64, omega_m: f64, opts: &SolverOptions) -> Result<f64, ModelError> {
    rate_point(z, omega_m, opts).map(|p| p.e2)
}

/// `E²` for a batch of redshifts; output matches the input order.
pub fn e2_uam_batch(zs: &[f64], omega_m: f64, opts: &SolverOptions) -> Result<Vec<f64>, ModelError> {
    Ok(rate_points(zs, omega_m, opts)?.into_iter().map(|p| p.e2).collect())
}

pub fn rate_point(z: f64, omega_m: f64, opts: &SolverOptions) -> Result<RatePoint, ModelError> {
    validate_omega_m(omega_m)?;
    validate_z(z)?;
    let w = solve_w_of_z_with(z, opts)?;
    compose(z, w, omega_m)
}

/// Evaluate a batch using the continuation solver.
pub fn rate_points(zs: &[f64], omega_m: f64, opts: &SolverOptions) -> Result<Vec<RatePoint>, ModelError> {
    validate_omega_m(omega_m)?;
    let ws = solve_w_of_z_batch(zs, opts)?;
    zs.iter()
        .zip(&ws)
        .enumerate()
        .map(|(i, (&z, &w))| compose(z, w, omega_m).map_err(|e| e.at(i)))
        .collect()
}

/// Evaluate a batch in parallel, one `Result` per element.
pub fn rate_points_par(
    zs: &[f64],
    omega_m: f64,
    opts: &SolverOptions,
) -> Result<Vec<Result<RatePoint, ModelError>>, ModelError> {
    validate_omega_m(omega_m)?;
    let ws = solve_w_of_z_par(zs, opts);
    Ok(zs
        .par_iter()
        .zip(ws)
        .enumerate()
        .map(|(i, (&z, w))| w.and_then(|w| compose(z, w, omega_m).map_err(|e| e.at(i))))
        .collect())
}

/// Wrap evaluated points into a portable table.
pub fn rate_table(points: Vec<RatePoint>, omega_m: f64, opts: &SolverOptions) -> RateTable {
    RateTable {
        tool: "uam".to_string(),
        generated_at: Utc::now(),
        omega_m,
        solver: *opts,
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn unity_at_zero_redshift_for_any_omega() {
        for &om in &[0.0, 0.1, DEFAULT_OMEGA_M, 0.5, 0.9, 1.0] {
            let e2 = e2_uam(0.0, om).unwrap();
            assert!((e2 - 1.0).abs() < 1e-15, "E2(0)={e2} for Ωm={om}");
        }
    }

    #[test]
    fn non_negative_on_dense_grid() {
        let zs: Vec<f64> = (0..=1000).map(|i| i as f64 * 0.01).collect();
        let e2 = e2_uam_batch(&zs, DEFAULT_OMEGA_M, &SolverOptions::default()).unwrap();
        assert_eq!(e2.len(), zs.len());
        for (&z, &v) in zs.iter().zip(&e2) {
            assert!(v.is_finite() && v >= 0.0, "E2({z})={v}");
        }
    }

    #[test]
    fn increases_with_redshift() {
        let zs: Vec<f64> = (0..=100).map(|i| i as f64 * 0.1).collect();
        let e2 = e2_uam_batch(&zs, DEFAULT_OMEGA_M, &SolverOptions::default()).unwrap();
        for pair in e2.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn redshift_one_scenario() {
        let p = rate_point(1.0, DEFAULT_OMEGA_M, &SolverOptions::default()).unwrap();
        let matter_only = DEFAULT_OMEGA_M * 8.0;
        assert!(p.w < 0.0);
        assert!(p.e2.is_finite() && p.e2 > matter_only, "E2(1)={}", p.e2);
        // Ωm·8 plus a correction term close to (1 - Ωm)·sec²(w).
        assert!(p.e2 > 3.2 && p.e2 < 3.45, "E2(1)={}", p.e2);
        assert!(p.beta > 0.0 && p.beta < 0.05);
        assert_eq!(e2_uam_default(1.0).unwrap(), p.e2);
    }

    #[test]
    fn rejects_invalid_omega_m() {
        for &om in &[-0.1, 1.5, f64::NAN] {
            let err = e2_uam(1.0, om).unwrap_err();
            assert!(matches!(err, ModelError::InvalidOmegaM { .. }));
            assert_eq!(err.kind(), ErrorKind::Domain);
        }
    }

    #[test]
    fn rejects_negative_redshift() {
        let err = e2_uam(-2.0, DEFAULT_OMEGA_M).unwrap_err();
        assert!(matches!(err, ModelError::Domain { .. }));
    }

    #[test]
    fn overflowing_matter_term_is_flagged() {
        let err = e2_uam(1e120, DEFAULT_OMEGA_M).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Degeneracy);
    }

    #[test]
    fn parallel_points_match_sequential() {
        let zs = [3.0, 0.0, 1.0, 7.5];
        let opts = SolverOptions::default();
        let seq = rate_points(&zs, DEFAULT_OMEGA_M, &opts).unwrap();
        let par = rate_points_par(&zs, DEFAULT_OMEGA_M, &opts).unwrap();
        for (a, b) in seq.iter().zip(&par) {
            let b = b.as_ref().unwrap();
            assert_eq!(a.z, b.z);
            assert!((a.e2 - b.e2).abs() < 1e-9);
        }
    }
}
