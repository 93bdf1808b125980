//! Root search for the auxiliary angle `w(z)`.
//!
//! `w` solves `(1+z) cos²w = exp(-tan w)` on `(-π/2, π/2)`. We work with the
//! log form
//!
//! ```text
//! g(w; z) = ln(1+z) + 2 ln cos w + tan w = 0
//! ```
//!
//! which avoids overflow of `exp(-tan w)` near `-π/2`. `g` is increasing in
//! `w` with `g → -∞` at `-π/2` and `g → +∞` at `π/2`, so every finite `z ≥ 0`
//! has exactly one root, and `z = 0` has the root `w = 0`.
//!
//! Batches are solved by continuation in ascending `z`: the bracket for each
//! element is centred on the previous root and widened geometrically until
//! `g` changes sign, with the full safety-margined domain as a last resort.
//! Brackets never extend above `w = 0`, where `g(0; z) = ln(1+z) > 0`.
//! The sorted result is then projected onto `W_OF_Z_DIRECTION` so that
//! independent root searches cannot leave ulp-level wiggles in `w(z)`.

use argmin::core::CostFunction;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::{COS_FLOOR, Monotonicity, SolverOptions, W_OF_Z_DIRECTION};
use crate::error::ModelError;
use crate::math::{RootError, brent_root};

/// `cos(w)` floored at `COS_FLOOR`.
pub fn clamped_cos(w: f64) -> f64 {
    w.cos().max(COS_FLOOR)
}

/// `g(w; z) = ln(1+z) + 2 ln cos w + tan w`.
pub fn g(w: f64, z: f64) -> f64 {
    z.ln_1p() + 2.0 * clamped_cos(w).ln() + w.tan()
}

/// Residual of the defining equation in its original form:
/// `(1+z) cos²w - exp(-tan w)`.
pub fn defining_residual(z: f64, w: f64) -> f64 {
    let c = w.cos();
    (1.0 + z) * c * c - (-w.tan()).exp()
}

/// Invert the defining equation: `z = cos⁻²(w) exp(-tan w) - 1`.
pub fn z_from_w(w: f64) -> f64 {
    (-w.tan() - 2.0 * clamped_cos(w).ln()).exp_m1()
}

/// Reject redshifts outside the model domain.
pub fn validate_z(z: f64) -> Result<(), ModelError> {
    if !z.is_finite() || z < 0.0 {
        return Err(ModelError::Domain { z });
    }
    Ok(())
}

/// Solve `w(z)` with default options.
pub fn solve_w_of_z(z: f64) -> Result<f64, ModelError> {
    solve_w_of_z_with(z, &SolverOptions::default())
}

/// Solve `w(z)` for a single redshift, seeding the bracket at `w = 0`.
pub fn solve_w_of_z_with(z: f64, opts: &SolverOptions) -> Result<f64, ModelError> {
    solve_from(z, Some(0.0), opts)
}

/// Solve a batch by continuation in ascending `z`.
///
/// The output matches the input in length and order. The first failing
/// element aborts the batch and is reported as `ModelError::Element`.
pub fn solve_w_of_z_batch(zs: &[f64], opts: &SolverOptions) -> Result<Vec<f64>, ModelError> {
    for (i, &z) in zs.iter().enumerate() {
        validate_z(z).map_err(|e| e.at(i))?;
    }

    let order = ascending_order(zs);
    let mut w = vec![0.0; zs.len()];
    let mut prev = 0.0;
    for &idx in &order {
        let root = solve_from(zs[idx], Some(prev), opts).map_err(|e| e.at(idx))?;
        w[idx] = root;
        prev = root;
    }

    project_monotone(&mut w, &order, W_OF_Z_DIRECTION);
    Ok(w)
}

/// Solve every element independently in parallel.
///
/// No root is shared between workers, so each element brackets on the full
/// domain. Failures stay attached to their element; successful values are
/// projected monotone in ascending `z` afterwards.
pub fn solve_w_of_z_par(zs: &[f64], opts: &SolverOptions) -> Vec<Result<f64, ModelError>> {
    let mut out: Vec<Result<f64, ModelError>> = zs
        .par_iter()
        .enumerate()
        .map(|(i, &z)| solve_from(z, None, opts).map_err(|e| e.at(i)))
        .collect();

    let mut acc: Option<f64> = None;
    for idx in ascending_order(zs) {
        if let Ok(w) = out[idx].as_mut() {
            let next = running_extremum(acc, *w, W_OF_Z_DIRECTION);
            *w = next;
            acc = Some(next);
        }
    }
    out
}

/// Replace `values` (visited in `order`) by their running extremum.
pub fn project_monotone(values: &mut [f64], order: &[usize], direction: Monotonicity) {
    let mut acc: Option<f64> = None;
    for &idx in order {
        let next = running_extremum(acc, values[idx], direction);
        values[idx] = next;
        acc = Some(next);
    }
}

fn running_extremum(acc: Option<f64>, v: f64, direction: Monotonicity) -> f64 {
    match (acc, direction) {
        (None, _) => v,
        (Some(a), Monotonicity::NonIncreasing) => a.min(v),
        (Some(a), Monotonicity::NonDecreasing) => a.max(v),
    }
}

/// Indices of `zs` sorted by ascending value (stable).
fn ascending_order(zs: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..zs.len()).collect();
    order.sort_by(|&a, &b| zs[a].total_cmp(&zs[b]));
    order
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bracket {
    lo: f64,
    hi: f64,
    /// Widenings performed before this bracket was accepted.
    widenings: usize,
}

/// `g(·; z)` as an argmin cost function. The "cost" is the signed residual.
struct LogResidual {
    z: f64,
}

impl CostFunction for LogResidual {
    type Param = f64;
    type Output = f64;

    fn cost(&self, w: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let value = g(*w, self.z);
        if !value.is_finite() {
            return Err(RootError::NonFinite { x: *w }.into());
        }
        Ok(value)
    }
}

/// Lower and upper search limits. `g(0; z) = ln(1+z) > 0` for `z > 0`, so
/// the root never lies above zero.
fn search_limits(opts: &SolverOptions) -> (f64, f64) {
    let (w_min, w_max) = opts.w_limits();
    (w_min, w_max.min(0.0))
}

/// Solve one element. `seed = None` skips continuation and brackets on the
/// full domain.
fn solve_from(z: f64, seed: Option<f64>, opts: &SolverOptions) -> Result<f64, ModelError> {
    validate_z(z)?;
    if z == 0.0 {
        return Ok(0.0);
    }

    let bracket = match seed {
        Some(seed) => find_bracket(z, seed, opts)?,
        None => full_domain_bracket(z, opts, 0)?,
    };

    let root = brent_root(
        LogResidual { z },
        bracket.lo,
        bracket.hi,
        &opts.root_options(),
    )
    .map_err(|e| match e {
        RootError::NotConverged { x, iterations } => ModelError::NotConverged {
            z,
            w: x,
            max_iter: iterations as usize,
        },
        RootError::NonFinite { .. } | RootError::Backend { .. } => ModelError::Degenerate {
            z,
            stage: "g(w; z) during root search",
        },
        RootError::NotBracketed { .. } => ModelError::NoBracket {
            z,
            attempts: bracket.widenings,
        },
    })?;

    let (w_lo, w_hi) = search_limits(opts);
    Ok(root.x.clamp(w_lo, w_hi))
}

fn find_bracket(z: f64, seed: f64, opts: &SolverOptions) -> Result<Bracket, ModelError> {
    let (w_lo, w_hi) = search_limits(opts);
    let mut half = opts.initial_half_width;
    let mut widenings = 0;

    loop {
        let lo = (seed - half).max(w_lo);
        let hi = (seed + half).min(w_hi);
        if let Some(bracket) = sign_change(z, lo, hi, widenings)? {
            if widenings > 0 {
                debug!(z, widenings, lo, hi, "widened bracket");
            }
            return Ok(bracket);
        }
        if (lo <= w_lo && hi >= w_hi) || widenings == opts.max_widenings {
            break;
        }
        half *= opts.growth;
        widenings += 1;
    }

    warn!(z, seed, widenings, "bracket widening found no sign change; trying the full domain");
    full_domain_bracket(z, opts, widenings)
}

fn full_domain_bracket(z: f64, opts: &SolverOptions, widenings: usize) -> Result<Bracket, ModelError> {
    let (w_lo, w_hi) = search_limits(opts);
    sign_change(z, w_lo, w_hi, widenings)?.ok_or(ModelError::NoBracket {
        z,
        attempts: widenings,
    })
}

fn sign_change(z: f64, lo: f64, hi: f64, widenings: usize) -> Result<Option<Bracket>, ModelError> {
    let glo = g(lo, z);
    let ghi = g(hi, z);
    if !(glo.is_finite() && ghi.is_finite()) {
        return Err(ModelError::Degenerate {
            z,
            stage: "g(w; z) at a bracket end",
        });
    }
    if glo == 0.0 || ghi == 0.0 || (glo < 0.0) != (ghi < 0.0) {
        Ok(Some(Bracket { lo, hi, widenings }))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::f64::consts::FRAC_PI_2;

    const GRID: [f64; 7] = [0.0, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0];

    #[test]
    fn zero_redshift_is_exact() {
        assert_eq!(solve_w_of_z(0.0).unwrap(), 0.0);
        assert_eq!(g(0.0, 0.0), 0.0);
    }

    #[test]
    fn negative_and_non_finite_redshifts_are_domain_errors() {
        for &z in &[-2.0, -0.5, -1e-12, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = solve_w_of_z(z).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Domain, "z={z}");
        }
        assert!(matches!(solve_w_of_z(-2.0), Err(ModelError::Domain { .. })));
    }

    #[test]
    fn roots_satisfy_defining_equation() {
        for &z in &GRID {
            let w = solve_w_of_z(z).unwrap();
            assert!(w > -FRAC_PI_2 && w < FRAC_PI_2, "w={w} outside domain for z={z}");
            assert!(w <= 0.0, "w={w} should be non-positive for z={z}");
            let r = defining_residual(z, w);
            assert!(r.abs() < 1e-8, "residual {r} for z={z}");
        }
    }

    #[test]
    fn ascending_redshifts_give_non_increasing_angles() {
        let zs = [0.0, 0.5, 1.0, 2.0, 5.0, 10.0];
        let w = solve_w_of_z_batch(&zs, &SolverOptions::default()).unwrap();
        assert_eq!(w.len(), zs.len());
        assert_eq!(w[0], 0.0);
        for pair in w.windows(2) {
            assert!(pair[1] <= pair[0], "not monotone: {pair:?}");
        }
    }

    #[test]
    fn unsorted_batch_restores_input_order() {
        let zs = [5.0, 0.0, 1.0, 0.5, 10.0, 1.0];
        let w = solve_w_of_z_batch(&zs, &SolverOptions::default()).unwrap();
        for (&z, &wi) in zs.iter().zip(&w) {
            let single = solve_w_of_z(z).unwrap();
            assert!((wi - single).abs() < 1e-9, "z={z}: batch {wi} vs single {single}");
        }
        assert!((w[2] - w[5]).abs() < 1e-11);
    }

    #[test]
    fn round_trip_recovers_redshift() {
        for &z in &[0.0, 0.1, 1.0, 3.0, 10.0] {
            let w = solve_w_of_z(z).unwrap();
            let back = z_from_w(w);
            assert!((back - z).abs() <= 1e-9 * (1.0 + z), "z={z} -> w={w} -> {back}");
        }
    }

    #[test]
    fn large_redshifts_solve_log_form() {
        let zs = [100.0, 1e4, 1e8];
        let w = solve_w_of_z_batch(&zs, &SolverOptions::default()).unwrap();
        for (&z, &wi) in zs.iter().zip(&w) {
            assert!(wi > -FRAC_PI_2 && wi < 0.0);
            assert!(g(wi, z).abs() < 1e-8, "g={} for z={z}", g(wi, z));
        }
        assert!(w[0] > w[1] && w[1] > w[2]);
    }

    #[test]
    fn redshift_one_has_expected_branch() {
        let w = solve_w_of_z(1.0).unwrap();
        assert!(w < -0.4 && w > -0.5, "w(1)={w}");
        let lhs = w.cos().powi(2);
        let rhs = (-w.tan()).exp() / 2.0;
        assert!((lhs - rhs).abs() < 1e-9);
    }

    #[test]
    fn extreme_redshift_stays_inside_domain() {
        let (w_min, _) = SolverOptions::default().w_limits();
        let w = solve_w_of_z(1e12).unwrap();
        assert!(w > w_min && w < -1.4);
        assert!(g(w, 1e12).abs() < 1e-6);
    }

    #[test]
    fn batch_reports_failing_index() {
        let err = solve_w_of_z_batch(&[0.0, 1.0, -2.0, 3.0], &SolverOptions::default()).unwrap_err();
        match err {
            ModelError::Element { index, source } => {
                assert_eq!(index, 2);
                assert!(matches!(*source, ModelError::Domain { .. }));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn tiny_iteration_budget_is_reported() {
        let opts = SolverOptions {
            max_iter: 1,
            ..SolverOptions::default()
        };
        let err = solve_w_of_z_with(2.0, &opts).unwrap_err();
        assert!(matches!(err, ModelError::NotConverged { max_iter: 1, .. }));
        assert_eq!(err.kind(), ErrorKind::Convergence);
    }

    #[test]
    fn tiny_redshifts_give_non_positive_angles() {
        let at_zero = solve_w_of_z(0.0).unwrap();
        for &z in &[1e-15, 1e-20, 1e-300] {
            let w = solve_w_of_z(z).unwrap();
            assert!(w <= 0.0, "w={w} for z={z}");
            assert!(w <= at_zero, "w={w} above w(0) for z={z}");
            let par = solve_w_of_z_par(&[z], &SolverOptions::default());
            assert!(*par[0].as_ref().unwrap() <= 0.0);
        }

        let w = solve_w_of_z_batch(&[1e-15, 1e-20, 1e-14], &SolverOptions::default()).unwrap();
        assert!(w.iter().all(|&wi| wi <= 0.0), "{w:?}");
    }

    #[test]
    fn missing_bracket_reports_widenings_actually_tried() {
        // A wide safety margin leaves [-0.0708, 0] where g(·; 10) stays positive.
        let narrow = SolverOptions {
            domain_eps: 1.5,
            ..SolverOptions::default()
        };
        let err = solve_w_of_z_with(10.0, &narrow).unwrap_err();
        assert!(matches!(err, ModelError::NoBracket { attempts: 0, .. }), "{err:?}");

        // [-0.3708, 0]: the first widening already spans it.
        let wider = SolverOptions {
            domain_eps: 1.2,
            ..SolverOptions::default()
        };
        let err = solve_w_of_z_with(10.0, &wider).unwrap_err();
        assert!(matches!(err, ModelError::NoBracket { attempts: 1, .. }), "{err:?}");
        assert_eq!(err.kind(), ErrorKind::Convergence);

        let err = solve_w_of_z_par(&[10.0], &narrow).remove(0).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Element { index: 0, ref source } if matches!(**source, ModelError::NoBracket { attempts: 0, .. })
        ));
    }

    #[test]
    fn residual_adapter_rejects_non_finite_values() {
        let residual = LogResidual { z: 1.0 };
        assert!((residual.cost(&-0.3).unwrap() - g(-0.3, 1.0)).abs() < 1e-15);
        assert!(residual.cost(&f64::NAN).is_err());
    }

    #[test]
    fn parallel_matches_continuation() {
        let zs: Vec<f64> = (0..64).map(|i| i as f64 * 0.25).collect();
        let opts = SolverOptions::default();
        let seq = solve_w_of_z_batch(&zs, &opts).unwrap();
        let par = solve_w_of_z_par(&zs, &opts);
        for (a, b) in seq.iter().zip(&par) {
            let b = b.as_ref().unwrap();
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn parallel_isolates_failures() {
        let out = solve_w_of_z_par(&[1.0, f64::NAN, 2.0], &SolverOptions::default());
        assert!(out[0].is_ok());
        assert!(matches!(out[1], Err(ModelError::Element { index: 1, .. })));
        assert!(out[2].is_ok());
        assert!(out[2].as_ref().unwrap() < out[0].as_ref().unwrap());
    }

    #[test]
    fn projection_removes_wiggles() {
        let mut values = vec![0.0, -0.1, -0.1 + 1e-13, -0.3];
        let order = [0, 1, 2, 3];
        project_monotone(&mut values, &order, Monotonicity::NonIncreasing);
        assert_eq!(values, vec![0.0, -0.1, -0.1, -0.3]);

        let mut values = vec![3.0, 1.0, 2.0];
        project_monotone(&mut values, &[1, 2, 0], Monotonicity::NonDecreasing);
        assert_eq!(values, vec![3.0, 1.0, 2.0]);
    }
}
