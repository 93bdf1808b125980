//! Randomized property checks for the model (`uam check`).
//!
//! Draws a seeded sample of redshifts (log-uniform on `[1e-4, z_max]`) and
//! angles, adds a fixed grid of reference redshifts, and verifies the
//! invariants every evaluation relies on. The run is deterministic for a
//! given seed.

use std::f64::consts::FRAC_PI_2;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Uniform};

use crate::domain::CheckConfig;
use crate::error::AppError;
use crate::math::beta_dev;
use crate::models::{
    defining_residual, e2_uam_with, rate_points, solve_w_of_z_batch, solve_w_of_z_par, z_from_w,
};

/// Reference redshifts always included in the sample.
pub const FIXED_REDSHIFTS: [f64; 8] = [0.0, 0.1, 0.5, 1.0, 2.0, 3.0, 5.0, 10.0];

const Z_LOG_FLOOR: f64 = 1e-4;

/// Outcome of a single named check.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

/// All check outcomes of one run.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub seed: u64,
    pub n_redshifts: usize,
    pub outcomes: Vec<CheckOutcome>,
}

impl CheckReport {
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    pub fn n_failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed).count()
    }
}

/// Run every check.
pub fn run_checks(config: &CheckConfig) -> Result<CheckReport, AppError> {
    if config.samples == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }
    if !(config.z_max.is_finite() && config.z_max > Z_LOG_FLOOR) {
        return Err(AppError::new(
            2,
            format!("Invalid z_max={} (must be finite and > {Z_LOG_FLOOR}).", config.z_max),
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let log_z = Uniform::new(Z_LOG_FLOOR.ln(), config.z_max.ln());
    let angle = Uniform::new(-FRAC_PI_2 + 1e-6, FRAC_PI_2 - 1e-6);

    let mut zs: Vec<f64> = FIXED_REDSHIFTS.to_vec();
    zs.extend((0..config.samples).map(|_| log_z.sample(&mut rng).exp()));
    let angles: Vec<f64> = (0..config.samples).map(|_| angle.sample(&mut rng)).collect();

    let ws = solve_w_of_z_batch(&zs, &config.solver)?;
    let points = rate_points(&zs, config.omega_m, &config.solver)?;

    let mut outcomes = Vec::new();

    // Deviation function.
    let max_asym = angles
        .iter()
        .map(|&w| (beta_dev(w) - beta_dev(-w)).abs())
        .fold(0.0_f64, f64::max);
    outcomes.push(CheckOutcome {
        name: "beta even, beta(0) = 0",
        passed: max_asym == 0.0 && beta_dev(0.0) == 0.0,
        detail: format!("max |b(w) - b(-w)| = {max_asym:.3e} over {} angles", angles.len()),
    });

    let max_series_err = [1e-6, 1e-5, 1e-4]
        .iter()
        .map(|&w: &f64| {
            let lead = w * w / 24.0;
            (beta_dev(w) - lead).abs() / lead
        })
        .fold(0.0_f64, f64::max);
    outcomes.push(CheckOutcome {
        name: "beta small-angle limit w^2/24",
        passed: max_series_err < 1e-9,
        detail: format!("max relative error = {max_series_err:.3e}"),
    });

    // Solver.
    let out_of_range = ws.iter().filter(|&&w| !(w > -FRAC_PI_2 && w <= 0.0)).count();
    outcomes.push(CheckOutcome {
        name: "w in (-pi/2, 0]",
        passed: out_of_range == 0,
        detail: format!("{out_of_range} of {} roots outside", ws.len()),
    });

    let max_resid = zs
        .iter()
        .zip(&ws)
        .map(|(&z, &w)| defining_residual(z, w).abs() / (-w.tan()).exp().max(1.0))
        .fold(0.0_f64, f64::max);
    outcomes.push(CheckOutcome {
        name: "defining equation residual",
        passed: max_resid < 1e-8,
        detail: format!("max scaled |(1+z)cos^2 w - exp(-tan w)| = {max_resid:.3e}"),
    });

    let mut sorted: Vec<(f64, f64)> = zs.iter().copied().zip(ws.iter().copied()).collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
    let violations = sorted.windows(2).filter(|p| p[1].1 > p[0].1).count();
    outcomes.push(CheckOutcome {
        name: "w(z) non-increasing",
        passed: violations == 0,
        detail: format!("{violations} violations over {} sorted pairs", sorted.len().saturating_sub(1)),
    });

    let max_round_trip = zs
        .iter()
        .zip(&ws)
        .map(|(&z, &w)| (z_from_w(w) - z).abs() / (1.0 + z))
        .fold(0.0_f64, f64::max);
    outcomes.push(CheckOutcome {
        name: "round trip z -> w -> z",
        passed: max_round_trip < 1e-8,
        detail: format!("max |z' - z| / (1+z) = {max_round_trip:.3e}"),
    });

    let par = solve_w_of_z_par(&zs, &config.solver);
    let par_failures = par.iter().filter(|r| r.is_err()).count();
    let max_par_diff = par
        .iter()
        .zip(&ws)
        .filter_map(|(p, &w)| p.as_ref().ok().map(|&pw| (pw - w).abs()))
        .fold(0.0_f64, f64::max);
    outcomes.push(CheckOutcome {
        name: "parallel solver agrees",
        passed: par_failures == 0 && max_par_diff < 1e-9,
        detail: format!("{par_failures} failures, max |dw| = {max_par_diff:.3e}"),
    });

    // Expansion rate.
    let e2_zero = e2_uam_with(0.0, config.omega_m, &config.solver)?;
    outcomes.push(CheckOutcome {
        name: "E2(0) = 1",
        passed: (e2_zero - 1.0).abs() < 1e-12,
        detail: format!("E2(0) = {e2_zero:.17}"),
    });

    let bad_e2 = points.iter().filter(|p| !(p.e2.is_finite() && p.e2 >= 0.0)).count();
    outcomes.push(CheckOutcome {
        name: "E2 finite and non-negative",
        passed: bad_e2 == 0,
        detail: format!("{bad_e2} of {} values invalid", points.len()),
    });

    Ok(CheckReport {
        seed: config.seed,
        n_redshifts: zs.len(),
        outcomes,
    })
}
