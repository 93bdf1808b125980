//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while evaluating the model
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::math::RootOptions;

/// Default matter density parameter, `π³ / 100 ≈ 0.31006`.
pub const DEFAULT_OMEGA_M: f64 = std::f64::consts::PI
    * std::f64::consts::PI
    * std::f64::consts::PI
    / 100.0;

/// Floor applied to `cos(w)` before taking logs or reciprocals.
pub const COS_FLOOR: f64 = 1e-300;

/// Direction of a monotone sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Monotonicity {
    NonDecreasing,
    NonIncreasing,
}

/// Direction of `w(z)` for ascending `z`.
///
/// From `g(w; z) = ln(1+z) + 2 ln cos w + tan w`:
/// `∂g/∂w = (1 - sin 2w) / cos²w ≥ 0` and `∂g/∂z = 1/(1+z) > 0`, so the root
/// moves down as `z` grows. `∂g/∂w` only vanishes at `w = π/4`, where
/// `g > 0` for every `z ≥ 0`, so it is never a root.
pub const W_OF_Z_DIRECTION: Monotonicity = Monotonicity::NonIncreasing;

/// Which quantity to plot or tabulate against `z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Series {
    /// Squared normalized expansion rate `E²(z)`.
    E2,
    /// Auxiliary angle `w(z)` (radians).
    W,
    /// Deviation `β(w(z))`.
    Beta,
}

impl Series {
    pub const ALL: [Series; 3] = [Series::E2, Series::W, Series::Beta];

    pub fn display_name(self) -> &'static str {
        match self {
            Series::E2 => "E2",
            Series::W => "w",
            Series::Beta => "beta",
        }
    }

    pub fn value(self, p: &RatePoint) -> f64 {
        match self {
            Series::E2 => p.e2,
            Series::W => p.w,
            Series::Beta => p.beta,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Series::E2 => Series::W,
            Series::W => Series::Beta,
            Series::Beta => Series::E2,
        }
    }
}

/// Tunables for the `w(z)` root search.
///
/// Defaults follow the continuation scheme: a bracket of half-width `0.3`
/// around the previous root, widened by `1.5×` up to 50 times before falling
/// back to the full domain `(-π/2 + ε, π/2 - ε)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Safety margin from `±π/2` where `ln cos w` diverges.
    pub domain_eps: f64,
    /// Initial bracket half-width around the previous root (radians).
    pub initial_half_width: f64,
    /// Geometric growth factor for the half-width (> 1).
    pub growth: f64,
    /// Number of widenings before falling back to the full domain.
    pub max_widenings: usize,
    /// Absolute root tolerance.
    pub xtol: f64,
    /// Relative root tolerance.
    pub rtol: f64,
    /// Brent iteration budget per root.
    pub max_iter: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            domain_eps: 1e-9,
            initial_half_width: 0.3,
            growth: 1.5,
            max_widenings: 50,
            xtol: 1e-12,
            rtol: 1e-12,
            max_iter: 200,
        }
    }
}

impl SolverOptions {
    pub fn root_options(&self) -> RootOptions {
        RootOptions {
            xtol: self.xtol,
            rtol: self.rtol,
            max_iter: self.max_iter,
        }
    }

    /// Lower/upper limits of the safety-margined domain.
    pub fn w_limits(&self) -> (f64, f64) {
        let half = std::f64::consts::FRAC_PI_2 - self.domain_eps;
        (-half, half)
    }
}

/// One evaluated redshift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub z: f64,
    /// Auxiliary angle (radians).
    pub w: f64,
    pub beta: f64,
    /// `sec²(w)` with the cosine floor applied.
    pub sec2: f64,
    /// `E²(z)`.
    pub e2: f64,
}

impl RatePoint {
    /// `E(z) = H(z)/H₀`.
    pub fn e(&self) -> f64 {
        self.e2.sqrt()
    }
}

/// Portable representation of an evaluated grid (`uam table --export-table`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTable {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub omega_m: f64,
    pub solver: SolverOptions,
    pub points: Vec<RatePoint>,
}

/// Configuration for evaluating a uniform redshift grid.
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub omega_m: f64,
    pub z_min: f64,
    pub z_max: f64,
    pub steps: usize,
    pub parallel: bool,
    pub series: Series,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_csv: Option<PathBuf>,
    pub export_table: Option<PathBuf>,
    pub solver: SolverOptions,
}

/// Configuration for the randomized property checks (`uam check`).
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub samples: usize,
    pub seed: u64,
    pub z_max: f64,
    pub omega_m: f64,
    pub solver: SolverOptions,
}

/// One file copied by the archive backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: u64,
    pub sha256: String,
}

/// `backup_manifest.json` written next to the copied archives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupManifest {
    pub timestamp: DateTime<Utc>,
    pub src: PathBuf,
    pub dest: PathBuf,
    pub count: usize,
    pub files: Vec<ArchiveEntry>,
}

/// A freshly written project archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackSummary {
    pub path: PathBuf,
    /// Regular files stored in the archive.
    pub files: usize,
    /// Size of the archive on disk.
    pub bytes: u64,
    pub sha256: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_omega_m_is_pi_cubed_over_100() {
        assert!((DEFAULT_OMEGA_M - 0.310_062_766_8).abs() < 1e-9);
    }

    #[test]
    fn series_cycle_visits_all() {
        let mut s = Series::E2;
        for expected in Series::ALL.iter().cycle().skip(1).take(3) {
            s = s.next();
            assert_eq!(s, *expected);
        }
    }

    #[test]
    fn w_limits_stay_inside_open_interval() {
        let (lo, hi) = SolverOptions::default().w_limits();
        assert!(lo > -std::f64::consts::FRAC_PI_2);
        assert!(hi < std::f64::consts::FRAC_PI_2);
        assert_eq!(lo, -hi);
    }
}
