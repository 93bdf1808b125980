//! Shared "grid pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! grid -> w(z) roots -> E²(z) -> summary
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use tracing::debug;

use crate::domain::{RateTable, TableConfig};
use crate::error::AppError;
use crate::models::{rate_points, rate_points_par, rate_table, z_grid};
use crate::report::{TableSummary, summarize};

/// All computed outputs of a single grid evaluation.
#[derive(Debug, Clone)]
pub struct TableRun {
    pub table: RateTable,
    pub summary: TableSummary,
}

/// Evaluate the configured grid.
pub fn run_table(config: &TableConfig) -> Result<TableRun, AppError> {
    let zs = z_grid(config.z_min, config.z_max, config.steps)?;

    let points = if config.parallel {
        rate_points_par(&zs, config.omega_m, &config.solver)?
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?
    } else {
        rate_points(&zs, config.omega_m, &config.solver)?
    };
    debug!(
        n = points.len(),
        parallel = config.parallel,
        omega_m = config.omega_m,
        "evaluated grid"
    );

    let summary = summarize(&points).ok_or_else(|| AppError::new(4, "Empty redshift grid."))?;
    let table = rate_table(points, config.omega_m, &config.solver);

    Ok(TableRun { table, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DEFAULT_OMEGA_M, Series, SolverOptions};

    fn config(parallel: bool) -> TableConfig {
        TableConfig {
            omega_m: DEFAULT_OMEGA_M,
            z_min: 0.0,
            z_max: 2.0,
            steps: 21,
            parallel,
            series: Series::E2,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_csv: None,
            export_table: None,
            solver: SolverOptions::default(),
        }
    }

    #[test]
    fn grid_run_starts_at_unity() {
        let run = run_table(&config(false)).unwrap();
        assert_eq!(run.table.points.len(), 21);
        assert_eq!(run.summary.n, 21);
        assert!((run.table.points[0].e2 - 1.0).abs() < 1e-15);
        assert_eq!(run.summary.w_max, 0.0);
        assert_eq!(run.table.omega_m, DEFAULT_OMEGA_M);
    }

    #[test]
    fn parallel_and_continuation_agree() {
        let seq = run_table(&config(false)).unwrap();
        let par = run_table(&config(true)).unwrap();
        for (a, b) in seq.table.points.iter().zip(&par.table.points) {
            assert!((a.w - b.w).abs() < 1e-9);
            assert!((a.e2 - b.e2).abs() < 1e-8);
        }
    }

    #[test]
    fn bad_grid_is_input_error() {
        let mut cfg = config(false);
        cfg.steps = 1;
        assert_eq!(run_table(&cfg).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn bad_omega_is_input_error() {
        let mut cfg = config(false);
        cfg.omega_m = 1.5;
        assert_eq!(run_table(&cfg).unwrap_err().exit_code(), 2);
    }
}
