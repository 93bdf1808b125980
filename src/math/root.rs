//! Bracketing root search on top of argmin's `BrentRoot`.
//!
//! The caller supplies a scalar `CostFunction` whose cost is the function
//! value (not a loss), plus an interval `[lo, hi]` over which it changes sign.
//! argmin reports a missing sign change as `InvalidParameter`; cost functions
//! signal a non-finite value by returning [`RootError::NonFinite`], which is
//! recovered here from the boxed argmin error.
//!
//! Convergence uses a single absolute tolerance `xtol + rtol * max(|lo|, |hi|)`.

use argmin::core::{
    ArgminError, CostFunction, Error, Executor, State, TerminationReason, TerminationStatus,
};
use argmin::solver::brent::BrentRoot;
use thiserror::Error;

/// Tolerances and iteration budget for a single root search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootOptions {
    pub xtol: f64,
    pub rtol: f64,
    pub max_iter: usize,
}

impl Default for RootOptions {
    fn default() -> Self {
        Self {
            xtol: 1e-12,
            rtol: 1e-12,
            max_iter: 200,
        }
    }
}

impl RootOptions {
    /// Absolute tolerance handed to `BrentRoot` for the interval `[lo, hi]`.
    pub fn tolerance(&self, lo: f64, hi: f64) -> f64 {
        self.xtol + self.rtol * lo.abs().max(hi.abs())
    }
}

/// A converged root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    pub x: f64,
    pub fx: f64,
    pub iterations: u64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RootError {
    #[error("f does not change sign on [{lo}, {hi}]")]
    NotBracketed { lo: f64, hi: f64 },
    #[error("non-finite function value f({x})")]
    NonFinite { x: f64 },
    #[error("no convergence after {iterations} iterations (last x={x})")]
    NotConverged { x: f64, iterations: u64 },
    #[error("root search failed: {text}")]
    Backend { text: String },
}

/// Find a root of `problem` in `[lo, hi]` with argmin's Brent solver.
pub fn brent_root<P>(problem: P, lo: f64, hi: f64, opts: &RootOptions) -> Result<Root, RootError>
where
    P: CostFunction<Param = f64, Output = f64>,
{
    let solver = BrentRoot::new(lo, hi, opts.tolerance(lo, hi));
    let max_iters = opts.max_iter as u64;

    let result = Executor::new(problem, solver)
        .configure(|state| state.max_iters(max_iters))
        .run()
        .map_err(|err| classify(err, lo, hi))?;

    let state = result.state();
    // BrentRoot keeps its estimate in `param`; `best_param` tracks the lowest
    // cost, which for a signed function value is not the root.
    let x = *state.get_param().ok_or_else(|| RootError::Backend {
        text: "solver returned no parameter".to_string(),
    })?;
    let iterations = state.get_iter();

    match state.get_termination_status() {
        TerminationStatus::Terminated(TerminationReason::SolverConverged) => Ok(Root {
            x,
            fx: state.get_cost(),
            iterations,
        }),
        _ => Err(RootError::NotConverged { x, iterations }),
    }
}

/// Recover a typed error from argmin's boxed one.
fn classify(err: Error, lo: f64, hi: f64) -> RootError {
    let err = match err.downcast::<RootError>() {
        Ok(root_err) => return root_err,
        Err(err) => err,
    };
    match err.downcast::<ArgminError>() {
        Ok(ArgminError::InvalidParameter { .. }) => RootError::NotBracketed { lo, hi },
        Ok(other) => RootError::Backend {
            text: other.to_string(),
        },
        Err(err) => RootError::Backend {
            text: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scalar test functions exposed to argmin.
    enum Scalar {
        CubeMinus(f64),
        Ln,
        TanMinus(f64),
    }

    impl CostFunction for Scalar {
        type Param = f64;
        type Output = f64;

        fn cost(&self, x: &f64) -> Result<f64, Error> {
            let fx = match self {
                Scalar::CubeMinus(c) => x.powi(3) - c,
                Scalar::Ln => x.ln(),
                Scalar::TanMinus(c) => x.tan() - c,
            };
            if !fx.is_finite() {
                return Err(RootError::NonFinite { x: *x }.into());
            }
            Ok(fx)
        }
    }

    #[test]
    fn finds_cube_root() {
        let root = brent_root(Scalar::CubeMinus(2.0), 0.0, 2.0, &RootOptions::default()).unwrap();
        assert!((root.x - 2.0_f64.cbrt()).abs() < 1e-10);
        assert!(root.fx.abs() < 1e-9);
        assert!(root.iterations > 0);
    }

    #[test]
    fn rejects_interval_without_sign_change() {
        let err = brent_root(Scalar::CubeMinus(-1.0), 0.0, 1.0, &RootOptions::default())
            .unwrap_err();
        assert_eq!(err, RootError::NotBracketed { lo: 0.0, hi: 1.0 });
    }

    #[test]
    fn reports_exhausted_budget() {
        let opts = RootOptions {
            xtol: 1e-15,
            rtol: 0.0,
            max_iter: 2,
        };
        let err = brent_root(Scalar::CubeMinus(0.3), 0.0, 10.0, &opts).unwrap_err();
        assert!(matches!(err, RootError::NotConverged { iterations: 2, .. }));
    }

    #[test]
    fn non_finite_value_survives_the_argmin_error() {
        let err = brent_root(Scalar::Ln, -1.0, 2.0, &RootOptions::default()).unwrap_err();
        assert!(matches!(err, RootError::NonFinite { x } if x == -1.0));
    }

    #[test]
    fn handles_steep_monotone_function() {
        // tan-like blow-up near the right end.
        let root = brent_root(
            Scalar::TanMinus(10.0),
            0.0,
            1.570_796_3,
            &RootOptions::default(),
        )
        .unwrap();
        assert!((root.x - 10.0_f64.atan()).abs() < 1e-10);
    }
}
