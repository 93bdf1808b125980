//! UAM model implementations.
//!
//! Models are implemented as small, pure functions so that batch, parallel and
//! interactive front-ends can share them.
//!
//! - `solver`: the auxiliary angle `w(z)`
//! - `expansion`: `E²(z)` built on top of it
//! - `grid`: redshift grids for tables and plots

pub mod expansion;
pub mod grid;
pub mod solver;

pub use expansion::*;
pub use grid::*;
pub use solver::*;
