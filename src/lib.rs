//! `uam-cosmo` library crate.
//!
//! Expansion rate `E(z)` of the UAM cosmology, built on the auxiliary angle
//! `w(z)` that solves `(1+z) cos²w = exp(-tan w)`.
//!
//! The binary (`uam`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the model functions are reusable from other crates
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod check;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;

pub use domain::{DEFAULT_OMEGA_M, RatePoint, SolverOptions};
pub use error::{ErrorKind, ModelError};
pub use math::beta_dev;
pub use models::{e2_uam, e2_uam_batch, e2_uam_default, solve_w_of_z, solve_w_of_z_batch, solve_w_of_z_par};
