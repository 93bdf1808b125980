//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - model constants (`DEFAULT_OMEGA_M`, `COS_FLOOR`, `W_OF_Z_DIRECTION`)
//! - solver tunables (`SolverOptions`)
//! - evaluation outputs (`RatePoint`, `RateTable`)
//! - archive backup records (`BackupManifest`)

pub mod types;

pub use types::*;
