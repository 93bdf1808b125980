//! Reporting utilities: grid summaries and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::RatePoint;

/// Ranges of an evaluated grid.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub n: usize,
    pub z_min: f64,
    pub z_max: f64,
    pub w_min: f64,
    pub w_max: f64,
    pub beta_max: f64,
    pub e2_min: f64,
    pub e2_max: f64,
}

/// Summarize a grid; `None` when it is empty.
pub fn summarize(points: &[RatePoint]) -> Option<TableSummary> {
    let first = points.first()?;
    let mut s = TableSummary {
        n: points.len(),
        z_min: first.z,
        z_max: first.z,
        w_min: first.w,
        w_max: first.w,
        beta_max: first.beta,
        e2_min: first.e2,
        e2_max: first.e2,
    };
    for p in &points[1..] {
        s.z_min = s.z_min.min(p.z);
        s.z_max = s.z_max.max(p.z);
        s.w_min = s.w_min.min(p.w);
        s.w_max = s.w_max.max(p.w);
        s.beta_max = s.beta_max.max(p.beta);
        s.e2_min = s.e2_min.min(p.e2);
        s.e2_max = s.e2_max.max(p.e2);
    }
    Some(s)
}
