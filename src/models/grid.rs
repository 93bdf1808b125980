//! Redshift grid generation.

use crate::error::AppError;

/// Generate `steps` evenly spaced redshifts between `z_min` and `z_max` (inclusive).
pub fn z_grid(z_min: f64, z_max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(z_min.is_finite() && z_max.is_finite() && z_min >= 0.0 && z_max > z_min) {
        return Err(AppError::new(
            2,
            format!("Invalid redshift range: min={z_min}, max={z_max} (must be finite, >=0, and max>min)."),
        ));
    }
    if steps < 2 {
        return Err(AppError::new(2, "Redshift steps must be >= 2."));
    }

    let step = (z_max - z_min) / (steps as f64 - 1.0);
    let mut out = Vec::with_capacity(steps);
    for i in 0..steps - 1 {
        out.push(z_min + step * i as f64);
    }
    // Land exactly on the upper end.
    out.push(z_max);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_includes_endpoints() {
        let v = z_grid(0.0, 10.0, 11).unwrap();
        assert_eq!(v.len(), 11);
        assert_eq!(v[0], 0.0);
        assert_eq!(v[10], 10.0);
        assert!((v[3] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_ranges() {
        assert!(z_grid(-1.0, 1.0, 5).is_err());
        assert!(z_grid(2.0, 1.0, 5).is_err());
        assert!(z_grid(0.0, f64::INFINITY, 5).is_err());
        assert_eq!(z_grid(0.0, 1.0, 1).unwrap_err().exit_code(), 2);
    }
}
