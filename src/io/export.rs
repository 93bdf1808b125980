//! Export evaluated points to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::domain::RatePoint;
use crate::error::AppError;

/// Write one CSV row per point.
pub fn write_rates_csv(path: &Path, points: &[RatePoint]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writeln!(file, "z,w,beta,sec2,e2,e")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for p in points {
        writeln!(
            file,
            "{},{:.15e},{:.15e},{:.15e},{:.15e},{:.15e}",
            p.z,
            p.w,
            p.beta,
            p.sec2,
            p.e2,
            p.e(),
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    info!(path = %path.display(), rows = points.len(), "wrote rate CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DEFAULT_OMEGA_M, SolverOptions};
    use crate::models::rate_points;

    #[test]
    fn csv_has_header_and_one_row_per_point() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.csv");
        let points = rate_points(&[0.0, 1.0], DEFAULT_OMEGA_M, &SolverOptions::default()).unwrap();

        write_rates_csv(&path, &points).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "z,w,beta,sec2,e2,e");
        assert!(lines[1].starts_with("0,0.000000000000000e0,"));
        assert_eq!(lines[2].split(',').count(), 6);
    }
}
