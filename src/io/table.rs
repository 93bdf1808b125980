//! Read/write rate table JSON files.
//!
//! Table JSON is the "portable" representation of an evaluated grid:
//! - Ωm and the solver options used
//! - a generation timestamp
//! - one `RatePoint` per redshift
//!
//! The schema is defined by `domain::RateTable`.

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::domain::RateTable;
use crate::error::AppError;

/// Write a rate table JSON file.
pub fn write_table_json(path: &Path, table: &RateTable) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create table JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, table)
        .map_err(|e| AppError::new(2, format!("Failed to write table JSON: {e}")))?;

    info!(path = %path.display(), points = table.points.len(), "wrote rate table");
    Ok(())
}

/// Read a rate table JSON file.
pub fn read_table_json(path: &Path) -> Result<RateTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open table JSON '{}': {e}", path.display())))?;
    let table: RateTable =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid table JSON: {e}")))?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DEFAULT_OMEGA_M, SolverOptions};
    use crate::models::{rate_points, rate_table};

    #[test]
    fn table_survives_disk_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");

        let opts = SolverOptions::default();
        let points = rate_points(&[0.0, 0.5, 2.0], DEFAULT_OMEGA_M, &opts).unwrap();
        let table = rate_table(points, DEFAULT_OMEGA_M, &opts);
        write_table_json(&path, &table).unwrap();

        let back = read_table_json(&path).unwrap();
        assert_eq!(back.tool, "uam");
        assert_eq!(back.solver, opts);
        assert_eq!(back.points.len(), 3);
        assert!((back.points[2].e2 - table.points[2].e2).abs() < 1e-12);
        assert_eq!(back.generated_at, table.generated_at);
    }

    #[test]
    fn invalid_json_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(read_table_json(&path).unwrap_err().exit_code(), 2);
    }
}
