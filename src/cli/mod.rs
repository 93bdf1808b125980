//! Command-line parsing for the `uam` expansion-rate tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Series;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "uam", version, about = "UAM expansion rate E(z) and auxiliary angle w(z)")]
pub struct Cli {
    /// Log solver and IO details to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Solve the auxiliary angle w(z) for a list of redshifts.
    Solve(SolveArgs),
    /// Evaluate E2(z) and its ingredients for a list of redshifts.
    Rate(RateArgs),
    /// Evaluate a uniform redshift grid, print it, and optionally plot/export.
    Table(TableArgs),
    /// Plot a previously exported rate table JSON.
    Plot(PlotArgs),
    /// Run randomized property checks on the model.
    Check(CheckArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same grid pipeline as `uam table`, but renders results
    /// in a terminal UI using Ratatui.
    Tui(TuiArgs),
    /// Copy `*.zip` archives into a backup directory with a manifest.
    Backup(BackupArgs),
    /// Zip a whole directory tree into a timestamped archive and print its SHA-256.
    Pack(PackArgs),
}

/// Options for `uam solve`.
#[derive(Debug, Parser, Clone)]
pub struct SolveArgs {
    /// Comma-separated redshifts.
    #[arg(long = "z", value_delimiter = ',', num_args = 1.., required = true, allow_negative_numbers = true)]
    pub z: Vec<f64>,

    /// Solve each redshift independently on the rayon pool.
    #[arg(long)]
    pub parallel: bool,
}

/// Options for `uam rate`.
#[derive(Debug, Parser, Clone)]
pub struct RateArgs {
    /// Comma-separated redshifts.
    #[arg(long = "z", value_delimiter = ',', num_args = 1.., required = true, allow_negative_numbers = true)]
    pub z: Vec<f64>,

    /// Matter density (default: UAM_OMEGA_M, else pi^3/100).
    #[arg(long, allow_negative_numbers = true)]
    pub omega_m: Option<f64>,

    /// Solve each redshift independently on the rayon pool.
    #[arg(long)]
    pub parallel: bool,
}

/// Options for `uam table`.
#[derive(Debug, Parser, Clone)]
pub struct TableArgs {
    /// Lower end of the grid.
    #[arg(long, default_value_t = 0.0)]
    pub z_min: f64,

    /// Upper end of the grid.
    #[arg(long, default_value_t = 3.0)]
    pub z_max: f64,

    /// Number of grid points (inclusive of both ends).
    #[arg(long, default_value_t = 61)]
    pub steps: usize,

    /// Matter density (default: UAM_OMEGA_M, else pi^3/100).
    #[arg(long, allow_negative_numbers = true)]
    pub omega_m: Option<f64>,

    /// Solve each redshift independently on the rayon pool.
    #[arg(long)]
    pub parallel: bool,

    /// Series to plot.
    #[arg(long, value_enum, default_value_t = Series::E2)]
    pub series: Series,

    /// Render an ASCII plot in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the evaluated grid to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the evaluated grid (with settings) to JSON.
    #[arg(long = "export-table")]
    pub export_table: Option<PathBuf>,
}

/// Options for plotting a saved table.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Table JSON file produced by `uam table --export-table`.
    #[arg(long, value_name = "JSON")]
    pub table: PathBuf,

    /// Series to plot.
    #[arg(long, value_enum, default_value_t = Series::E2)]
    pub series: Series,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for `uam check`.
#[derive(Debug, Parser, Clone)]
pub struct CheckArgs {
    /// Number of random redshifts (and angles) to draw.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub samples: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Upper end of the log-uniform redshift sample.
    #[arg(long, default_value_t = 10.0)]
    pub z_max: f64,

    /// Matter density (default: UAM_OMEGA_M, else pi^3/100).
    #[arg(long, allow_negative_numbers = true)]
    pub omega_m: Option<f64>,
}

/// Options for the interactive viewer.
#[derive(Debug, Parser, Clone)]
pub struct TuiArgs {
    /// Initial matter density (default: UAM_OMEGA_M, else pi^3/100).
    #[arg(long, allow_negative_numbers = true)]
    pub omega_m: Option<f64>,

    /// Initial upper redshift.
    #[arg(long, default_value_t = 3.0)]
    pub z_max: f64,

    /// Initial number of grid points.
    #[arg(long, default_value_t = 121)]
    pub steps: usize,

    /// Initial series.
    #[arg(long, value_enum, default_value_t = Series::E2)]
    pub series: Series,

    /// Where `e` writes the current table.
    #[arg(long = "export-table", default_value = "uam_table.json")]
    pub export_table: PathBuf,
}

/// Options for `uam backup`.
#[derive(Debug, Parser, Clone)]
pub struct BackupArgs {
    /// Directory holding the `*.zip` archives (default: UAM_ARCHIVE_DIR, else `.`).
    #[arg(long)]
    pub src: Option<PathBuf>,

    /// Destination directory (created if missing).
    #[arg(long)]
    pub dest: PathBuf,
}

/// Options for `uam pack`.
#[derive(Debug, Parser, Clone)]
pub struct PackArgs {
    /// Directory tree to pack.
    #[arg(long)]
    pub src: PathBuf,

    /// Directory receiving the archive (created if missing).
    #[arg(long)]
    pub dest: PathBuf,
}
