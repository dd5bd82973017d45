//! Command-line parsing for the signal quality predictor.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::DEFAULT_SAMPLE_COUNT;
use crate::domain::{DEFAULT_RIDGE_LAMBDA, SingularMode, Solver};
use crate::report::{DEFAULT_MEASUREMENT_ROWS, DEFAULT_REPORT_ROWS};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sq", version, about = "Network signal quality predictor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Train on a dataset, print statistics, and score the first filtered rows.
    Analyze(AnalyzeArgs),
    /// Train on a dataset and score one ad-hoc measurement.
    Predict(PredictArgs),
    /// Print a synthetic dataset as CSV (same layout `--csv` reads).
    Sample(SampleArgs),
}

/// Where training data comes from.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Observation CSV. Without it a synthetic sample is generated.
    #[arg(short = 'f', long, env = "SQ_CSV", value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// Number of synthetic observations when no CSV is given.
    #[arg(short = 'n', long, default_value_t = DEFAULT_SAMPLE_COUNT)]
    pub sample_count: usize,

    /// Random seed for sample generation.
    #[arg(long, env = "SQ_SEED", default_value_t = 42)]
    pub seed: u64,
}

/// Solver and failure-handling options.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Least-squares solver.
    #[arg(long, value_enum, default_value_t = Solver::Normal)]
    pub solver: Solver,

    /// What to do when XᵗX is singular.
    #[arg(long, value_enum, default_value_t = SingularMode::Identity)]
    pub singular: SingularMode,

    /// Ridge strength used with `--singular ridge`.
    #[arg(long, default_value_t = DEFAULT_RIDGE_LAMBDA)]
    pub ridge_lambda: f64,

    /// Fail on insufficient data or numeric trouble instead of degrading.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Only summarize/score rows from this locality.
    #[arg(long)]
    pub locality: Option<String>,

    /// Only summarize/score rows with this network label (e.g. 5G, LTE).
    #[arg(long)]
    pub network: Option<String>,

    /// Minimum signal strength (dBm, inclusive).
    #[arg(long, allow_hyphen_values = true)]
    pub min_strength: Option<f64>,

    /// Maximum latency (ms, inclusive).
    #[arg(long)]
    pub max_latency: Option<f64>,

    /// Number of filtered rows to score.
    #[arg(long, default_value_t = DEFAULT_REPORT_ROWS)]
    pub top: usize,

    /// Number of filtered measurements to list.
    #[arg(long, default_value_t = DEFAULT_MEASUREMENT_ROWS)]
    pub rows: usize,

    /// Write the trained model as JSON.
    #[arg(long, value_name = "JSON")]
    pub save_model: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Score against a saved model JSON instead of training.
    #[arg(long, value_name = "JSON")]
    pub model_file: Option<PathBuf>,

    /// Signal strength (dBm).
    #[arg(long, allow_hyphen_values = true)]
    pub strength: f64,

    /// Latitude (degrees).
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude (degrees).
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Network label (5G, 4G, LTE, ...).
    #[arg(long)]
    pub network: String,

    /// Data throughput (Mbps).
    #[arg(long, default_value_t = 0.0)]
    pub throughput: f64,

    /// Latency (ms).
    #[arg(long, default_value_t = 0.0)]
    pub latency: f64,
}

#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Number of observations.
    #[arg(short = 'n', long, default_value_t = DEFAULT_SAMPLE_COUNT)]
    pub count: usize,

    /// Random seed.
    #[arg(long, env = "SQ_SEED", default_value_t = 42)]
    pub seed: u64,
}
