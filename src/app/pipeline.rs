//! Shared "analyze" pipeline used by every CLI subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load/generate observations -> train -> filter -> statistics -> predictions
//!
//! The subcommands can then focus on presentation.

use chrono::Utc;
use log::info;

use crate::data::generate_sample;
use crate::domain::{DataSource, DatasetStats, Observation, RunConfig};
use crate::error::AppError;
use crate::fit::FitOptions;
use crate::io::{RowError, load_observations};
use crate::models::{RegressionModel, TrainOutcome};
use crate::report::{PredictionRow, build_predictions, compute_stats};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub observations: Vec<Observation>,
    pub row_errors: Vec<RowError>,
    pub model: RegressionModel,
    pub outcome: TrainOutcome,
    pub filtered: Vec<Observation>,
    pub stats: Option<DatasetStats>,
    pub predictions: Option<Vec<PredictionRow>>,
}

/// Load observations per `config.source` and run the pipeline.
pub fn run_analysis(config: &RunConfig) -> Result<RunOutput, AppError> {
    let (observations, row_errors) = match &config.source {
        DataSource::Csv(path) => {
            let ingest = load_observations(path)?;
            (ingest.observations, ingest.row_errors)
        }
        DataSource::Sample { count, seed } => {
            (generate_sample(*count, *seed, Utc::now())?, Vec::new())
        }
    };
    info!("loaded {} observations", observations.len());

    run_analysis_with(config, observations, row_errors)
}

/// Run the pipeline on observations that are already in memory.
///
/// The model is trained on the full set; filters only narrow what gets
/// summarized and scored.
pub fn run_analysis_with(
    config: &RunConfig,
    observations: Vec<Observation>,
    row_errors: Vec<RowError>,
) -> Result<RunOutput, AppError> {
    let untrained = RegressionModel::with_options(FitOptions {
        solver: config.solver,
        singular_policy: config.singular_policy,
    });

    let trained = if config.strict {
        untrained.train_strict(&observations)?
    } else {
        untrained.train(&observations)
    };

    let filtered = config.filter.apply(&observations);
    info!(
        "{} of {} observations pass the filter",
        filtered.len(),
        observations.len()
    );

    let stats = compute_stats(&filtered);
    let predictions = build_predictions(&trained.model, &filtered, config.top_n);

    Ok(RunOutput {
        observations,
        row_errors,
        model: trained.model,
        outcome: trained.outcome,
        filtered,
        stats,
        predictions,
    })
}
