//! Read/write trained-model JSON files.
//!
//! A model file is the portable form of a trained [`RegressionModel`]:
//! the seven coefficients plus the solver settings and training metadata.
//! `sq analyze --save-model` writes one; `sq predict --model-file` scores against
//! it without retraining.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, EXIT_INPUT, EXIT_NO_DATA};
use crate::fit::{Coefficients, FitOptions};
use crate::models::{RegressionModel, TrainOutcome};

/// On-disk schema of a model file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub trained_at: DateTime<Utc>,
    /// Observations the model was trained on.
    pub observations: usize,
    /// `true` when the coefficients came from a fallback rather than a real fit.
    pub degraded: bool,
    pub options: FitOptions,
    pub coefficients: Coefficients,
}

impl ModelFile {
    /// Snapshot a trained model. Untrained models have nothing to save.
    pub fn from_model(
        model: &RegressionModel,
        outcome: &TrainOutcome,
        observations: usize,
        trained_at: DateTime<Utc>,
    ) -> Result<Self, AppError> {
        let coefficients = *model
            .coefficients()
            .ok_or_else(|| AppError::new(EXIT_NO_DATA, "Model is not trained; nothing to save"))?;
        Ok(Self {
            tool: "sq".to_string(),
            trained_at,
            observations,
            degraded: outcome.is_degraded(),
            options: *model.options(),
            coefficients,
        })
    }

    pub fn into_model(self) -> RegressionModel {
        RegressionModel::from_coefficients(self.coefficients, self.options)
    }
}

/// Write a model JSON file.
pub fn write_model_json(path: &Path, file: &ModelFile) -> Result<(), AppError> {
    let out = File::create(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to create model JSON '{}': {e}", path.display()),
        )
    })?;
    write_model(out, file)
}

pub fn write_model<W: Write>(out: W, file: &ModelFile) -> Result<(), AppError> {
    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write model JSON: {e}")))
}

/// Read a model JSON file.
pub fn read_model_json(path: &Path) -> Result<ModelFile, AppError> {
    let input = File::open(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to open model JSON '{}': {e}", path.display()),
        )
    })?;
    read_model(input)
}

pub fn read_model<R: Read>(input: R) -> Result<ModelFile, AppError> {
    let file: ModelFile = serde_json::from_reader(input)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Invalid model JSON: {e}")))?;
    if file.coefficients.iter().any(|c| !c.is_finite()) {
        return Err(AppError::new(
            EXIT_INPUT,
            "Invalid model JSON: coefficients must be finite",
        ));
    }
    Ok(file)
}
