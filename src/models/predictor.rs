//! The regression model: training state plus bounded prediction.
//!
//! A [`RegressionModel`] is a value. Training does not mutate it; it returns
//! a new model together with a [`TrainOutcome`] saying what happened. The
//! default paths never fail:
//!
//! - fewer than [`MIN_TRAINING_ROWS`] observations: the prior model comes back unchanged
//! - singular `XᵗX`: handled by the configured singular policy
//! - any other numeric failure: seven zero coefficients, still "trained"
//!
//! `train_strict` / `predict_strict` surface those cases as errors instead.

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::domain::{Observation, PredictionInput};
use crate::fit::{
    Coefficients, FitError, FitOptions, MIN_TRAINING_ROWS, SolveKind, TARGET_SCALE, fit,
    fit_strict,
};
use crate::math::dot;
use crate::models::{FEATURE_COUNT, encode};

/// Predictions are clamped into this range.
pub const QUALITY_MIN: f64 = 0.0;
pub const QUALITY_MAX: f64 = 100.0;

/// What a call to [`RegressionModel::train`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainOutcome {
    /// Too few observations; the model was left as it was.
    Skipped { observations: usize },
    Fitted,
    /// `XᵗX` was singular and the identity stood in for its inverse.
    SingularFallback,
    Regularized { lambda: f64 },
    /// The solve failed; coefficients were replaced with zeros.
    Degraded { reason: String },
}

impl TrainOutcome {
    /// `true` for outcomes whose coefficients are not a real least-squares fit.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            TrainOutcome::SingularFallback | TrainOutcome::Degraded { .. }
        )
    }
}

/// Result of [`RegressionModel::train`].
#[derive(Debug, Clone, PartialEq)]
pub struct Trained {
    pub model: RegressionModel,
    pub outcome: TrainOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictError {
    NotTrained,
    /// The dot product came out NaN or infinite.
    NonFinite { raw: f64 },
}

impl std::fmt::Display for PredictError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredictError::NotTrained => write!(f, "model has not been trained"),
            PredictError::NonFinite { raw } => write!(f, "non-finite prediction ({raw})"),
        }
    }
}

impl std::error::Error for PredictError {}

/// Linear model from the seven encoded features to signal quality.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegressionModel {
    coefficients: Option<Coefficients>,
    options: FitOptions,
}

impl RegressionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FitOptions) -> Self {
        Self {
            coefficients: None,
            options,
        }
    }

    /// A trained model with known coefficients.
    pub fn from_coefficients(coefficients: Coefficients, options: FitOptions) -> Self {
        Self {
            coefficients: Some(coefficients),
            options,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.coefficients.is_some()
    }

    pub fn coefficients(&self) -> Option<&Coefficients> {
        self.coefficients.as_ref()
    }

    pub fn options(&self) -> &FitOptions {
        &self.options
    }

    /// Fit on `observations`, never failing.
    pub fn train(&self, observations: &[Observation]) -> Trained {
        info!("training on {} observations", observations.len());

        let (coefficients, outcome) = match fit(observations, &self.options) {
            Ok(fit) => (fit.coefficients, outcome_for(fit.kind)),
            Err(FitError::InsufficientData { observations, .. }) => {
                info!(
                    "not enough data for training ({observations} < {MIN_TRAINING_ROWS}); keeping previous model"
                );
                return Trained {
                    model: self.clone(),
                    outcome: TrainOutcome::Skipped { observations },
                };
            }
            Err(err) => {
                warn!("training failed, falling back to zero coefficients: {err}");
                (
                    [0.0; FEATURE_COUNT],
                    TrainOutcome::Degraded {
                        reason: err.to_string(),
                    },
                )
            }
        };

        info!("model trained ({outcome:?})");
        Trained {
            model: Self {
                coefficients: Some(coefficients),
                options: self.options,
            },
            outcome,
        }
    }

    /// Fit on `observations`, surfacing every failure.
    pub fn train_strict(&self, observations: &[Observation]) -> Result<Trained, FitError> {
        let fit = fit_strict(observations, &self.options)?;
        Ok(Trained {
            model: Self {
                coefficients: Some(fit.coefficients),
                options: self.options,
            },
            outcome: outcome_for(fit.kind),
        })
    }

    /// Predicted quality in `[0, 100]`, or `None` if untrained or the
    /// arithmetic breaks down.
    pub fn predict(&self, input: &PredictionInput) -> Option<f64> {
        match self.predict_strict(input) {
            Ok(q) => Some(q),
            Err(PredictError::NotTrained) => None,
            Err(err) => {
                warn!("prediction failed: {err}");
                None
            }
        }
    }

    pub fn predict_strict(&self, input: &PredictionInput) -> Result<f64, PredictError> {
        let coefficients = self.coefficients.as_ref().ok_or(PredictError::NotTrained)?;
        let raw = dot(coefficients, &encode(input)) * TARGET_SCALE;
        if !raw.is_finite() {
            return Err(PredictError::NonFinite { raw });
        }
        debug!("raw prediction {raw:.4}");
        Ok(raw.clamp(QUALITY_MIN, QUALITY_MAX))
    }

    /// Score many inputs in parallel.
    pub fn predict_batch(&self, inputs: &[PredictionInput]) -> Vec<Option<f64>> {
        inputs.par_iter().map(|input| self.predict(input)).collect()
    }
}

fn outcome_for(kind: SolveKind) -> TrainOutcome {
    match kind {
        SolveKind::Exact => TrainOutcome::Fitted,
        SolveKind::IdentityFallback => TrainOutcome::SingularFallback,
        SolveKind::Regularized { lambda } => TrainOutcome::Regularized { lambda },
    }
}
