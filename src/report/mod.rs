//! Reporting utilities: prediction rows, dataset statistics, and formatted
//! terminal output.
//!
//! We keep formatting code in one place so the model and fitting code stay
//! free of presentation concerns.

use std::collections::BTreeSet;

use crate::domain::{DatasetStats, Observation, PredictionInput};
use crate::models::RegressionModel;

pub mod format;

pub use format::*;

/// Rows scored in the prediction report by default.
pub const DEFAULT_REPORT_ROWS: usize = 10;

/// Rows shown in the measurements table by default.
pub const DEFAULT_MEASUREMENT_ROWS: usize = 50;

/// Quality at or above this counts as excellent.
pub const EXCELLENT_QUALITY: f64 = 80.0;
/// Quality at or above this (and below excellent) counts as good.
pub const GOOD_QUALITY: f64 = 60.0;
/// Quality below this counts as poor.
pub const POOR_QUALITY: f64 = 40.0;

/// Coarse quality grade shown next to each measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityBand {
    pub fn of(quality: f64) -> Self {
        if quality >= EXCELLENT_QUALITY {
            QualityBand::Excellent
        } else if quality >= GOOD_QUALITY {
            QualityBand::Good
        } else if quality >= POOR_QUALITY {
            QualityBand::Fair
        } else {
            QualityBand::Poor
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QualityBand::Excellent => "excellent",
            QualityBand::Good => "good",
            QualityBand::Fair => "fair",
            QualityBand::Poor => "poor",
        }
    }
}

/// One observation scored against the model.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRow {
    pub locality: String,
    pub network_type: String,
    pub actual_quality: f64,
    /// `None` when the model declined to predict.
    pub predicted_quality: Option<f64>,
    /// `max(0, 100 - |predicted - actual|)`, or 0 without a prediction.
    pub accuracy: f64,
}

/// Score the first `limit` observations.
///
/// Returns `None` when the model is untrained or there is nothing to score.
pub fn build_predictions(
    model: &RegressionModel,
    observations: &[Observation],
    limit: usize,
) -> Option<Vec<PredictionRow>> {
    if !model.is_trained() || observations.is_empty() {
        return None;
    }

    let head = &observations[..limit.min(observations.len())];
    let inputs: Vec<PredictionInput> = head.iter().map(PredictionInput::from).collect();
    let predicted = model.predict_batch(&inputs);

    let rows = head
        .iter()
        .zip(predicted)
        .map(|(o, predicted_quality)| PredictionRow {
            locality: o.locality.clone(),
            network_type: o.network_type.label().to_string(),
            actual_quality: o.signal_quality,
            predicted_quality,
            accuracy: predicted_quality
                .map(|p| accuracy(p, o.signal_quality))
                .unwrap_or(0.0),
        })
        .collect();
    Some(rows)
}

pub fn accuracy(predicted: f64, actual: f64) -> f64 {
    (100.0 - (predicted - actual).abs()).max(0.0)
}

/// Averages and quality buckets for a set of observations.
pub fn compute_stats(observations: &[Observation]) -> Option<DatasetStats> {
    if observations.is_empty() {
        return None;
    }
    let n = observations.len() as f64;
    let mean = |f: fn(&Observation) -> f64| observations.iter().map(f).sum::<f64>() / n;

    Some(DatasetStats {
        n_points: observations.len(),
        avg_signal_strength: mean(|o| o.signal_strength),
        avg_throughput: mean(|o| o.data_throughput),
        avg_latency: mean(|o| o.latency),
        avg_quality: mean(|o| o.signal_quality),
        excellent_points: observations
            .iter()
            .filter(|o| o.signal_quality >= EXCELLENT_QUALITY)
            .count(),
        poor_points: observations
            .iter()
            .filter(|o| o.signal_quality < POOR_QUALITY)
            .count(),
    })
}

/// Sorted distinct non-empty localities.
pub fn distinct_localities(observations: &[Observation]) -> Vec<String> {
    distinct(observations.iter().map(|o| o.locality.as_str()))
}

/// Sorted distinct non-empty network labels.
pub fn distinct_network_types(observations: &[Observation]) -> Vec<String> {
    distinct(observations.iter().map(|o| o.network_type.label()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
