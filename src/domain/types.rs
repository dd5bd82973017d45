//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - read straight out of an upload CSV
//! - generated synthetically for demos
//! - fed to the regression model without further conversion

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Score given to any network label missing from [`NETWORK_SCORES`].
pub const DEFAULT_NETWORK_SCORE: f64 = 0.4;

/// Ordinal score per known network generation, newest first.
///
/// Labels are matched exactly (case-sensitive). Anything else, including the
/// empty label, scores [`DEFAULT_NETWORK_SCORE`].
pub const NETWORK_SCORES: [(&str, f64); 3] = [("5G", 1.0), ("4G", 0.8), ("LTE", 0.6)];

/// Cellular technology label attached to an observation.
///
/// The set is open: unknown labels are kept verbatim in `Other` so they can
/// still be filtered on and reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NetworkType {
    FiveG,
    FourG,
    Lte,
    Other(String),
}

impl NetworkType {
    pub fn label(&self) -> &str {
        match self {
            NetworkType::FiveG => "5G",
            NetworkType::FourG => "4G",
            NetworkType::Lte => "LTE",
            NetworkType::Other(s) => s,
        }
    }

    /// Ordinal quality score used as a regression feature.
    pub fn score(&self) -> f64 {
        category_score(self.label())
    }
}

/// Look up a raw label in [`NETWORK_SCORES`].
pub fn category_score(label: &str) -> f64 {
    NETWORK_SCORES
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, score)| *score)
        .unwrap_or(DEFAULT_NETWORK_SCORE)
}

impl From<&str> for NetworkType {
    fn from(value: &str) -> Self {
        match value {
            "5G" => NetworkType::FiveG,
            "4G" => NetworkType::FourG,
            "LTE" => NetworkType::Lte,
            other => NetworkType::Other(other.to_string()),
        }
    }
}

impl From<String> for NetworkType {
    fn from(value: String) -> Self {
        NetworkType::from(value.as_str())
    }
}

impl std::fmt::Display for NetworkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One field measurement.
///
/// Observations are immutable inputs; nothing downstream mutates them.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub timestamp: Option<DateTime<Utc>>,
    pub locality: String,
    /// Degrees.
    pub latitude: f64,
    /// Degrees.
    pub longitude: f64,
    /// dBm, typically in `[-120, -50]`.
    pub signal_strength: f64,
    /// Target: quality score on the 0–100 scale.
    pub signal_quality: f64,
    /// Mbps.
    pub data_throughput: f64,
    /// Milliseconds.
    pub latency: f64,
    pub network_type: NetworkType,
    /// Readings from the three SDR instruments, shown in the measurements table.
    pub instruments: InstrumentReadings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InstrumentReadings {
    pub bb60c: f64,
    pub srsran: f64,
    pub blade_rf: f64,
}

/// The raw tuple scored by the predictor.
///
/// Throughput and latency default to 0 when unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionInput {
    pub signal_strength: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub network_type: NetworkType,
    pub data_throughput: f64,
    pub latency: f64,
}

impl PredictionInput {
    pub fn new(
        signal_strength: f64,
        latitude: f64,
        longitude: f64,
        network_type: impl Into<NetworkType>,
    ) -> Self {
        Self {
            signal_strength,
            latitude,
            longitude,
            network_type: network_type.into(),
            data_throughput: 0.0,
            latency: 0.0,
        }
    }

    pub fn with_throughput(mut self, data_throughput: f64) -> Self {
        self.data_throughput = data_throughput;
        self
    }

    pub fn with_latency(mut self, latency: f64) -> Self {
        self.latency = latency;
        self
    }
}

impl From<&Observation> for PredictionInput {
    fn from(o: &Observation) -> Self {
        Self {
            signal_strength: o.signal_strength,
            latitude: o.latitude,
            longitude: o.longitude,
            network_type: o.network_type.clone(),
            data_throughput: o.data_throughput,
            latency: o.latency,
        }
    }
}

/// Row filter applied before reporting. Unset criteria pass everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationFilter {
    pub locality: Option<String>,
    pub network_type: Option<String>,
    /// Inclusive lower bound on signal strength (dBm).
    pub min_signal_strength: Option<f64>,
    /// Inclusive upper bound on latency (ms).
    pub max_latency: Option<f64>,
}

impl ObservationFilter {
    pub fn matches(&self, o: &Observation) -> bool {
        if let Some(loc) = &self.locality {
            if o.locality != *loc {
                return false;
            }
        }
        if let Some(net) = &self.network_type {
            if o.network_type.label() != net {
                return false;
            }
        }
        if let Some(min) = self.min_signal_strength {
            if o.signal_strength < min {
                return false;
            }
        }
        if let Some(max) = self.max_latency {
            if o.latency > max {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, observations: &[Observation]) -> Vec<Observation> {
        observations.iter().filter(|o| self.matches(o)).cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Summary of a (filtered) observation set.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub n_points: usize,
    pub avg_signal_strength: f64,
    pub avg_throughput: f64,
    pub avg_latency: f64,
    pub avg_quality: f64,
    /// Quality ≥ 80.
    pub excellent_points: usize,
    /// Quality < 40.
    pub poor_points: usize,
}

/// How the least-squares system is solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Solver {
    /// `(XᵗX)⁻¹Xᵗy` with the crate's own Gauss-Jordan inverse.
    #[default]
    Normal,
    /// SVD least squares via nalgebra.
    Svd,
}

/// What the normal-equation path does when `XᵗX` is singular.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SingularPolicy {
    /// Substitute the identity matrix for the inverse and carry on.
    #[default]
    Identity,
    /// Retry with `XᵗX + λI`; fall back to the identity if that fails too.
    Ridge { lambda: f64 },
}

/// CLI-facing name for [`SingularPolicy`] (the ridge λ is a separate flag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SingularMode {
    Identity,
    Ridge,
}

/// Default ridge strength when `--singular ridge` is chosen.
pub const DEFAULT_RIDGE_LAMBDA: f64 = 1e-6;

/// Where observations come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Csv(PathBuf),
    Sample { count: usize, seed: u64 },
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus `.env` / defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: DataSource,
    pub filter: ObservationFilter,
    pub solver: Solver,
    pub singular_policy: SingularPolicy,
    /// Surface training failures instead of degrading.
    pub strict: bool,
    /// Number of filtered rows to score in the prediction report.
    pub top_n: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(locality: &str, net: &str, strength: f64, latency: f64) -> Observation {
        Observation {
            timestamp: None,
            locality: locality.to_string(),
            latitude: 12.97,
            longitude: 77.59,
            signal_strength: strength,
            signal_quality: 50.0,
            data_throughput: 20.0,
            latency,
            network_type: NetworkType::from(net),
            instruments: InstrumentReadings::default(),
        }
    }

    #[test]
    fn category_scores_follow_table() {
        assert_eq!(category_score("5G"), 1.0);
        assert_eq!(category_score("4G"), 0.8);
        assert_eq!(category_score("LTE"), 0.6);
        assert_eq!(category_score("unknown"), 0.4);
        assert_eq!(category_score("3G"), DEFAULT_NETWORK_SCORE);
        assert_eq!(category_score("5g"), DEFAULT_NETWORK_SCORE);
        assert_eq!(category_score(""), DEFAULT_NETWORK_SCORE);
    }

    #[test]
    fn network_type_round_trips_label() {
        assert_eq!(NetworkType::from("LTE"), NetworkType::Lte);
        assert_eq!(NetworkType::from("3G").label(), "3G");
        assert_eq!(NetworkType::FiveG.score(), 1.0);
        assert_eq!(NetworkType::Other("WiMAX".into()).score(), 0.4);
    }

    #[test]
    fn filter_bounds_are_inclusive() {
        let data = vec![
            obs("Mall", "4G", -80.0, 50.0),
            obs("Mall", "5G", -90.0, 120.0),
            obs("Park", "4G", -70.0, 100.0),
        ];

        let filter = ObservationFilter {
            min_signal_strength: Some(-80.0),
            max_latency: Some(100.0),
            ..Default::default()
        };
        let kept = filter.apply(&data);
        assert_eq!(kept.len(), 2);

        let filter = ObservationFilter {
            locality: Some("Mall".into()),
            network_type: Some("5G".into()),
            ..Default::default()
        };
        let kept = filter.apply(&data);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].signal_strength, -90.0);

        assert!(ObservationFilter::default().is_empty());
        assert_eq!(ObservationFilter::default().apply(&data).len(), 3);
    }

    #[test]
    fn prediction_input_defaults_throughput_and_latency() {
        let input = PredictionInput::new(-70.0, 1.0, 2.0, "5G");
        assert_eq!(input.data_throughput, 0.0);
        assert_eq!(input.latency, 0.0);
        let input = input.with_throughput(55.0).with_latency(30.0);
        assert_eq!((input.data_throughput, input.latency), (55.0, 30.0));
    }
}
