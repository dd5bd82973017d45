//! Feature encoding.
//!
//! Every observation maps to the same fixed layout:
//!
//! ```text
//! [1, strength/100, latitude, longitude, network score, throughput/100, latency/1000]
//! ```
//!
//! The leading 1 is the intercept. Encoding is pure and infallible; an
//! unrecognized network label simply gets the default score.

use rayon::prelude::*;

use crate::domain::{NetworkType, Observation, PredictionInput};
use crate::math::{Matrix, MathError};

/// Width of the feature vector (and of the coefficient vector).
pub const FEATURE_COUNT: usize = 7;

pub type FeatureVector = [f64; FEATURE_COUNT];

/// Encode a prediction tuple.
pub fn encode(input: &PredictionInput) -> FeatureVector {
    encode_parts(
        input.signal_strength,
        input.latitude,
        input.longitude,
        &input.network_type,
        input.data_throughput,
        input.latency,
    )
}

/// Encode an observation (the target is ignored).
pub fn encode_observation(o: &Observation) -> FeatureVector {
    encode_parts(
        o.signal_strength,
        o.latitude,
        o.longitude,
        &o.network_type,
        o.data_throughput,
        o.latency,
    )
}

fn encode_parts(
    signal_strength: f64,
    latitude: f64,
    longitude: f64,
    network_type: &NetworkType,
    data_throughput: f64,
    latency: f64,
) -> FeatureVector {
    [
        1.0,
        signal_strength / 100.0,
        latitude,
        longitude,
        network_type.score(),
        data_throughput / 100.0,
        latency / 1000.0,
    ]
}

/// Build the `n × FEATURE_COUNT` design matrix.
pub fn design_matrix(observations: &[Observation]) -> Result<Matrix, MathError> {
    let rows: Vec<FeatureVector> = observations.par_iter().map(encode_observation).collect();
    Matrix::from_rows(&rows)
}
