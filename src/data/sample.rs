//! Synthetic drive-test sample generation.
//!
//! Produces plausible measurements around a single city centre so the full
//! pipeline can be exercised without an upload. Output is fully determined by
//! the seed and the anchor instant.

use chrono::{DateTime, Duration, Utc};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Uniform;

use crate::domain::{InstrumentReadings, NetworkType, Observation};
use crate::error::{AppError, EXIT_INPUT};

/// Number of records produced by default.
pub const DEFAULT_SAMPLE_COUNT: usize = 50;

pub const LOCALITIES: [&str; 8] = [
    "Downtown",
    "Suburbs",
    "Airport",
    "Mall",
    "University",
    "Hospital",
    "Park",
    "Stadium",
];

pub const NETWORK_LABELS: [&str; 4] = ["4G", "5G", "LTE", "3G"];

const CENTER_LATITUDE: f64 = 12.9716;
const CENTER_LONGITUDE: f64 = 77.5946;
/// Full width of the lat/lon scatter box (degrees).
const SPREAD_DEGREES: f64 = 0.1;
const LOOKBACK_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Generate `count` observations.
pub fn generate_sample(
    count: usize,
    seed: u64,
    anchor: DateTime<Utc>,
) -> Result<Vec<Observation>, AppError> {
    if count == 0 {
        return Err(AppError::new(EXIT_INPUT, "Sample count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let unit = Uniform::new(0.0_f64, 1.0);
    let dbm = Uniform::new(-120.0_f64, -50.0);
    let percent = Uniform::new(0.0_f64, 100.0);
    let latency = Uniform::new(10.0_f64, 210.0);
    let age = Uniform::new(0_i64, LOOKBACK_SECONDS);

    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        let timestamp = anchor - Duration::seconds(age.sample(&mut rng));
        let locality = LOCALITIES[rng.gen_range(0..LOCALITIES.len())];
        let network = NETWORK_LABELS[rng.gen_range(0..NETWORK_LABELS.len())];

        points.push(Observation {
            timestamp: Some(timestamp),
            locality: locality.to_string(),
            latitude: CENTER_LATITUDE + (unit.sample(&mut rng) - 0.5) * SPREAD_DEGREES,
            longitude: CENTER_LONGITUDE + (unit.sample(&mut rng) - 0.5) * SPREAD_DEGREES,
            signal_strength: dbm.sample(&mut rng),
            signal_quality: percent.sample(&mut rng),
            data_throughput: percent.sample(&mut rng),
            latency: latency.sample(&mut rng),
            network_type: NetworkType::from(network),
            instruments: InstrumentReadings {
                bb60c: dbm.sample(&mut rng),
                srsran: dbm.sample(&mut rng),
                blade_rf: dbm.sample(&mut rng),
            },
        });
    }

    Ok(points)
}
