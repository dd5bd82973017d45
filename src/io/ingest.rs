//! CSV ingest.
//!
//! Turns a drive-test export into [`Observation`]s. The layout is positional
//! (the header line is required but its names are not interpreted):
//!
//! ```text
//! timestamp, locality, latitude, longitude, signalStrength, signalQuality,
//! dataThroughput, latency, networkType, bb60c, srsran, bladeRF
//! ```
//!
//! Ingest is lenient about values and strict about shape:
//! - rows with fewer than [`MIN_FIELDS`] fields are skipped and reported
//! - numeric fields that do not parse become `0`
//! - the three instrument columns are optional

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use csv::StringRecord;
use log::{debug, info};

use crate::domain::{InstrumentReadings, NetworkType, Observation};
use crate::error::{AppError, EXIT_INPUT, EXIT_NO_DATA};

/// Rows need at least the columns up to and including `networkType`.
pub const MIN_FIELDS: usize = 9;

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed observations plus what was dropped.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub observations: Vec<Observation>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load observations from a CSV file on disk.
pub fn load_observations(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to open CSV '{}': {e}", path.display()),
        )
    })?;
    info!("reading observations from {}", path.display());
    read_observations(file)
}

/// Parse observations from any reader.
pub fn read_observations<R: Read>(input: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read CSV header: {e}")))?
        .clone();
    if headers.is_empty() {
        return Err(AppError::new(EXIT_INPUT, "CSV must have header and data"));
    }

    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record) {
            Ok(o) => observations.push(o),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if rows_read == 0 {
        return Err(AppError::new(EXIT_INPUT, "CSV must have header and data"));
    }
    if observations.is_empty() {
        return Err(AppError::new(
            EXIT_NO_DATA,
            format!("No valid rows in CSV ({rows_read} read, all rejected)."),
        ));
    }

    debug!(
        "parsed {} observations, {} rows rejected",
        observations.len(),
        row_errors.len()
    );

    Ok(IngestedData {
        observations,
        row_errors,
        rows_read,
    })
}

fn parse_row(record: &StringRecord) -> Result<Observation, String> {
    if record.len() < MIN_FIELDS {
        return Err(format!(
            "expected at least {MIN_FIELDS} fields, found {}",
            record.len()
        ));
    }

    let text = |i: usize| record.get(i).unwrap_or("");
    let number = |i: usize| parse_lenient(text(i));

    Ok(Observation {
        timestamp: parse_timestamp(text(0)),
        locality: text(1).to_string(),
        latitude: number(2),
        longitude: number(3),
        signal_strength: number(4),
        signal_quality: number(5),
        data_throughput: number(6),
        latency: number(7),
        network_type: NetworkType::from(text(8)),
        instruments: InstrumentReadings {
            bb60c: number(9),
            srsran: number(10),
            blade_rf: number(11),
        },
    })
}

/// Parse a float, mapping anything unparseable (or NaN) to `0`.
fn parse_lenient(s: &str) -> f64 {
    match s.parse::<f64>() {
        Ok(v) if !v.is_nan() => v,
        _ => 0.0,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
