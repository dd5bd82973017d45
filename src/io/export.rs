//! Write observations as CSV.
//!
//! The column order matches what `ingest` reads, so `sq sample > data.csv`
//! produces a file `sq analyze --csv data.csv` accepts unchanged.

use std::io::Write;

use chrono::SecondsFormat;

use crate::domain::Observation;
use crate::error::{AppError, EXIT_INPUT};

pub const CSV_HEADER: [&str; 12] = [
    "timestamp",
    "locality",
    "latitude",
    "longitude",
    "signalStrength",
    "signalQuality",
    "dataThroughput",
    "latency",
    "networkType",
    "bb60cMeasurement",
    "srsranMeasurement",
    "bladeRFMeasurement",
];

pub fn write_observations_csv<W: Write>(
    out: W,
    observations: &[Observation],
) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    let fail = |e: csv::Error| AppError::new(EXIT_INPUT, format!("Failed to write CSV: {e}"));

    writer.write_record(CSV_HEADER).map_err(fail)?;
    for o in observations {
        writer
            .write_record([
                o.timestamp
                    .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
                    .unwrap_or_default(),
                o.locality.clone(),
                format!("{:.6}", o.latitude),
                format!("{:.6}", o.longitude),
                format!("{:.2}", o.signal_strength),
                format!("{:.2}", o.signal_quality),
                format!("{:.2}", o.data_throughput),
                format!("{:.2}", o.latency),
                o.network_type.label().to_string(),
                format!("{:.2}", o.instruments.bb60c),
                format!("{:.2}", o.instruments.srsran),
                format!("{:.2}", o.instruments.blade_rf),
            ])
            .map_err(fail)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to flush CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::read_observations;
    use chrono::{TimeZone, Utc};

    #[test]
    fn written_csv_reads_back() {
        let anchor = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let sample = crate::data::generate_sample(12, 3, anchor).unwrap();

        let mut buf = Vec::new();
        write_observations_csv(&mut buf, &sample).unwrap();
        let back = read_observations(buf.as_slice()).unwrap();

        assert_eq!(back.observations.len(), 12);
        assert!(back.row_errors.is_empty());
        for (a, b) in sample.iter().zip(&back.observations) {
            assert_eq!(a.locality, b.locality);
            assert_eq!(a.network_type, b.network_type);
            assert!((a.signal_quality - b.signal_quality).abs() <= 0.005 + 1e-9);
            assert!((a.latitude - b.latitude).abs() <= 5e-7 + 1e-12);
            assert!(b.timestamp.is_some());
        }
    }
}
