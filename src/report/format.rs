//! Terminal formatting for run summaries and prediction tables.

use crate::app::pipeline::RunOutput;
use crate::domain::{Observation, ObservationFilter, PredictionInput, RunConfig};
use crate::models::{FEATURE_COUNT, TrainOutcome};
use crate::report::{PredictionRow, QualityBand, distinct_localities, distinct_network_types};

/// Labels for the coefficient vector, in feature order.
pub const FEATURE_LABELS: [&str; FEATURE_COUNT] = [
    "intercept",
    "strength/100",
    "latitude",
    "longitude",
    "network",
    "throughput/100",
    "latency/1000",
];

/// Format the full run summary (data, filter, model, statistics).
pub fn format_run_summary(run: &RunOutput, config: &RunConfig) -> String {
    let mut out = String::new();

    out.push_str("=== sq - Signal Quality Predictor ===\n");
    out.push_str(&format!(
        "Observations: {} loaded | {} rejected rows\n",
        run.observations.len(),
        run.row_errors.len()
    ));
    for e in run.row_errors.iter().take(5) {
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
    }
    if run.row_errors.len() > 5 {
        out.push_str(&format!("  ... {} more\n", run.row_errors.len() - 5));
    }

    out.push_str(&format!(
        "Localities: {}\n",
        fmt_choices(&distinct_localities(&run.observations))
    ));
    out.push_str(&format!(
        "Networks: {}\n",
        fmt_choices(&distinct_network_types(&run.observations))
    ));

    if !config.filter.is_empty() {
        out.push_str(&format!("Filter: {}\n", fmt_filter(&config.filter)));
    }
    out.push_str(&format!("Filtered: {}\n", run.filtered.len()));

    out.push_str("\nModel:\n");
    out.push_str(&format!("- solver: {:?}\n", config.solver));
    out.push_str(&format!("- status: {}\n", fmt_outcome(&run.outcome)));
    match run.model.coefficients() {
        Some(c) => {
            for (label, v) in FEATURE_LABELS.iter().zip(c) {
                out.push_str(&format!("  {label:<16} {v:>14.6}\n"));
            }
        }
        None => out.push_str("- not trained\n"),
    }

    out.push_str("\nStatistics:\n");
    match &run.stats {
        Some(s) => {
            out.push_str(&format!("- avg signal strength: {:.1} dBm\n", s.avg_signal_strength));
            out.push_str(&format!("- avg throughput     : {:.1} Mbps\n", s.avg_throughput));
            out.push_str(&format!("- avg latency        : {:.1} ms\n", s.avg_latency));
            out.push_str(&format!("- avg quality        : {:.1}%\n", s.avg_quality));
            out.push_str(&format!(
                "- points: {} | excellent (>=80): {} | poor (<40): {}\n",
                s.n_points, s.excellent_points, s.poor_points
            ));
        }
        None => out.push_str("- no observations match the filter\n"),
    }
    out.push('\n');

    out
}

/// Format the prediction table.
pub fn format_predictions(rows: Option<&[PredictionRow]>) -> String {
    let Some(rows) = rows else {
        return "Cannot generate predictions: model not trained or no data\n".to_string();
    };

    let mut out = String::new();
    out.push_str(
        format!(
            "{:<16} {:<8} {:>10} {:>10} {:>10}",
            "locality", "network", "actual", "predicted", "accuracy"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:-<16} {:-<8} {:-<10} {:-<10} {:-<10}\n",
        "", "", "", "", ""
    ));

    for r in rows {
        let predicted = r
            .predicted_quality
            .map(|p| format!("{p:.1}%"))
            .unwrap_or_else(|| "n/a".to_string());
        out.push_str(&format!(
            "{:<16} {:<8} {:>10} {:>10} {:>10}\n",
            truncate(&r.locality, 16),
            truncate(&r.network_type, 8),
            format!("{:.1}%", r.actual_quality),
            predicted,
            format!("{:.1}%", r.accuracy),
        ));
    }

    out
}

/// Format the first `limit` measurements with their quality band and
/// instrument readings.
pub fn format_measurements(observations: &[Observation], limit: usize) -> String {
    if observations.is_empty() {
        return "No measurements match the filter\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:<16} {:>8} {:>17} {:>10} {:>8} {:<8} {:>8} {:>8} {:>8}\n",
        "locality", "dBm", "quality", "Mbps", "ms", "network", "bb60c", "srsran", "bladerf"
    ));
    out.push_str(&format!(
        "{:-<16} {:-<8} {:-<17} {:-<10} {:-<8} {:-<8} {:-<8} {:-<8} {:-<8}\n",
        "", "", "", "", "", "", "", "", ""
    ));

    for o in observations.iter().take(limit) {
        let quality = format!(
            "{:.1}% {}",
            o.signal_quality,
            QualityBand::of(o.signal_quality).label()
        );
        out.push_str(&format!(
            "{:<16} {:>8.1} {:>17} {:>10.1} {:>8.1} {:<8} {:>8.1} {:>8.1} {:>8.1}\n",
            truncate(&o.locality, 16),
            o.signal_strength,
            quality,
            o.data_throughput,
            o.latency,
            truncate(o.network_type.label(), 8),
            o.instruments.bb60c,
            o.instruments.srsran,
            o.instruments.blade_rf,
        ));
    }
    if observations.len() > limit {
        out.push_str(&format!("... {} more\n", observations.len() - limit));
    }

    out
}

/// Format a single ad-hoc prediction.
pub fn format_single_prediction(input: &PredictionInput, predicted: Option<f64>) -> String {
    let head = format!(
        "strength={:.1}dBm lat={:.4} lon={:.4} network={} throughput={:.1}Mbps latency={:.1}ms",
        input.signal_strength,
        input.latitude,
        input.longitude,
        input.network_type,
        input.data_throughput,
        input.latency
    );
    match predicted {
        Some(q) => format!("{head}\npredicted quality: {q:.1}%"),
        None => format!("{head}\npredicted quality: n/a (model not trained)"),
    }
}

fn fmt_outcome(outcome: &TrainOutcome) -> String {
    match outcome {
        TrainOutcome::Skipped { observations } => {
            format!("skipped (only {observations} observations)")
        }
        TrainOutcome::Fitted => "fitted".to_string(),
        TrainOutcome::SingularFallback => {
            "fitted with identity fallback (XᵗX singular)".to_string()
        }
        TrainOutcome::Regularized { lambda } => format!("fitted with ridge λ={lambda:e}"),
        TrainOutcome::Degraded { reason } => format!("degraded to zero coefficients ({reason})"),
    }
}

fn fmt_filter(filter: &ObservationFilter) -> String {
    let mut parts = Vec::new();
    if let Some(v) = &filter.locality {
        parts.push(format!("locality={v}"));
    }
    if let Some(v) = &filter.network_type {
        parts.push(format!("network={v}"));
    }
    if let Some(v) = filter.min_signal_strength {
        parts.push(format!("strength>={v}"));
    }
    if let Some(v) = filter.max_latency {
        parts.push(format!("latency<={v}"));
    }
    parts.join(" ")
}

fn fmt_choices(values: &[String]) -> String {
    if values.is_empty() {
        "(none)".to_string()
    } else {
        values.join(", ")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_marks_cut_strings() {
        assert_eq!(truncate("Downtown", 16), "Downtown");
        assert_eq!(truncate("University", 5), "Univ.");
    }

    #[test]
    fn predictions_table_shows_absent_values() {
        let rows = vec![PredictionRow {
            locality: "Park".into(),
            network_type: "LTE".into(),
            actual_quality: 55.0,
            predicted_quality: None,
            accuracy: 0.0,
        }];
        let table = format_predictions(Some(&rows));
        assert!(table.contains("n/a"));
        assert!(table.contains("55.0%"));

        assert!(format_predictions(None).starts_with("Cannot generate predictions"));
    }

    #[test]
    fn single_prediction_mentions_untrained() {
        let input = PredictionInput::new(-70.0, 12.9, 77.6, "5G");
        assert!(format_single_prediction(&input, None).contains("not trained"));
        assert!(format_single_prediction(&input, Some(61.23)).contains("61.2%"));
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(fmt_outcome(&TrainOutcome::Fitted), "fitted");
        assert!(fmt_outcome(&TrainOutcome::Skipped { observations: 3 }).contains("3"));
    }

    fn measurement(locality: &str, quality: f64) -> Observation {
        Observation {
            timestamp: None,
            locality: locality.into(),
            latitude: 12.97,
            longitude: 77.59,
            signal_strength: -72.5,
            signal_quality: quality,
            data_throughput: 48.0,
            latency: 35.0,
            network_type: "5G".into(),
            instruments: crate::domain::InstrumentReadings {
                bb60c: -81.25,
                srsran: -64.0,
                blade_rf: -99.5,
            },
        }
    }

    #[test]
    fn measurements_show_band_and_instruments() {
        let data = vec![
            measurement("Park", 80.0),
            measurement("Mall", 60.0),
            measurement("Airport", 40.0),
            measurement("Lake", 39.9),
        ];
        let table = format_measurements(&data, 50);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2 + data.len());
        assert!(lines[2].contains("80.0% excellent"));
        assert!(lines[3].contains("60.0% good"));
        assert!(lines[4].contains("40.0% fair"));
        assert!(lines[5].contains("39.9% poor"));
        assert!(lines[2].contains("-81.2") || lines[2].contains("-81.3"));
        assert!(lines[2].contains("-64.0"));
        assert!(lines[2].contains("-99.5"));
    }

    #[test]
    fn measurements_are_capped() {
        let data = vec![measurement("Park", 70.0); 5];
        let table = format_measurements(&data, 3);
        assert_eq!(table.lines().count(), 2 + 3 + 1);
        assert!(table.ends_with("... 2 more\n"));
        assert!(format_measurements(&[], 50).starts_with("No measurements"));
    }
}
