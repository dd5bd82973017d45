use chrono::{TimeZone, Utc};

use signal_quality::app::pipeline::{run_analysis, run_analysis_with};
use signal_quality::data::generate_sample;
use signal_quality::domain::{
    DataSource, InstrumentReadings, NetworkType, Observation, ObservationFilter, PredictionInput,
    RunConfig, SingularPolicy, Solver,
};
use signal_quality::error::EXIT_NO_DATA;
use signal_quality::io::write_observations_csv;
use signal_quality::models::{RegressionModel, TrainOutcome};
use signal_quality::report::{format_measurements, format_run_summary};

fn config() -> RunConfig {
    RunConfig {
        source: DataSource::Sample { count: 50, seed: 42 },
        filter: ObservationFilter::default(),
        solver: Solver::Normal,
        singular_policy: SingularPolicy::Identity,
        strict: false,
        top_n: 10,
    }
}

fn flat_observation() -> Observation {
    Observation {
        timestamp: None,
        locality: "Downtown".into(),
        latitude: 12.9716,
        longitude: 77.5946,
        signal_strength: -70.0,
        signal_quality: 80.0,
        data_throughput: 50.0,
        latency: 40.0,
        network_type: NetworkType::FourG,
        instruments: InstrumentReadings::default(),
    }
}

#[test]
fn identical_observations_degrade_gracefully() {
    let data = vec![flat_observation(); 10];
    let trained = RegressionModel::new().train(&data);
    assert!(trained.model.is_trained());
    assert_eq!(trained.outcome, TrainOutcome::SingularFallback);

    // β = Xᵗy overshoots by orders of magnitude, so the clamp decides.
    let q = trained.model.predict(&PredictionInput::from(&data[0]));
    assert_eq!(q, Some(100.0));
}

#[test]
fn three_observations_never_train() {
    let data = vec![flat_observation(); 3];
    let trained = RegressionModel::new().train(&data);
    assert_eq!(trained.outcome, TrainOutcome::Skipped { observations: 3 });
    assert!(!trained.model.is_trained());

    for input in [
        PredictionInput::new(-70.0, 12.97, 77.59, "4G"),
        PredictionInput::new(-120.0, 0.0, 0.0, "unknown")
            .with_throughput(90.0)
            .with_latency(300.0),
    ] {
        assert_eq!(trained.model.predict(&input), None);
    }
}

#[test]
fn sample_pipeline_trains_and_scores() {
    let run = run_analysis(&config()).unwrap();
    assert_eq!(run.observations.len(), 50);
    assert!(run.model.is_trained());

    let rows = run.predictions.expect("predictions for trained model");
    assert_eq!(rows.len(), 10);
    for r in &rows {
        let p = r.predicted_quality.expect("trained model predicts");
        assert!((0.0..=100.0).contains(&p));
        assert!((0.0..=100.0).contains(&r.accuracy));
    }
    assert_eq!(run.stats.map(|s| s.n_points), Some(50));
}

#[test]
fn filters_narrow_reporting_but_not_training() {
    let anchor = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let data = generate_sample(60, 11, anchor).unwrap();

    let mut cfg = config();
    cfg.filter.network_type = Some("5G".into());
    let run = run_analysis_with(&cfg, data.clone(), Vec::new()).unwrap();

    let unfiltered = run_analysis_with(&config(), data, Vec::new()).unwrap();
    assert_eq!(run.model, unfiltered.model);
    assert!(run.filtered.iter().all(|o| o.network_type == NetworkType::FiveG));
    assert!(run.filtered.len() < unfiltered.filtered.len());
}

#[test]
fn summary_lists_choices_from_full_dataset() {
    let anchor = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let data = generate_sample(60, 11, anchor).unwrap();

    let picked = data[0].locality.clone();
    let mut cfg = config();
    cfg.filter.locality = Some(picked.clone());
    let run = run_analysis_with(&cfg, data, Vec::new()).unwrap();
    let summary = format_run_summary(&run, &cfg);

    let localities = summary
        .lines()
        .find(|l| l.starts_with("Localities: "))
        .expect("localities line");
    assert!(localities.contains(&picked));
    assert!(localities.contains(", "));
    assert!(summary.lines().any(|l| l.starts_with("Networks: ")));

    let table = format_measurements(&run.filtered, 50);
    assert!(!run.filtered.is_empty());
    assert!(table.lines().skip(2).all(|l| l.starts_with(picked.as_str())));
}

#[test]
fn strict_mode_rejects_small_datasets() {
    let mut cfg = config();
    cfg.strict = true;
    let err = run_analysis_with(&cfg, vec![flat_observation(); 4], Vec::new()).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_NO_DATA);

    // The default path keeps going with an untrained model.
    let run = run_analysis_with(&config(), vec![flat_observation(); 4], Vec::new()).unwrap();
    assert!(!run.model.is_trained());
    assert!(run.predictions.is_none());
}

#[test]
fn svd_solver_matches_normal_equation_on_sample() {
    let anchor = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let data = generate_sample(80, 5, anchor).unwrap();

    let normal = run_analysis_with(&config(), data.clone(), Vec::new()).unwrap();
    let mut cfg = config();
    cfg.solver = Solver::Svd;
    let svd = run_analysis_with(&cfg, data.clone(), Vec::new()).unwrap();

    for o in data.iter().take(20) {
        let input = PredictionInput::from(o);
        let a = normal.model.predict(&input).unwrap();
        let b = svd.model.predict(&input).unwrap();
        assert!((a - b).abs() < 1e-3, "normal {a} vs svd {b}");
    }
}

#[test]
fn csv_source_round_trips_through_disk() {
    let anchor = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let data = generate_sample(25, 8, anchor).unwrap();

    let path = std::env::temp_dir().join(format!("sq-pipeline-{}.csv", std::process::id()));
    let file = std::fs::File::create(&path).unwrap();
    write_observations_csv(file, &data).unwrap();

    let mut cfg = config();
    cfg.source = DataSource::Csv(path.clone());
    let run = run_analysis(&cfg).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(run.observations.len(), 25);
    assert!(run.row_errors.is_empty());
    assert!(run.model.is_trained());
}
