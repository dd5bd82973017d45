//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initializes logging
//! - parses CLI arguments
//! - runs the analyze pipeline
//! - prints reports

use std::io;

use chrono::Utc;
use clap::Parser;
use log::{debug, info, warn};

use crate::cli::{AnalyzeArgs, Command, DataArgs, ModelArgs, PredictArgs, SampleArgs};
use crate::domain::{
    DataSource, ObservationFilter, PredictionInput, RunConfig, SingularMode, SingularPolicy,
};
use crate::error::AppError;
use crate::io::{ModelFile, read_model_json, write_model_json};
use crate::models::RegressionModel;

pub mod pipeline;

/// Entry point for the `sq` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` may carry RUST_LOG as well as SQ_* defaults, so load it first.
    dotenvy::dotenv().ok();
    env_logger::init();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Analyze(args) => handle_analyze(args),
        Command::Predict(args) => handle_predict(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    debug!("run config: {config:?}");
    let run = pipeline::run_analysis(&config)?;

    println!("{}", crate::report::format_run_summary(&run, &config));
    print!(
        "{}",
        crate::report::format_predictions(run.predictions.as_deref())
    );
    println!();
    print!(
        "{}",
        crate::report::format_measurements(&run.filtered, args.rows)
    );

    if let Some(path) = &args.save_model {
        let file =
            ModelFile::from_model(&run.model, &run.outcome, run.observations.len(), Utc::now())?;
        write_model_json(path, &file)?;
        info!("wrote model to {}", path.display());
    }
    Ok(())
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let model = match &args.model_file {
        Some(path) => {
            let file = read_model_json(path)?;
            if file.degraded {
                warn!("{} holds a degraded model", path.display());
            }
            file.into_model()
        }
        None => train_for_prediction(&args)?,
    };

    let input = PredictionInput::new(args.strength, args.lat, args.lon, args.network.as_str())
        .with_throughput(args.throughput)
        .with_latency(args.latency);
    let predicted = if args.model.strict {
        Some(model.predict_strict(&input)?)
    } else {
        model.predict(&input)
    };

    println!("{}", crate::report::format_single_prediction(&input, predicted));
    Ok(())
}

fn train_for_prediction(args: &PredictArgs) -> Result<RegressionModel, AppError> {
    let config = RunConfig {
        source: source_from_args(&args.data),
        filter: ObservationFilter::default(),
        solver: args.model.solver,
        singular_policy: singular_policy_from_args(&args.model),
        strict: args.model.strict,
        top_n: 0,
    };
    Ok(pipeline::run_analysis(&config)?.model)
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let sample = crate::data::generate_sample(args.count, args.seed, Utc::now())?;
    crate::io::write_observations_csv(io::stdout().lock(), &sample)
}

pub fn run_config_from_args(args: &AnalyzeArgs) -> RunConfig {
    RunConfig {
        source: source_from_args(&args.data),
        filter: ObservationFilter {
            locality: args.locality.clone(),
            network_type: args.network.clone(),
            min_signal_strength: args.min_strength,
            max_latency: args.max_latency,
        },
        solver: args.model.solver,
        singular_policy: singular_policy_from_args(&args.model),
        strict: args.model.strict,
        top_n: args.top,
    }
}

fn source_from_args(args: &DataArgs) -> DataSource {
    match &args.csv {
        Some(path) => DataSource::Csv(path.clone()),
        None => DataSource::Sample {
            count: args.sample_count,
            seed: args.seed,
        },
    }
}

fn singular_policy_from_args(args: &ModelArgs) -> SingularPolicy {
    match args.singular {
        SingularMode::Identity => SingularPolicy::Identity,
        SingularMode::Ridge => SingularPolicy::Ridge {
            lambda: args.ridge_lambda,
        },
    }
}

/// Rewrite argv so `sq` defaults to `sq analyze`.
///
/// Rules:
/// - `sq`                      -> `sq analyze`
/// - `sq --csv data.csv ...`   -> `sq analyze --csv data.csv ...`
/// - `sq --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("analyze".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "analyze" | "predict" | "sample");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "analyze flags".
    if arg1.starts_with('-') {
        argv.insert(1, "analyze".to_string());
        return argv;
    }

    argv
}
