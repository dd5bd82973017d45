//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - field observations and the network-type score table (`Observation`, `NetworkType`)
//! - the raw tuple the predictor scores (`PredictionInput`)
//! - run configuration (`RunConfig`, `Solver`, `SingularPolicy`)

pub mod types;

pub use types::*;
