//! `signal-quality` library crate.
//!
//! The binary (`sq`) is a thin wrapper around this library so that:
//!
//! - the regression model is testable without spawning processes
//! - the estimator can be embedded by other front-ends
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
