//! Feature encoding and the regression model.
//!
//! The fitting code in `crate::fit` only ever sees encoded feature rows, so the
//! encoding here is the single place that defines the model's input layout.

pub mod features;
pub mod predictor;

pub use features::*;
pub use predictor::*;
