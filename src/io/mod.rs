//! Input/output helpers.
//!
//! - CSV ingest of drive-test observations (`ingest`)
//! - CSV export in the same layout (`export`)
//! - trained-model JSON files (`model_file`)

pub mod export;
pub mod ingest;
pub mod model_file;

pub use export::*;
pub use ingest::*;
pub use model_file::*;
