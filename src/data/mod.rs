//! Observation sources other than user files.

pub mod sample;

pub use sample::*;
