//! Core navigation algorithms

pub mod geodesy;
pub mod distance_steps;

pub use distance_steps::DistanceStepTable;
