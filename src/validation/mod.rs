//! Data validation and arrival checks

pub mod coordinates;
pub mod arrival;

pub use coordinates::{is_valid_coordinate, validate_coordinate, CoordinateError};
pub use arrival::ArrivalEvaluator;
