//! Arrival detection against an accuracy-adaptive radius

use crate::algorithms::geodesy;
use crate::core::{Destination, Position, ARRIVAL_MIN_RADIUS_M};

/// Decides whether the device has reached its destination.
///
/// The radius grows with the reported position accuracy so a poor fix
/// cannot keep the user circling a point the receiver cannot resolve.
#[derive(Debug, Clone, Copy)]
pub struct ArrivalEvaluator {
    min_radius_m: f64,
}

impl Default for ArrivalEvaluator {
    fn default() -> Self {
        Self {
            min_radius_m: ARRIVAL_MIN_RADIUS_M,
        }
    }
}

impl ArrivalEvaluator {
    pub fn new(min_radius_m: f64) -> Self {
        Self { min_radius_m }
    }

    pub fn radius_m(&self, accuracy_m: f64) -> f64 {
        self.min_radius_m.max(accuracy_m)
    }

    pub fn has_arrived(&self, position: &Position, destination: &Destination) -> bool {
        let distance = geodesy::distance(&position.coordinate(), &destination.coordinate());
        distance < self.radius_m(position.accuracy_m)
    }
}
