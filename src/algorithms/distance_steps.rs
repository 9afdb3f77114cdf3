//! Discrete cast distances
//!
//! Resolution is finest near the device and coarsens with magnitude, so a
//! single step is always a meaningful change relative to the distance.

/// (band start, band end, step) in meters. Each band emits values in
/// `(start, end]`; the first band also emits its start.
const DISTANCE_BANDS: [(u32, u32, u32); 6] = [
    (10, 100, 5),
    (100, 500, 25),
    (500, 1_000, 50),
    (1_000, 5_000, 250),
    (5_000, 20_000, 1_000),
    (20_000, 100_000, 5_000),
];

/// Ordered, strictly increasing table of candidate cast distances (m)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceStepTable {
    steps: Vec<u32>,
}

impl Default for DistanceStepTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DistanceStepTable {
    /// Generate the table from the band definitions
    pub fn new() -> Self {
        let mut steps = vec![DISTANCE_BANDS[0].0];
        for (start, end, step) in DISTANCE_BANDS {
            let mut value = start + step;
            while value <= end {
                steps.push(value);
                value += step;
            }
        }
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        self.steps.get(index).copied()
    }

    pub fn values(&self) -> &[u32] {
        &self.steps
    }

    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Clamp a signed cursor into the table bounds
    pub fn clamp_index(&self, index: i64) -> usize {
        index.clamp(0, self.last_index() as i64) as usize
    }

    /// Index of the entry closest to `target_m`; ties go to the lower index
    pub fn nearest_index(&self, target_m: f64) -> usize {
        let upper = self.steps.partition_point(|&value| (value as f64) < target_m);
        if upper == 0 {
            return 0;
        }
        if upper >= self.steps.len() {
            return self.last_index();
        }

        let below = self.steps[upper - 1] as f64;
        let above = self.steps[upper] as f64;
        if target_m - below <= above - target_m {
            upper - 1
        } else {
            upper
        }
    }
}
