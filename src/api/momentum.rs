//! Momentum for flick-scrolling through the distance table
//!
//! Expressed as a pure step function so the owner decides when to run it.
//! Velocity decays exponentially in time and the travel over a step is the
//! integral of that curve, so the result does not depend on how often the
//! scheduler happens to call in.

use crate::utils::config::CastConfig;

/// Coasting state, in table steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Momentum {
    /// Steps per millisecond; positive moves toward longer distances
    pub velocity: f64,
    /// Fractional steps travelled but not yet applied
    pub carry: f64,
}

impl Momentum {
    pub fn new(velocity: f64) -> Self {
        Self { velocity, carry: 0.0 }
    }
}

/// Advance `state` by `elapsed_ms`.
///
/// Returns the whole steps travelled and the remaining momentum, or `None`
/// once the velocity has decayed below the configured minimum.
pub fn step(state: Momentum, elapsed_ms: f64, config: &CastConfig) -> (Option<Momentum>, i64) {
    if !(elapsed_ms > 0.0) {
        return (Some(state), 0);
    }

    let rate = config.momentum_decay_per_frame;
    let frames = elapsed_ms / config.momentum_frame_ms;
    let decay = rate.powf(frames);
    let travel = state.velocity * config.momentum_frame_ms * (1.0 - decay) / -rate.ln();

    let total = state.carry + travel;
    let whole = total.trunc();
    let velocity = state.velocity * decay;

    let next = (velocity.abs() >= config.momentum_min_velocity).then_some(Momentum {
        velocity,
        carry: total - whole,
    });
    (next, whole as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_elapsed_is_noop() {
        let state = Momentum::new(0.5);
        assert_eq!(step(state, 0.0, &CastConfig::default()), (Some(state), 0));
    }

    #[test]
    fn test_decays_to_stop() {
        let config = CastConfig::default();
        let mut state = Some(Momentum::new(0.2));
        let mut travelled = 0;
        let mut frames = 0;
        while let Some(current) = state {
            let (next, steps) = step(current, 16.0, &config);
            travelled += steps;
            state = next;
            frames += 1;
            assert!(frames < 1_000, "momentum never stopped");
        }
        assert!(travelled > 0);
        // Total travel is bounded by v * frame / -ln(rate)
        assert!((travelled as f64) <= 0.2 * 16.0 / -(0.92f64).ln());
    }

    #[test]
    fn test_negative_velocity_moves_down() {
        let (_, steps) = step(Momentum::new(-0.5), 32.0, &CastConfig::default());
        assert!(steps < 0);
    }

    #[test]
    fn test_irregular_frames_match_regular_ones() {
        let config = CastConfig::default();
        let start = Momentum::new(0.3);

        let (one, _) = step(start, 48.0, &config);
        let (a, _) = step(start, 10.0, &config);
        let (b, _) = step(a.unwrap(), 30.0, &config);
        let (c, _) = step(b.unwrap(), 8.0, &config);

        let one = one.unwrap();
        let three = c.unwrap();
        assert!((one.velocity - three.velocity).abs() < 1e-12);
    }
}
