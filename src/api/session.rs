//! Cast session: aim the device, pick a distance, drop a destination
//!
//! `Idle -> Armed(n) -> Active(index) -> Idle`. Leaving `Active` through
//! commit produces a destination; cancel produces nothing. Every transition
//! bumps a generation counter so deferred UI work can tell whether the
//! session it was scheduled for still exists.

use crate::algorithms::{geodesy, DistanceStepTable};
use crate::api::gesture::{Swipe, SwipeOutcome, SwipeRecognizer};
use crate::api::momentum::{self, Momentum};
use crate::core::{Destination, DestinationOrigin, Position};
use crate::utils::config::{CastConfig, CompassConfig};
use thiserror::Error;

/// Why a cast operation was refused. The message is shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CastRefusal {
    #[error("Waiting for a GPS fix")]
    NoPosition,
    #[error("Compass heading unavailable")]
    NoHeading,
    #[error("Cast mode is not active")]
    NotActive,
    /// The heading or position produced a point off the globe
    #[error("Cast target is not a valid coordinate")]
    InvalidTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastPhase {
    Idle,
    /// Counting activation swipes
    Armed { swipes: u8 },
    /// Selecting a distance
    Active { selected_index: usize },
}

/// What a swipe did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeResult {
    /// Swipes are distance input while active, not activation input
    Ignored,
    Armed(u8),
    Reset,
    Activated { selected_index: usize },
    Refused(CastRefusal),
}

/// Identifies one incarnation of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(u64);

#[derive(Debug, Clone)]
pub struct CastSession {
    recognizer: SwipeRecognizer,
    table: DistanceStepTable,
    config: CastConfig,
    phase: CastPhase,
    generation: u64,
    momentum: Option<Momentum>,
    /// Drag travel not yet converted into whole steps (pixels)
    drag_carry_px: f64,
}

impl CastSession {
    pub fn new(config: &CompassConfig) -> Self {
        Self {
            recognizer: SwipeRecognizer::new(config.gesture.clone()),
            table: DistanceStepTable::new(),
            config: config.cast.clone(),
            phase: CastPhase::Idle,
            generation: 0,
            momentum: None,
            drag_carry_px: 0.0,
        }
    }

    pub fn phase(&self) -> CastPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, CastPhase::Active { .. })
    }

    pub fn table(&self) -> &DistanceStepTable {
        &self.table
    }

    pub fn selected_index(&self) -> Option<usize> {
        match self.phase {
            CastPhase::Active { selected_index } => Some(selected_index),
            _ => None,
        }
    }

    pub fn selected_distance_m(&self) -> Option<u32> {
        self.selected_index().and_then(|index| self.table.get(index))
    }

    pub fn token(&self) -> SessionToken {
        SessionToken(self.generation)
    }

    /// Whether work scheduled under `token` may still touch the session
    pub fn is_current(&self, token: SessionToken) -> bool {
        token.0 == self.generation
    }

    fn transition(&mut self, phase: CastPhase) {
        self.phase = phase;
        self.generation += 1;
        self.momentum = None;
        self.drag_carry_px = 0.0;
    }

    /// Feed a completed swipe. `position` is the current fix, if any.
    pub fn on_swipe(&mut self, swipe: &Swipe, position: Option<&Position>) -> SwipeResult {
        if self.is_active() {
            return SwipeResult::Ignored;
        }

        match self.recognizer.observe(swipe) {
            SwipeOutcome::Reset => {
                self.phase = CastPhase::Idle;
                SwipeResult::Reset
            }
            SwipeOutcome::Counted(swipes) => {
                self.phase = CastPhase::Armed { swipes };
                SwipeResult::Armed(swipes)
            }
            SwipeOutcome::Complete => {
                if position.is_none() {
                    tracing::info!("cast activation refused: no position fix");
                    self.phase = CastPhase::Idle;
                    return SwipeResult::Refused(CastRefusal::NoPosition);
                }
                let selected_index = self.table.nearest_index(self.config.default_distance_m);
                self.transition(CastPhase::Active { selected_index });
                tracing::debug!(selected_index, "cast session active");
                SwipeResult::Activated { selected_index }
            }
        }
    }

    /// Move the cursor to `index`, clamped to the table. Returns the new index.
    pub fn set_index(&mut self, index: i64) -> Option<usize> {
        let CastPhase::Active { selected_index } = &mut self.phase else {
            return None;
        };
        *selected_index = self.table.clamp_index(index);
        Some(*selected_index)
    }

    pub fn step_by(&mut self, steps: i64) -> Option<usize> {
        let current = self.selected_index()? as i64;
        self.set_index(current.saturating_add(steps))
    }

    /// Apply vertical drag movement. Upward drags (negative `delta_y_px`)
    /// select longer distances.
    pub fn drag(&mut self, delta_y_px: f64) -> Option<usize> {
        if !self.is_active() || !delta_y_px.is_finite() {
            return None;
        }
        self.momentum = None;

        let travel = self.drag_carry_px - delta_y_px;
        let steps = (travel / self.config.drag_px_per_step).trunc();
        self.drag_carry_px = travel - steps * self.config.drag_px_per_step;
        self.step_by(steps as i64)
    }

    /// Finger lifted while moving at `velocity_y_px_per_ms`; start coasting
    pub fn release(&mut self, velocity_y_px_per_ms: f64) {
        if !self.is_active() || !velocity_y_px_per_ms.is_finite() {
            return;
        }
        self.drag_carry_px = 0.0;
        let velocity = -velocity_y_px_per_ms / self.config.drag_px_per_step;
        self.momentum = (velocity.abs() >= self.config.momentum_min_velocity)
            .then(|| Momentum::new(velocity));
    }

    pub fn is_coasting(&self) -> bool {
        self.momentum.is_some()
    }

    /// Run one scheduled momentum step. Returns whether the caller should
    /// schedule another.
    pub fn tick(&mut self, elapsed_ms: f64) -> bool {
        // The session may have ended after this step was scheduled
        if !self.is_active() {
            self.momentum = None;
            return false;
        }
        let Some(state) = self.momentum else {
            return false;
        };

        let (next, steps) = momentum::step(state, elapsed_ms, &self.config);
        if steps != 0 {
            let before = self.selected_index();
            let after = self.step_by(steps);
            // Hitting either end of the table stops the coast
            if before == after {
                self.momentum = None;
                return false;
            }
        }
        self.momentum = next;
        self.momentum.is_some()
    }

    /// Project a destination along `heading` at the selected distance.
    /// Refusals leave the session untouched.
    pub fn commit(
        &mut self,
        heading: Option<f64>,
        position: Option<&Position>,
    ) -> Result<Destination, CastRefusal> {
        let distance_m = self.selected_distance_m().ok_or(CastRefusal::NotActive)?;
        let heading = heading.ok_or(CastRefusal::NoHeading)?;
        let position = position.ok_or(CastRefusal::NoPosition)?;

        let target = geodesy::project(&position.coordinate(), heading, distance_m as f64);
        let destination = Destination::new(target, DestinationOrigin::Cast, distance_m as f64)
            .map_err(|e| {
                tracing::warn!(error = %e, heading, "cast projection rejected");
                CastRefusal::InvalidTarget
            })?;

        self.recognizer.reset();
        self.transition(CastPhase::Idle);
        tracing::info!(heading, distance_m, lat = target.lat, lng = target.lng, "cast committed");
        Ok(destination)
    }

    /// Abandon the session from any non-idle phase. Returns whether anything
    /// was cancelled.
    pub fn cancel(&mut self) -> bool {
        self.recognizer.reset();
        if self.phase == CastPhase::Idle {
            return false;
        }
        self.transition(CastPhase::Idle);
        tracing::debug!("cast session cancelled");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Coordinate;

    fn position() -> Position {
        Position::new(40.0, -74.0, 5.0).unwrap()
    }

    fn activate(session: &mut CastSession) -> usize {
        let fix = position();
        session.on_swipe(&Swipe::upward(80.0, 0, 100), Some(&fix));
        session.on_swipe(&Swipe::upward(80.0, 500, 100), Some(&fix));
        match session.on_swipe(&Swipe::upward(80.0, 1_000, 100), Some(&fix)) {
            SwipeResult::Activated { selected_index } => selected_index,
            other => panic!("expected activation, got {:?}", other),
        }
    }

    #[test]
    fn test_three_swipes_activate_at_default_distance() {
        let mut session = CastSession::new(&CompassConfig::default());
        let fix = position();
        assert_eq!(session.on_swipe(&Swipe::upward(80.0, 0, 100), Some(&fix)), SwipeResult::Armed(1));
        assert_eq!(session.phase(), CastPhase::Armed { swipes: 1 });
        assert_eq!(session.on_swipe(&Swipe::upward(80.0, 500, 100), Some(&fix)), SwipeResult::Armed(2));

        let result = session.on_swipe(&Swipe::upward(80.0, 1_000, 100), Some(&fix));
        assert!(matches!(result, SwipeResult::Activated { .. }));
        assert!(session.is_active());
        assert_eq!(session.selected_distance_m(), Some(100));
    }

    #[test]
    fn test_late_swipe_does_not_activate() {
        let mut session = CastSession::new(&CompassConfig::default());
        let fix = position();
        session.on_swipe(&Swipe::upward(80.0, 0, 100), Some(&fix));
        session.on_swipe(&Swipe::upward(80.0, 1_000, 100), Some(&fix));
        // Ends 2100 ms after the first swipe ended
        let result = session.on_swipe(&Swipe::upward(80.0, 2_100, 100), Some(&fix));
        assert_eq!(result, SwipeResult::Armed(1));
        assert!(!session.is_active());
    }

    #[test]
    fn test_activation_requires_position() {
        let mut session = CastSession::new(&CompassConfig::default());
        session.on_swipe(&Swipe::upward(80.0, 0, 100), None);
        session.on_swipe(&Swipe::upward(80.0, 300, 100), None);
        let result = session.on_swipe(&Swipe::upward(80.0, 600, 100), None);
        assert_eq!(result, SwipeResult::Refused(CastRefusal::NoPosition));
        assert_eq!(session.phase(), CastPhase::Idle);
        assert_eq!(CastRefusal::NoPosition.to_string(), "Waiting for a GPS fix");
    }

    #[test]
    fn test_swipes_ignored_while_active() {
        let mut session = CastSession::new(&CompassConfig::default());
        activate(&mut session);
        let fix = position();
        assert_eq!(session.on_swipe(&Swipe::upward(5.0, 2_000, 100), Some(&fix)), SwipeResult::Ignored);
        assert!(session.is_active());
    }

    #[test]
    fn test_selection_clamps() {
        let mut session = CastSession::new(&CompassConfig::default());
        activate(&mut session);
        assert_eq!(session.set_index(-10), Some(0));
        assert_eq!(session.step_by(-1), Some(0));
        let last = session.table().last_index();
        assert_eq!(session.set_index(10_000), Some(last));
        assert_eq!(session.step_by(3), Some(last));
        assert_eq!(session.selected_distance_m(), Some(100_000));
    }

    #[test]
    fn test_selection_requires_active() {
        let mut session = CastSession::new(&CompassConfig::default());
        assert_eq!(session.set_index(3), None);
        assert_eq!(session.drag(-100.0), None);
    }

    #[test]
    fn test_drag_converts_pixels_to_steps() {
        let mut session = CastSession::new(&CompassConfig::default());
        let start = activate(&mut session);
        // 12 px per step: 30 px up is two steps with 6 px carried
        assert_eq!(session.drag(-30.0), Some(start + 2));
        assert_eq!(session.drag(-6.0), Some(start + 3));
        assert_eq!(session.drag(24.0), Some(start + 1));
    }

    #[test]
    fn test_momentum_moves_and_stops() {
        let mut session = CastSession::new(&CompassConfig::default());
        let start = activate(&mut session);
        session.release(-3.0);
        assert!(session.is_coasting());

        let mut frames = 0;
        while session.tick(16.0) {
            frames += 1;
            assert!(frames < 1_000);
        }
        assert!(session.selected_index().unwrap() > start);
        assert!(!session.is_coasting());
    }

    #[test]
    fn test_tick_after_cancel_exits_silently() {
        let mut session = CastSession::new(&CompassConfig::default());
        activate(&mut session);
        session.release(-3.0);
        assert!(session.cancel());
        assert!(!session.tick(16.0));
        assert_eq!(session.selected_index(), None);
        assert!(!session.is_coasting());
    }

    #[test]
    fn test_commit_projects_destination() {
        let mut session = CastSession::new(&CompassConfig::default());
        activate(&mut session);
        let fix = position();

        let destination = session.commit(Some(90.0), Some(&fix)).unwrap();
        assert_eq!(destination.origin, DestinationOrigin::Cast);
        assert_eq!(destination.initial_distance_meters, 100.0);

        let origin = fix.coordinate();
        let target = Coordinate::new(destination.lat, destination.lng).unwrap();
        assert!((geodesy::distance(&origin, &target) - 100.0).abs() < 0.01);
        assert!((geodesy::bearing(&origin, &target) - 90.0).abs() < 0.01);
        assert_eq!(session.phase(), CastPhase::Idle);
    }

    #[test]
    fn test_commit_refusals_keep_state() {
        let mut session = CastSession::new(&CompassConfig::default());
        assert_eq!(session.commit(Some(0.0), Some(&position())), Err(CastRefusal::NotActive));

        let index = activate(&mut session);
        assert_eq!(session.commit(None, Some(&position())), Err(CastRefusal::NoHeading));
        assert_eq!(session.commit(Some(10.0), None), Err(CastRefusal::NoPosition));
        assert_eq!(session.phase(), CastPhase::Active { selected_index: index });
    }

    #[test]
    fn test_commit_rejects_non_finite_heading() {
        let mut session = CastSession::new(&CompassConfig::default());
        let index = activate(&mut session);
        let token = session.token();

        assert_eq!(
            session.commit(Some(f64::NAN), Some(&position())),
            Err(CastRefusal::InvalidTarget)
        );
        assert_eq!(session.phase(), CastPhase::Active { selected_index: index });
        assert!(session.is_current(token));
    }

    #[test]
    fn test_tokens_expire_on_transition() {
        let mut session = CastSession::new(&CompassConfig::default());
        activate(&mut session);
        let token = session.token();
        assert!(session.is_current(token));

        session.commit(Some(0.0), Some(&position())).unwrap();
        assert!(!session.is_current(token));
    }

    #[test]
    fn test_cancel_from_armed() {
        let mut session = CastSession::new(&CompassConfig::default());
        session.on_swipe(&Swipe::upward(80.0, 0, 100), Some(&position()));
        assert!(session.cancel());
        assert_eq!(session.phase(), CastPhase::Idle);
        assert!(!session.cancel());
    }
}
