//! Swipe sequence recognition for entering cast mode
//!
//! A qualifying swipe travels upward far enough, fast enough. The configured
//! number of qualifying swipes must land within one window measured from the
//! first swipe of the sequence; anything else starts the count over.

use crate::utils::config::GestureConfig;
use nalgebra::Point2;

/// One completed touch drag in screen coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swipe {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
    pub start_ms: u64,
    pub end_ms: u64,
}

impl Swipe {
    pub fn new(start: Point2<f64>, end: Point2<f64>, start_ms: u64, end_ms: u64) -> Self {
        Self {
            start,
            end,
            start_ms,
            end_ms,
        }
    }

    /// Vertical upward swipe of `travel_px` starting at `start_ms`
    pub fn upward(travel_px: f64, start_ms: u64, duration_ms: u64) -> Self {
        Self::new(
            Point2::new(0.0, travel_px),
            Point2::origin(),
            start_ms,
            start_ms + duration_ms,
        )
    }

    /// Upward travel in pixels; negative for downward swipes
    pub fn upward_travel(&self) -> f64 {
        (self.start - self.end).y
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

/// Result of feeding one swipe to the recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    /// Qualifying swipe; this many are now counted in the current window
    Counted(u8),
    /// Non-qualifying swipe; count dropped to zero
    Reset,
    /// The sequence is complete
    Complete,
}

/// Counts qualifying swipes inside the activation window
#[derive(Debug, Clone)]
pub struct SwipeRecognizer {
    config: GestureConfig,
    count: u8,
    window_start_ms: Option<u64>,
}

impl SwipeRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            count: 0,
            window_start_ms: None,
        }
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn is_qualifying(&self, swipe: &Swipe) -> bool {
        swipe.upward_travel() >= self.config.min_swipe_px
            && swipe.duration_ms() <= self.config.max_swipe_ms
    }

    pub fn observe(&mut self, swipe: &Swipe) -> SwipeOutcome {
        if !self.is_qualifying(swipe) {
            self.reset();
            return SwipeOutcome::Reset;
        }

        match self.window_start_ms {
            Some(start) if swipe.end_ms.saturating_sub(start) <= self.config.window_ms => {
                self.count += 1;
            }
            // No sequence yet, or the window lapsed: this swipe opens a new one
            _ => {
                self.window_start_ms = Some(swipe.end_ms);
                self.count = 1;
            }
        }

        if self.count >= self.config.required_swipes {
            self.reset();
            SwipeOutcome::Complete
        } else {
            SwipeOutcome::Counted(self.count)
        }
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.window_start_ms = None;
    }
}
