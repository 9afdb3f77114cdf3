//! Compass heading fusion across two orientation channels
//!
//! The absolute channel reports north-referenced readings and wins outright:
//! once it has produced one reading the standard channel is ignored until
//! teardown. The standard channel is ranked by what each reading carries:
//! - a platform-fused compass value (already clockwise)
//! - an angle flagged as north-referenced
//! - a bare relative angle with an arbitrary zero point
//!
//! Raw angles are counter-clockwise; every tier except the fused compass
//! value converts with `(360 - alpha) mod 360`.

use crate::algorithms::geodesy::normalize_degrees;
use crate::hardware::{OrientationChannel, OrientationReading};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trust level of the reported heading, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeadingTier {
    Unavailable,
    /// Zero point is arbitrary; keeps the display moving only
    RelativeUnreliable,
    /// North-referenced angle delivered on the standard channel
    RelativeAbsolute,
    /// Platform-fused compass value
    DeviceFused,
    /// Dedicated north-referenced channel
    Absolute,
}

impl fmt::Display for HeadingTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeadingTier::Unavailable => "unavailable",
            HeadingTier::RelativeUnreliable => "relative-unreliable",
            HeadingTier::RelativeAbsolute => "relative-absolute",
            HeadingTier::DeviceFused => "device-fused",
            HeadingTier::Absolute => "absolute",
        };
        write!(f, "{}", name)
    }
}

/// Fused heading as seen by consumers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadingReading {
    /// Clockwise from north in [0, 360); absent when unavailable
    pub degrees: Option<f64>,
    pub tier: HeadingTier,
}

impl HeadingReading {
    pub fn unavailable() -> Self {
        Self {
            degrees: None,
            tier: HeadingTier::Unavailable,
        }
    }
}

/// Convert a counter-clockwise raw angle to clockwise compass degrees
pub fn compass_from_alpha(alpha: f64) -> f64 {
    normalize_degrees(360.0 - alpha)
}

/// Two-channel heading state machine
#[derive(Debug, Clone)]
pub struct HeadingFusion {
    degrees: Option<f64>,
    tier: HeadingTier,
    /// Set by the first absolute-channel reading; mutes the standard channel
    absolute_locked: bool,
    /// Highest tier seen on the standard channel since the last teardown
    best_standard_tier: HeadingTier,
    last_update_ms: Option<u64>,
    absolute_registered: bool,
    standard_registered: bool,
}

impl Default for HeadingFusion {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadingFusion {
    pub fn new() -> Self {
        Self {
            degrees: None,
            tier: HeadingTier::Unavailable,
            absolute_locked: false,
            best_standard_tier: HeadingTier::Unavailable,
            last_update_ms: None,
            absolute_registered: false,
            standard_registered: false,
        }
    }

    /// Start accepting readings from a channel
    pub fn register(&mut self, channel: OrientationChannel) {
        match channel {
            OrientationChannel::Absolute => self.absolute_registered = true,
            OrientationChannel::Standard => self.standard_registered = true,
        }
    }

    pub fn is_registered(&self, channel: OrientationChannel) -> bool {
        match channel {
            OrientationChannel::Absolute => self.absolute_registered,
            OrientationChannel::Standard => self.standard_registered,
        }
    }

    pub fn reading(&self) -> HeadingReading {
        HeadingReading {
            degrees: self.degrees,
            tier: self.tier,
        }
    }

    pub fn heading(&self) -> Option<f64> {
        self.degrees
    }

    pub fn tier(&self) -> HeadingTier {
        self.tier
    }

    /// True once the absolute channel has taken over
    pub fn is_absolute_locked(&self) -> bool {
        self.absolute_locked
    }

    /// True when a heading exists but no reading was accepted for `max_age_ms`
    pub fn is_stale(&self, now_ms: u64, max_age_ms: u64) -> bool {
        match self.last_update_ms {
            Some(updated) => now_ms.saturating_sub(updated) > max_age_ms,
            None => false,
        }
    }

    /// Feed one reading. Returns true when the fused heading changed.
    pub fn ingest(&mut self, reading: &OrientationReading) -> bool {
        if !self.is_registered(reading.channel) {
            return false;
        }

        let candidate = match reading.channel {
            OrientationChannel::Absolute => Self::from_absolute_channel(reading),
            OrientationChannel::Standard => {
                if self.absolute_locked {
                    return false;
                }
                Self::from_standard_channel(reading)
            }
        };

        // Missing values (sensor calibrating) keep the previous heading
        let Some((degrees, tier)) = candidate else {
            return false;
        };

        match reading.channel {
            OrientationChannel::Absolute => self.absolute_locked = true,
            OrientationChannel::Standard => {
                // A lower-tier reading would swap in a different zero point
                if tier < self.best_standard_tier {
                    return false;
                }
                self.best_standard_tier = tier;
            }
        }

        if tier != self.tier {
            tracing::debug!(from = %self.tier, to = %tier, "heading tier changed");
        }
        let changed = self.degrees != Some(degrees) || self.tier != tier;
        self.degrees = Some(degrees);
        self.tier = tier;
        self.last_update_ms = Some(reading.timestamp_ms);
        changed
    }

    fn from_absolute_channel(reading: &OrientationReading) -> Option<(f64, HeadingTier)> {
        let alpha = reading.alpha.filter(|value| value.is_finite())?;
        Some((compass_from_alpha(alpha), HeadingTier::Absolute))
    }

    fn from_standard_channel(reading: &OrientationReading) -> Option<(f64, HeadingTier)> {
        if let Some(compass) = reading.compass_heading.filter(|value| value.is_finite()) {
            return Some((normalize_degrees(compass), HeadingTier::DeviceFused));
        }

        let alpha = reading.alpha.filter(|value| value.is_finite())?;
        let tier = if reading.absolute {
            HeadingTier::RelativeAbsolute
        } else {
            HeadingTier::RelativeUnreliable
        };
        Some((compass_from_alpha(alpha), tier))
    }

    /// Unregister both channels and forget everything received
    pub fn teardown(&mut self) {
        tracing::debug!("heading fusion torn down");
        *self = Self::new();
    }
}
