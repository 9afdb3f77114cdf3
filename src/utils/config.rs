use crate::core::{ARRIVAL_MIN_RADIUS_M, DESTINATION_KEY};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Compass-wide configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompassConfig {
    /// Arrival radius floor, applied when the position fix is better than this (meters)
    pub arrival_min_radius_m: f64,
    /// Swipe recognition for starting a cast
    pub gesture: GestureConfig,
    /// Distance selection while casting
    pub cast: CastConfig,
    /// Heading fusion settings
    pub heading: HeadingConfig,
    /// Persistence settings
    pub storage: StorageConfig,
}

/// Thresholds for the activation swipe sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Minimum upward travel of a qualifying swipe (pixels)
    pub min_swipe_px: f64,
    /// Maximum duration of a qualifying swipe (milliseconds)
    pub max_swipe_ms: u64,
    /// Maximum time between the first and latest swipe of a sequence (milliseconds)
    pub window_ms: u64,
    /// Swipes needed to activate
    pub required_swipes: u8,
}

/// Distance selection tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastConfig {
    /// Distance the selection starts at (meters)
    pub default_distance_m: f64,
    /// Vertical drag travel per table step (pixels)
    pub drag_px_per_step: f64,
    /// Velocity multiplier applied once per momentum frame
    pub momentum_decay_per_frame: f64,
    /// Nominal frame length the decay is expressed against (milliseconds)
    pub momentum_frame_ms: f64,
    /// Momentum stops below this speed (steps per millisecond)
    pub momentum_min_velocity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingConfig {
    /// Age after which the fused heading is flagged stale (milliseconds)
    pub stale_after_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Key the destination record is stored under
    pub destination_key: String,
}

impl Default for CompassConfig {
    fn default() -> Self {
        Self {
            arrival_min_radius_m: ARRIVAL_MIN_RADIUS_M,
            gesture: GestureConfig::default(),
            cast: CastConfig::default(),
            heading: HeadingConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_swipe_px: 50.0,
            max_swipe_ms: 500,
            window_ms: 2_000,
            required_swipes: 3,
        }
    }
}

impl Default for CastConfig {
    fn default() -> Self {
        Self {
            default_distance_m: 100.0,
            drag_px_per_step: 12.0,
            momentum_decay_per_frame: 0.92,
            momentum_frame_ms: 16.0,
            momentum_min_velocity: 0.002,
        }
    }
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self { stale_after_ms: 3_000 }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            destination_key: DESTINATION_KEY.to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Invalid parameter value
    #[error("Invalid {parameter} = {value}: {reason}")]
    InvalidParameter { parameter: String, value: String, reason: String },
    /// Configuration file I/O error
    #[error("Config I/O error: {message}")]
    IoError { message: String },
    /// JSON serialization/deserialization error
    #[error("Config serialization error: {message}")]
    SerializationError { message: String },
}

fn invalid(parameter: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl CompassConfig {
    /// Check every parameter, returning the first violation
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.arrival_min_radius_m.is_finite() || self.arrival_min_radius_m <= 0.0 {
            return Err(invalid("arrival_min_radius_m", self.arrival_min_radius_m, "must be positive"));
        }

        let gesture = &self.gesture;
        if !gesture.min_swipe_px.is_finite() || gesture.min_swipe_px <= 0.0 {
            return Err(invalid("gesture.min_swipe_px", gesture.min_swipe_px, "must be positive"));
        }
        if gesture.max_swipe_ms == 0 {
            return Err(invalid("gesture.max_swipe_ms", gesture.max_swipe_ms, "must be positive"));
        }
        if gesture.window_ms < gesture.max_swipe_ms {
            return Err(invalid(
                "gesture.window_ms",
                gesture.window_ms,
                "must be at least gesture.max_swipe_ms",
            ));
        }
        if gesture.required_swipes == 0 {
            return Err(invalid("gesture.required_swipes", gesture.required_swipes, "must be at least 1"));
        }

        let cast = &self.cast;
        if !cast.default_distance_m.is_finite() || cast.default_distance_m <= 0.0 {
            return Err(invalid("cast.default_distance_m", cast.default_distance_m, "must be positive"));
        }
        if !cast.drag_px_per_step.is_finite() || cast.drag_px_per_step <= 0.0 {
            return Err(invalid("cast.drag_px_per_step", cast.drag_px_per_step, "must be positive"));
        }
        if !(cast.momentum_decay_per_frame > 0.0 && cast.momentum_decay_per_frame < 1.0) {
            return Err(invalid(
                "cast.momentum_decay_per_frame",
                cast.momentum_decay_per_frame,
                "must be between 0 and 1 exclusive",
            ));
        }
        if !cast.momentum_frame_ms.is_finite() || cast.momentum_frame_ms <= 0.0 {
            return Err(invalid("cast.momentum_frame_ms", cast.momentum_frame_ms, "must be positive"));
        }
        if !cast.momentum_min_velocity.is_finite() || cast.momentum_min_velocity <= 0.0 {
            return Err(invalid("cast.momentum_min_velocity", cast.momentum_min_velocity, "must be positive"));
        }

        if self.storage.destination_key.trim().is_empty() {
            return Err(invalid("storage.destination_key", "\"\"", "must not be empty"));
        }
        Ok(())
    }
}

/// Loads, validates and saves the configuration file
pub struct ConfigurationManager {
    config: CompassConfig,
    /// Configuration file path
    config_file_path: Option<String>,
    /// Whether configuration has been modified
    is_modified: bool,
}

impl Default for ConfigurationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationManager {
    /// Create a configuration manager with default settings
    pub fn new() -> Self {
        Self {
            config: CompassConfig::default(),
            config_file_path: None,
            is_modified: false,
        }
    }

    /// Create configuration manager and load from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn config(&self) -> &CompassConfig {
        &self.config
    }

    /// Replace the configuration after validating it
    pub fn update_config(&mut self, config: CompassConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;

        let config: CompassConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to parse config file '{}': {}", path_str, e),
            })?;
        config.validate()?;

        tracing::info!(path = %path_str, "loaded configuration");
        self.config = config;
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = serde_json::to_string_pretty(&self.config).map_err(|e| {
            ConfigError::SerializationError {
                message: format!("Failed to serialize config: {}", e),
            }
        })?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })?;

        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save to the currently loaded file path
    pub fn save(&mut self) -> Result<(), ConfigError> {
        match self.config_file_path.clone() {
            Some(path) => self.save_to_file(path),
            None => Err(ConfigError::IoError {
                message: "No file path set for saving configuration".to_string(),
            }),
        }
    }

    /// Check if configuration has been modified since last save
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    /// Update the cast default distance with validation, returning the old value
    pub fn set_default_cast_distance(&mut self, distance_m: f64) -> Result<f64, ConfigError> {
        let mut config = self.config.clone();
        let old_value = config.cast.default_distance_m;
        config.cast.default_distance_m = distance_m;
        self.update_config(config)?;
        Ok(old_value)
    }
}
