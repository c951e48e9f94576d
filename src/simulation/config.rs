//! Simulation configuration
//!
//! Every tunable constant lives in [`SimConfig`]. Values come from the
//! defaults below, an optional TOML file, and command-line overrides, and are
//! validated once before the simulation starts.

use std::path::Path;

use serde::Deserialize;

use super::error::ConfigError;

/// Shortest green phase the adaptive timing may produce (seconds)
pub const DEFAULT_MIN_GREEN: f32 = 4.0;
/// Longest green phase the adaptive timing may produce (seconds)
pub const DEFAULT_MAX_GREEN: f32 = 12.0;
/// Green time granted before any queue bonus (seconds)
pub const DEFAULT_BASE_GREEN: f32 = 4.0;
/// Waiting vehicles per extra second of green
pub const DEFAULT_DIVISOR: u32 = 2;
pub const DEFAULT_YELLOW_DURATION: f32 = 2.0;
/// Distance of the stop line from the intersection centre
pub const DEFAULT_STOP_LINE_OFFSET: f32 = 20.0;
/// Speed multiplier for a vehicle approaching a yellow light
pub const DEFAULT_DECELERATION_FACTOR: f32 = 0.6;
pub const DEFAULT_CONGESTION_THRESHOLD: u32 = 12;
pub const DEFAULT_CONGESTION_MAX_GREEN: f32 = 6.0;
/// Maximum age of a count-feed reading before it is ignored (seconds)
pub const DEFAULT_FEED_FRESHNESS: f32 = 5.0;
/// Nominal vehicle speed (units per second)
pub const DEFAULT_VEHICLE_SPEED: f32 = 10.0;
pub const DEFAULT_SPAWN_DISTANCE: f32 = 60.0;
pub const DEFAULT_EXIT_DISTANCE: f32 = 60.0;
pub const DEFAULT_LANE_OFFSET: f32 = 10.0;
pub const DEFAULT_SPAWN_INTERVAL: f32 = 1.0;
pub const DEFAULT_EMERGENCY_PROBABILITY: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub min_green: f32,
    pub max_green: f32,
    pub base_green: f32,
    pub divisor: u32,
    pub yellow_duration: f32,
    pub stop_line_offset: f32,
    #[serde(alias = "emergency_deceleration_factor")]
    pub deceleration_factor: f32,
    pub congestion_threshold: u32,
    pub congestion_max_green: f32,
    pub feed_freshness: f32,
    pub vehicle_speed: f32,
    pub spawn_distance: f32,
    pub exit_distance: f32,
    pub lane_offset: f32,
    pub spawn_interval: f32,
    pub emergency_probability: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            min_green: DEFAULT_MIN_GREEN,
            max_green: DEFAULT_MAX_GREEN,
            base_green: DEFAULT_BASE_GREEN,
            divisor: DEFAULT_DIVISOR,
            yellow_duration: DEFAULT_YELLOW_DURATION,
            stop_line_offset: DEFAULT_STOP_LINE_OFFSET,
            deceleration_factor: DEFAULT_DECELERATION_FACTOR,
            congestion_threshold: DEFAULT_CONGESTION_THRESHOLD,
            congestion_max_green: DEFAULT_CONGESTION_MAX_GREEN,
            feed_freshness: DEFAULT_FEED_FRESHNESS,
            vehicle_speed: DEFAULT_VEHICLE_SPEED,
            spawn_distance: DEFAULT_SPAWN_DISTANCE,
            exit_distance: DEFAULT_EXIT_DISTANCE,
            lane_offset: DEFAULT_LANE_OFFSET,
            spawn_interval: DEFAULT_SPAWN_INTERVAL,
            emergency_probability: DEFAULT_EMERGENCY_PROBABILITY,
        }
    }
}

impl SimConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse {
            file: "<inline>".into(),
            detail: e.to_string(),
        })
    }

    /// Load a TOML file. The result is not yet validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        toml::from_str(&source).map_err(|e| ConfigError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Check every constant. Must pass before the first tick runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("min_green", self.min_green),
            ("max_green", self.max_green),
            ("base_green", self.base_green),
            ("yellow_duration", self.yellow_duration),
            ("vehicle_speed", self.vehicle_speed),
            ("spawn_distance", self.spawn_distance),
            ("exit_distance", self.exit_distance),
            ("spawn_interval", self.spawn_interval),
            ("congestion_max_green", self.congestion_max_green),
        ];
        for (field, value) in positive {
            // NaN fails this check too
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        let non_negative = [
            ("stop_line_offset", self.stop_line_offset),
            ("lane_offset", self.lane_offset),
            ("feed_freshness", self.feed_freshness),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if self.min_green > self.max_green {
            return Err(ConfigError::GreenBounds {
                min: self.min_green,
                max: self.max_green,
            });
        }
        if self.divisor == 0 {
            return Err(ConfigError::ZeroDivisor);
        }
        if !(self.deceleration_factor > 0.0 && self.deceleration_factor <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "deceleration_factor",
                range: "(0, 1]",
                value: self.deceleration_factor,
            });
        }
        if !(0.0..=1.0).contains(&self.emergency_probability) {
            return Err(ConfigError::OutOfRange {
                field: "emergency_probability",
                range: "[0, 1]",
                value: self.emergency_probability as f32,
            });
        }
        if self.spawn_distance <= self.stop_line_offset {
            return Err(ConfigError::SpawnInsideStopLine {
                spawn: self.spawn_distance,
                stop_line: self.stop_line_offset,
            });
        }
        if self.congestion_max_green < self.min_green {
            return Err(ConfigError::CongestionCapBelowMin {
                cap: self.congestion_max_green,
                min: self.min_green,
            });
        }
        Ok(())
    }
}
