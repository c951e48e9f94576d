//! Error types for the intersection simulation
//!
//! Configuration problems are caught before the first tick. Invariant
//! violations mean the scheduling logic itself is wrong and are surfaced
//! to the caller as-is.

use std::path::PathBuf;

use thiserror::Error;

use super::types::Approach;

/// Rejected configuration values, or a configuration file that could not be read
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("min_green ({min}) must not exceed max_green ({max})")]
    GreenBounds { min: f32, max: f32 },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("divisor must be at least 1")]
    ZeroDivisor,

    #[error("{field} must lie in {range}, got {value}")]
    OutOfRange {
        field: &'static str,
        range: &'static str,
        value: f32,
    },

    #[error("spawn_distance ({spawn}) must lie beyond the stop line ({stop_line})")]
    SpawnInsideStopLine { spawn: f32, stop_line: f32 },

    #[error("congestion_max_green ({cap}) must not be below min_green ({min})")]
    CongestionCapBelowMin { cap: f32, min: f32 },

    #[error("failed to parse config {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised while ticking the simulation
#[derive(Debug, Error)]
pub enum SimError {
    #[error("no signal group governs approach {0}")]
    MissingSignalGroup(Approach),

    #[error("conflicting right-of-way: {first} and {second} are both non-red")]
    ConflictingGreens { first: Approach, second: Approach },

    #[error("no approach has right-of-way outside emergency preemption")]
    NoRightOfWay,

    #[error("tick length must be finite and non-negative, got {0}")]
    InvalidDelta(f32),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Shorthand result type for simulation operations
pub type SimResult<T> = Result<T, SimError>;
