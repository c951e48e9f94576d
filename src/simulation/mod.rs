//! Standalone intersection simulation module
//!
//! This module contains the signal scheduling and vehicle motion logic. It
//! runs without any rendering layer and can be driven from tests or the
//! headless command-line runner.

mod config;
mod error;
mod feed;
mod motion;
mod predictor;
mod scheduler;
mod signal;
mod snapshot;
mod spawner;
mod stats;
mod types;
mod vehicle;
mod world;

// Re-export public types for external use
pub use config::{
    SimConfig, DEFAULT_BASE_GREEN, DEFAULT_CONGESTION_MAX_GREEN, DEFAULT_CONGESTION_THRESHOLD,
    DEFAULT_DECELERATION_FACTOR, DEFAULT_DIVISOR, DEFAULT_MAX_GREEN, DEFAULT_MIN_GREEN,
    DEFAULT_STOP_LINE_OFFSET, DEFAULT_YELLOW_DURATION,
};
pub use error::{ConfigError, SimError, SimResult};
pub use feed::{unix_now, CountFeed, FeedReading};
pub use motion::{advance, MotionParams};
pub use predictor::TrendPredictor;
pub use scheduler::{
    check_delta, select_emergency, waiting_count, CyclePhase, Preemption, Scheduler, TimingParams,
};
pub use signal::{group_for, SignalGroup};
pub use snapshot::{SignalSnapshot, SimSnapshot, VehicleSnapshot};
pub use spawner::ArrivalGenerator;
pub use stats::SimulationStats;
pub use types::{Approach, ApproachPair, Axis, Phase, Position, SimId, VehicleId};
pub use vehicle::{Priority, Vehicle, VehicleState};
pub use world::{SimWorld, TickReport};
