//! Vehicle motion engine
//!
//! Decides how far each vehicle moves in one tick given the signal state the
//! scheduler produced for that tick. Vehicles never influence each other.

use super::config::SimConfig;
use super::error::SimResult;
use super::signal::{group_for, SignalGroup};
use super::types::Phase;
use super::vehicle::Vehicle;

/// The subset of the configuration the motion engine reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    pub stop_line_offset: f32,
    pub deceleration_factor: f32,
}

impl From<&SimConfig> for MotionParams {
    fn from(config: &SimConfig) -> Self {
        Self {
            stop_line_offset: config.stop_line_offset,
            deceleration_factor: config.deceleration_factor,
        }
    }
}

/// Compute the vehicle's state after one tick of `delta_secs`.
///
/// Emergency and already-crossed vehicles always move at nominal speed.
/// Everyone else holds at red and slows at yellow while behind the stop line.
/// Crossing is recorded on the tick whose movement carries the vehicle past
/// the centre.
pub fn advance(
    vehicle: &Vehicle,
    signals: &[SignalGroup],
    params: &MotionParams,
    delta_secs: f32,
) -> SimResult<Vehicle> {
    let mut next = vehicle.clone();
    let full_step = vehicle.speed * delta_secs;

    let distance = if vehicle.is_emergency() || vehicle.has_crossed() {
        full_step
    } else if vehicle.passed_center() {
        // Already past the centre without having been marked (e.g. spawned there)
        next.mark_crossed();
        full_step
    } else {
        let signal = group_for(signals, vehicle.approach())?;
        let behind_stop_line = vehicle.is_behind_stop_line(params.stop_line_offset);
        match signal.phase {
            Phase::Red if behind_stop_line => 0.0,
            Phase::Yellow if behind_stop_line => full_step * params.deceleration_factor,
            _ => full_step,
        }
    };

    next.position = vehicle.approach().step(vehicle.position, distance);
    if !next.has_crossed() && next.passed_center() {
        next.mark_crossed();
    }

    Ok(next)
}
