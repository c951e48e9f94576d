//! Vehicles approaching and crossing the intersection
//!
//! A vehicle's lifecycle only ever moves forward, from `Approaching` to
//! `Crossed`. Nothing exposes a way back.

use super::types::{Approach, Position, VehicleId};

/// Where a vehicle is in its trip through the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleState {
    /// Still heading for the centre; obeys signals
    Approaching,
    /// Passed the centre; committed, ignores signals
    Crossed,
}

/// Fixed at spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Normal,
    Emergency,
}

/// A vehicle in the simulation
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    id: VehicleId,
    approach: Approach,
    priority: Priority,
    state: VehicleState,
    pub position: Position,
    /// Nominal speed in units per second
    pub speed: f32,
    /// Simulated time at which the vehicle was spawned
    spawned_at: f32,
}

impl Vehicle {
    pub fn new(
        id: VehicleId,
        approach: Approach,
        priority: Priority,
        position: Position,
        speed: f32,
        spawned_at: f32,
    ) -> Self {
        Self {
            id,
            approach,
            priority,
            state: VehicleState::Approaching,
            position,
            speed,
            spawned_at,
        }
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn approach(&self) -> Approach {
        self.approach
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn state(&self) -> VehicleState {
        self.state
    }

    pub fn spawned_at(&self) -> f32 {
        self.spawned_at
    }

    pub fn is_emergency(&self) -> bool {
        self.priority == Priority::Emergency
    }

    pub fn has_crossed(&self) -> bool {
        self.state == VehicleState::Crossed
    }

    /// Commit the vehicle to the intersection. Idempotent.
    pub fn mark_crossed(&mut self) {
        self.state = VehicleState::Crossed;
    }

    /// Signed distance along the approach; negative before the centre
    pub fn progress(&self) -> f32 {
        self.approach.progress(self.position)
    }

    pub fn passed_center(&self) -> bool {
        self.progress() > 0.0
    }

    /// True while the vehicle is further from the centre than the stop line
    pub fn is_behind_stop_line(&self, stop_line_offset: f32) -> bool {
        -self.progress() > stop_line_offset
    }

    /// Not yet crossed and still held back by a red light if one were showing
    pub fn is_waiting(&self, stop_line_offset: f32) -> bool {
        !self.has_crossed() && self.is_behind_stop_line(stop_line_offset)
    }
}
