//! Read-only export of the simulation state for dashboards and renderers

use std::collections::BTreeMap;

use serde::Serialize;

use super::types::{Approach, Phase, VehicleId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleSnapshot {
    pub id: VehicleId,
    pub x: f32,
    pub y: f32,
    pub approach: Approach,
    pub is_emergency: bool,
    pub crossed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalSnapshot {
    pub approach: Approach,
    pub phase: Phase,
    pub remaining: f32,
}

/// State of the intersection at the end of a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimSnapshot {
    pub time: f32,
    pub vehicles: Vec<VehicleSnapshot>,
    pub signals: Vec<SignalSnapshot>,
    /// Not-yet-crossed vehicles behind the stop line, per approach
    pub waiting_counts: BTreeMap<Approach, usize>,
    /// All vehicles currently on each approach
    pub lane_counts: BTreeMap<Approach, usize>,
    pub emergency_active: bool,
    pub predicted_density: Option<u32>,
}

impl SimSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
