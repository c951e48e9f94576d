//! Running statistics for a simulation

use log::info;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationStats {
    pub elapsed_time: f32,
    pub vehicles_spawned: u32,
    pub vehicles_exited: u32,
    pub active_vehicles: u32,
    pub emergency_spawned: u32,
    pub preemptions_started: u64,
    pub phase_changes: u64,
}

impl SimulationStats {
    /// Share of spawned vehicles that have left the simulated area, in percent
    pub fn throughput_rate(&self) -> f32 {
        if self.vehicles_spawned > 0 {
            (self.vehicles_exited as f32 / self.vehicles_spawned as f32) * 100.0
        } else {
            0.0
        }
    }

    pub fn log_report(&self) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Elapsed time: {:.2}s", self.elapsed_time);
        info!("Total vehicles spawned: {}", self.vehicles_spawned);
        info!("Emergency vehicles spawned: {}", self.emergency_spawned);
        info!("Total vehicles exited: {}", self.vehicles_exited);
        info!("Active vehicles: {}", self.active_vehicles);
        info!("Phase changes: {}", self.phase_changes);
        info!("Emergency preemptions: {}", self.preemptions_started);
        info!("Throughput rate: {:.1}%", self.throughput_rate());
    }
}
