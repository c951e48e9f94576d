//! Intersection scheduler
//!
//! Owns the four signal groups and runs the GREEN -> YELLOW -> switch cycle
//! between the two approach pairs. Green time adapts to the queue measured at
//! the moment a pair turns green. Emergency vehicles waiting behind a stop
//! line preempt the cycle entirely.

use log::{debug, info};
use ordered_float::OrderedFloat;

use super::config::SimConfig;
use super::error::{ConfigError, SimError, SimResult};
use super::signal::SignalGroup;
use super::types::{Approach, ApproachPair, Phase, VehicleId};
use super::vehicle::Vehicle;

/// Timing constants the scheduler reads from the configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingParams {
    pub min_green: f32,
    pub max_green: f32,
    pub base_green: f32,
    pub divisor: u32,
    pub yellow_duration: f32,
    pub stop_line_offset: f32,
    pub congestion_threshold: u32,
    pub congestion_max_green: f32,
}

impl From<&SimConfig> for TimingParams {
    fn from(config: &SimConfig) -> Self {
        Self {
            min_green: config.min_green,
            max_green: config.max_green,
            base_green: config.base_green,
            divisor: config.divisor,
            yellow_duration: config.yellow_duration,
            stop_line_offset: config.stop_line_offset,
            congestion_threshold: config.congestion_threshold,
            congestion_max_green: config.congestion_max_green,
        }
    }
}

/// Where the active pair is in its normal cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Green,
    Yellow,
}

/// An emergency vehicle currently holding right-of-way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preemption {
    pub approach: Approach,
    pub vehicle: VehicleId,
    /// Pair that gets a fresh green once the preemption clears
    pub resume: ApproachPair,
}

/// Count vehicles on `approach` that have not crossed and are still behind the stop line
pub fn waiting_count(vehicles: &[Vehicle], approach: Approach, stop_line_offset: f32) -> usize {
    vehicles
        .iter()
        .filter(|v| v.approach() == approach && v.is_waiting(stop_line_offset))
        .count()
}

/// Pick the emergency vehicle to serve: the earliest spawned one still behind its stop line
pub fn select_emergency(vehicles: &[Vehicle], stop_line_offset: f32) -> Option<&Vehicle> {
    vehicles
        .iter()
        .filter(|v| v.is_emergency() && v.is_waiting(stop_line_offset))
        .min_by_key(|v| (OrderedFloat(v.spawned_at()), v.id()))
}

/// Reject tick lengths that would poison the timers or move vehicles backwards
pub fn check_delta(delta_secs: f32) -> SimResult<()> {
    if delta_secs.is_finite() && delta_secs >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidDelta(delta_secs))
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    timing: TimingParams,
    groups: [SignalGroup; 4],
    active: ApproachPair,
    cycle: CyclePhase,
    phase_elapsed: f32,
    /// Last computed green duration per pair, indexed by `pair_index`
    green_durations: [f32; 2],
    preemption: Option<Preemption>,
    feed_total: Option<u32>,
    phase_changes: u64,
    preemptions_started: u64,
}

fn pair_index(pair: ApproachPair) -> usize {
    match pair {
        ApproachPair::NorthSouth => 0,
        ApproachPair::EastWest => 1,
    }
}

impl Scheduler {
    /// Create a scheduler with N/S green and E/W red.
    ///
    /// The configuration is validated here so a bad value fails before any tick.
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let timing = TimingParams::from(config);
        let initial_green = timing.base_green.clamp(timing.min_green, timing.max_green);

        let mut scheduler = Self {
            timing,
            groups: Approach::ALL.map(SignalGroup::new),
            active: ApproachPair::NorthSouth,
            cycle: CyclePhase::Green,
            phase_elapsed: 0.0,
            green_durations: [initial_green; 2],
            preemption: None,
            feed_total: None,
            phase_changes: 0,
            preemptions_started: 0,
        };
        scheduler.apply_cycle();
        Ok(scheduler)
    }

    pub fn timing(&self) -> &TimingParams {
        &self.timing
    }

    pub fn signals(&self) -> &[SignalGroup; 4] {
        &self.groups
    }

    pub fn signal(&self, approach: Approach) -> &SignalGroup {
        &self.groups[approach.index()]
    }

    pub fn active_pair(&self) -> ApproachPair {
        self.active
    }

    pub fn cycle_phase(&self) -> CyclePhase {
        self.cycle
    }

    pub fn phase_elapsed(&self) -> f32 {
        self.phase_elapsed
    }

    /// Green duration most recently computed for `pair`
    pub fn green_duration(&self, pair: ApproachPair) -> f32 {
        self.green_durations[pair_index(pair)]
    }

    pub fn preemption(&self) -> Option<&Preemption> {
        self.preemption.as_ref()
    }

    pub fn emergency_active(&self) -> bool {
        self.preemption.is_some()
    }

    pub fn phase_changes(&self) -> u64 {
        self.phase_changes
    }

    pub fn preemptions_started(&self) -> u64 {
        self.preemptions_started
    }

    /// Record the latest fresh total from the count feed, or `None` when the feed
    /// is absent or stale.
    pub fn set_feed_total(&mut self, total: Option<u32>) {
        self.feed_total = total;
    }

    pub fn feed_total(&self) -> Option<u32> {
        self.feed_total
    }

    /// Upper bound for green time, lowered while the feed reports heavy congestion
    pub fn effective_max_green(&self) -> f32 {
        match self.feed_total {
            Some(total) if total > self.timing.congestion_threshold => {
                self.timing.max_green.min(self.timing.congestion_max_green)
            }
            _ => self.timing.max_green,
        }
    }

    /// Adaptive green time for `pair` given the current queue.
    ///
    /// `clamp(min_green, max_green, base_green + waiting / divisor)`, where the
    /// division is integral.
    pub fn compute_green_duration(&self, pair: ApproachPair, vehicles: &[Vehicle]) -> f32 {
        let waiting: usize = pair
            .approaches()
            .iter()
            .map(|&a| waiting_count(vehicles, a, self.timing.stop_line_offset))
            .sum();
        let bonus = (waiting as u32 / self.timing.divisor) as f32;
        let max_green = self.effective_max_green();
        (self.timing.base_green + bonus).clamp(self.timing.min_green, max_green)
    }

    /// Advance the signal state by one tick.
    ///
    /// Returns a copy of the four groups so every vehicle in the tick reads the
    /// same state.
    pub fn tick(&mut self, delta_secs: f32, vehicles: &[Vehicle]) -> SimResult<[SignalGroup; 4]> {
        check_delta(delta_secs)?;

        if let Some(candidate) = select_emergency(vehicles, self.timing.stop_line_offset) {
            self.preempt(candidate.approach(), candidate.id());
            return Ok(self.groups);
        }

        if let Some(preemption) = self.preemption.take() {
            info!(
                "Emergency preemption cleared; resuming {} with a fresh green",
                preemption.resume
            );
            self.start_green(preemption.resume, vehicles);
        } else {
            self.phase_elapsed += delta_secs;
            match self.cycle {
                CyclePhase::Green if self.phase_elapsed >= self.green_duration(self.active) => {
                    self.cycle = CyclePhase::Yellow;
                    self.phase_elapsed = 0.0;
                    self.phase_changes += 1;
                    debug!("{} turned YELLOW", self.active);
                }
                CyclePhase::Yellow if self.phase_elapsed >= self.timing.yellow_duration => {
                    self.start_green(self.active.other(), vehicles);
                }
                _ => {}
            }
        }

        self.apply_cycle();
        self.check_mutual_exclusion()?;
        Ok(self.groups)
    }

    fn start_green(&mut self, pair: ApproachPair, vehicles: &[Vehicle]) {
        let duration = self.compute_green_duration(pair, vehicles);
        self.green_durations[pair_index(pair)] = duration;
        self.active = pair;
        self.cycle = CyclePhase::Green;
        self.phase_elapsed = 0.0;
        self.phase_changes += 1;
        debug!("{} turned GREEN for {:.1}s", pair, duration);
    }

    fn preempt(&mut self, approach: Approach, vehicle: VehicleId) {
        let resume = match self.preemption {
            Some(current) => {
                if current.vehicle != vehicle {
                    info!("Emergency preemption handed to vehicle {} on {}", vehicle, approach);
                }
                current.resume
            }
            None => {
                self.preemptions_started += 1;
                info!(
                    "Emergency preemption: vehicle {} on {} (suspending {})",
                    vehicle, approach, self.active
                );
                self.active
            }
        };

        self.preemption = Some(Preemption {
            approach,
            vehicle,
            resume,
        });

        for group in &mut self.groups {
            let phase = if group.approach == approach {
                Phase::Green
            } else {
                Phase::Red
            };
            group.set(phase, 0.0);
        }
    }

    /// Write the normal-mode cycle state into the signal groups
    fn apply_cycle(&mut self) {
        let (active_phase, active_remaining, red_remaining) = match self.cycle {
            CyclePhase::Green => {
                let green_left = self.green_duration(self.active) - self.phase_elapsed;
                (
                    Phase::Green,
                    green_left,
                    green_left.max(0.0) + self.timing.yellow_duration,
                )
            }
            CyclePhase::Yellow => {
                let yellow_left = self.timing.yellow_duration - self.phase_elapsed;
                (Phase::Yellow, yellow_left, yellow_left)
            }
        };

        let active = self.active;
        for group in &mut self.groups {
            if active.contains(group.approach) {
                group.set(active_phase, active_remaining);
            } else {
                group.set(Phase::Red, red_remaining);
            }
        }
    }

    /// Exactly one opposing pair may be non-red outside preemption
    pub fn check_mutual_exclusion(&self) -> SimResult<()> {
        let mut open = self.groups.iter().filter(|g| !g.is_red());
        let Some(first) = open.next() else {
            return Err(SimError::NoRightOfWay);
        };
        for other in open {
            if other.approach.pair() != first.approach.pair() {
                return Err(SimError::ConflictingGreens {
                    first: first.approach,
                    second: other.approach,
                });
            }
        }
        Ok(())
    }
}
