//! Main simulation world that ties everything together
//!
//! One `SimWorld` owns the scheduler, the vehicles and the clock. A tick runs
//! the scheduler first, then moves every vehicle against the signal state that
//! tick produced, then drops vehicles that have left the area.

use std::collections::BTreeMap;

use log::{debug, warn};

use super::config::SimConfig;
use super::error::{ConfigError, SimResult};
use super::feed::{unix_now, CountFeed};
use super::motion::{advance, MotionParams};
use super::predictor::TrendPredictor;
use super::scheduler::{check_delta, waiting_count, Scheduler};
use super::signal::SignalGroup;
use super::snapshot::{SignalSnapshot, SimSnapshot, VehicleSnapshot};
use super::stats::SimulationStats;
use super::types::{Approach, ApproachPair, Phase, SimId, VehicleId};
use super::vehicle::{Priority, Vehicle};

/// Seconds of simulated time between trend predictions
const PREDICTION_INTERVAL: f32 = 1.0;

/// Width and height of the terminal map, in characters
const MAP_CELLS: usize = 41;

/// What happened to vehicles during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Vehicles that passed the centre this tick
    pub crossed: Vec<VehicleId>,
    /// Vehicles removed after leaving the simulated area
    pub exited: Vec<VehicleId>,
    pub emergency_active: bool,
}

/// The main simulation world
pub struct SimWorld {
    config: SimConfig,
    scheduler: Scheduler,
    motion: MotionParams,

    /// Live vehicles in spawn order
    vehicles: Vec<Vehicle>,

    /// Signal state produced by the most recent tick
    signals: [SignalGroup; 4],

    /// Next ID to assign
    next_id: usize,

    /// Simulation time
    pub time: f32,

    feed: Option<CountFeed>,
    feed_fresh: bool,

    predictor: Option<TrendPredictor>,
    prediction_timer: f32,

    stats: SimulationStats,
}

impl SimWorld {
    /// Build a world from a configuration, rejecting invalid constants up front
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        let scheduler = Scheduler::new(&config)?;
        let signals = *scheduler.signals();
        Ok(Self {
            motion: MotionParams::from(&config),
            config,
            scheduler,
            vehicles: Vec::new(),
            signals,
            next_id: 0,
            time: 0.0,
            feed: None,
            feed_fresh: false,
            predictor: None,
            prediction_timer: 0.0,
            stats: SimulationStats::default(),
        })
    }

    /// Attach an external count feed
    pub fn with_feed(mut self, feed: CountFeed) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Attach a trend predictor whose latest value is exported in snapshots
    pub fn with_predictor(mut self, predictor: TrendPredictor) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn signals(&self) -> &[SignalGroup; 4] {
        &self.signals
    }

    pub fn signal(&self, approach: Approach) -> &SignalGroup {
        &self.signals[approach.index()]
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id() == id)
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    fn next_vehicle_id(&mut self) -> VehicleId {
        let id = VehicleId(SimId(self.next_id));
        self.next_id += 1;
        id
    }

    /// Insert a vehicle at the approach's configured starting position
    pub fn spawn(&mut self, approach: Approach, priority: Priority) -> VehicleId {
        self.spawn_at(approach, priority, self.config.spawn_distance)
    }

    /// Insert a vehicle `distance` units before the centre on `approach`
    pub fn spawn_at(&mut self, approach: Approach, priority: Priority, distance: f32) -> VehicleId {
        let id = self.next_vehicle_id();
        let position = approach.position_at(-distance, self.config.lane_offset);
        let vehicle = Vehicle::new(
            id,
            approach,
            priority,
            position,
            self.config.vehicle_speed,
            self.time,
        );
        debug!("Spawned vehicle {} on {} ({:?})", id, approach, priority);

        self.vehicles.push(vehicle);
        self.stats.vehicles_spawned += 1;
        if priority == Priority::Emergency {
            self.stats.emergency_spawned += 1;
        }
        self.stats.active_vehicles = self.vehicles.len() as u32;
        id
    }

    /// Vehicles held back by the stop line on each approach
    pub fn waiting_counts(&self) -> BTreeMap<Approach, usize> {
        Approach::ALL
            .iter()
            .map(|&a| {
                (
                    a,
                    waiting_count(&self.vehicles, a, self.config.stop_line_offset),
                )
            })
            .collect()
    }

    /// All live vehicles on each approach
    pub fn lane_counts(&self) -> BTreeMap<Approach, usize> {
        Approach::ALL
            .iter()
            .map(|&a| (a, self.vehicles.iter().filter(|v| v.approach() == a).count()))
            .collect()
    }

    fn fresh_feed_total(&mut self) -> Option<u32> {
        let feed = self.feed.as_ref()?;
        let total = feed.latest_total(unix_now(), self.config.feed_freshness);
        match (self.feed_fresh, total.is_some()) {
            (true, false) => warn!("Count feed missing or stale; ignoring congestion override"),
            (false, true) => debug!("Count feed available"),
            _ => {}
        }
        self.feed_fresh = total.is_some();
        total
    }

    /// Main simulation tick
    pub fn tick(&mut self, delta_secs: f32) -> SimResult<TickReport> {
        check_delta(delta_secs)?;

        let feed_total = self.fresh_feed_total();
        self.scheduler.set_feed_total(feed_total);

        // The scheduler's view is fixed before any vehicle reads it
        let signals = self.scheduler.tick(delta_secs, &self.vehicles)?;
        self.signals = signals;

        let advanced = self
            .vehicles
            .iter()
            .map(|v| advance(v, &signals, &self.motion, delta_secs))
            .collect::<SimResult<Vec<Vehicle>>>()?;
        self.time += delta_secs;

        let mut report = TickReport {
            emergency_active: self.scheduler.emergency_active(),
            ..TickReport::default()
        };
        for (before, after) in self.vehicles.iter().zip(&advanced) {
            if !before.has_crossed() && after.has_crossed() {
                report.crossed.push(after.id());
            }
        }

        let exit_distance = self.config.exit_distance;
        let (exited, remaining): (Vec<Vehicle>, Vec<Vehicle>) = advanced
            .into_iter()
            .partition(|v| v.progress() > exit_distance);
        report.exited = exited.iter().map(Vehicle::id).collect();
        self.vehicles = remaining;

        if let Some(predictor) = &mut self.predictor {
            self.prediction_timer += delta_secs;
            while self.prediction_timer >= PREDICTION_INTERVAL {
                self.prediction_timer -= PREDICTION_INTERVAL;
                predictor.predict_next();
            }
        }

        self.stats.elapsed_time = self.time;
        self.stats.vehicles_exited += report.exited.len() as u32;
        self.stats.active_vehicles = self.vehicles.len() as u32;
        self.stats.phase_changes = self.scheduler.phase_changes();
        self.stats.preemptions_started = self.scheduler.preemptions_started();

        Ok(report)
    }

    /// Export the current state
    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            time: self.time,
            vehicles: self
                .vehicles
                .iter()
                .map(|v| VehicleSnapshot {
                    id: v.id(),
                    x: v.position.x,
                    y: v.position.y,
                    approach: v.approach(),
                    is_emergency: v.is_emergency(),
                    crossed: v.has_crossed(),
                })
                .collect(),
            signals: self
                .signals
                .iter()
                .map(|g| SignalSnapshot {
                    approach: g.approach,
                    phase: g.phase,
                    remaining: g.remaining,
                })
                .collect(),
            waiting_counts: self.waiting_counts(),
            lane_counts: self.lane_counts(),
            emergency_active: self.scheduler.emergency_active(),
            predicted_density: self.predictor.as_ref().and_then(TrendPredictor::latest),
        }
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Intersection Summary ===");
        println!("Time: {:.2}s", self.time);
        println!("Vehicles: {}", self.vehicles.len());
        println!();

        println!("--- Signals ---");
        for group in &self.signals {
            println!(
                "  {}: {:<6} remaining={:.1}s",
                group.approach, group.phase, group.remaining
            );
        }

        let scheduler = &self.scheduler;
        match scheduler.preemption() {
            Some(preemption) => println!(
                "  Emergency preemption: vehicle {} on {} (resumes {})",
                preemption.vehicle, preemption.approach, preemption.resume
            ),
            None => println!(
                "  Active: {}  green N/S={:.1}s E/W={:.1}s  max green={:.1}s",
                scheduler.active_pair(),
                scheduler.green_duration(ApproachPair::NorthSouth),
                scheduler.green_duration(ApproachPair::EastWest),
                scheduler.effective_max_green()
            ),
        }

        println!("--- Queues ---");
        let waiting = self.waiting_counts();
        let lanes = self.lane_counts();
        for approach in Approach::ALL {
            println!(
                "  {}: waiting={} on approach={}",
                approach,
                waiting.get(&approach).copied().unwrap_or(0),
                lanes.get(&approach).copied().unwrap_or(0)
            );
        }

        if let Some(prediction) = self.predictor.as_ref().and_then(TrendPredictor::latest) {
            println!("--- Forecast ---");
            println!("  Predicted density: {}", prediction);
        }
    }

    /// Draw a visual map of the intersection in the terminal
    pub fn draw_map(&self) {
        println!("\n=== Intersection Map ===");
        println!("Legend: G/Y/R=Signal, v=Vehicle, !=Emergency vehicle, .=Road");
        println!();
        println!("{}", self.render_map());
        println!();
    }

    /// Render the map as lines of text, at most `MAP_CELLS` square
    pub fn render_map(&self) -> String {
        let extent = self.config.spawn_distance.max(self.config.exit_distance) + 5.0;
        // World units per character, chosen so the whole extent fits
        let scale = (2.0 * extent) / (MAP_CELLS - 1) as f32;
        let size = MAP_CELLS;

        let mut grid = vec![vec![' '; size]; size];

        let to_grid = |x: f32, y: f32| -> Option<(usize, usize)> {
            let col = ((x + extent) / scale).round();
            let row = ((y + extent) / scale).round();
            if col < 0.0 || row < 0.0 || col >= size as f32 || row >= size as f32 {
                return None;
            }
            Some((row as usize, col as usize))
        };

        // Roads: one band per axis
        let half_width = self.config.lane_offset * 2.0;
        for (row, line) in grid.iter_mut().enumerate() {
            for (col, cell) in line.iter_mut().enumerate() {
                let x = col as f32 * scale - extent;
                let y = row as f32 * scale - extent;
                if x.abs() <= half_width || y.abs() <= half_width {
                    *cell = '.';
                }
            }
        }

        // Signals sit on each approach's lane at the stop line
        for group in &self.signals {
            let position = group
                .approach
                .position_at(-self.config.stop_line_offset, self.config.lane_offset);
            if let Some((row, col)) = to_grid(position.x, position.y) {
                grid[row][col] = match group.phase {
                    Phase::Green => 'G',
                    Phase::Yellow => 'Y',
                    Phase::Red => 'R',
                };
            }
        }

        // Vehicles
        for vehicle in &self.vehicles {
            if let Some((row, col)) = to_grid(vehicle.position.x, vehicle.position.y) {
                if grid[row][col] == ' ' || grid[row][col] == '.' {
                    grid[row][col] = if vehicle.is_emergency() { '!' } else { 'v' };
                }
            }
        }

        grid.iter()
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
