//! Random arrival process
//!
//! Lives outside the scheduling core: it only decides when and where vehicles
//! appear, and hands them to the world through `SimWorld::spawn`.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use super::config::SimConfig;
use super::types::{Approach, VehicleId};
use super::vehicle::Priority;
use super::world::SimWorld;

#[derive(Debug, Clone)]
pub struct ArrivalGenerator {
    interval: f32,
    emergency_probability: f64,
    timer: f32,
    rng: Option<StdRng>,
}

impl ArrivalGenerator {
    fn new_internal(config: &SimConfig, rng: Option<StdRng>) -> Self {
        Self {
            interval: config.spawn_interval,
            emergency_probability: config.emergency_probability,
            timer: 0.0,
            rng,
        }
    }

    pub fn new(config: &SimConfig) -> Self {
        Self::new_internal(config, None)
    }

    /// Create a generator with a seeded RNG for reproducible arrivals
    pub fn new_with_seed(config: &SimConfig, seed: u64) -> Self {
        Self::new_internal(config, Some(StdRng::seed_from_u64(seed)))
    }

    /// Pick an approach and priority for the next arrival
    fn draw(&mut self) -> (Approach, Priority) {
        let probability = self.emergency_probability;
        let (approach, emergency) = match &mut self.rng {
            Some(rng) => (
                Approach::ALL[..].choose(rng).copied(),
                rng.random_bool(probability),
            ),
            None => {
                let mut rng = rand::rng();
                (
                    Approach::ALL[..].choose(&mut rng).copied(),
                    rng.random_bool(probability),
                )
            }
        };
        let priority = if emergency {
            Priority::Emergency
        } else {
            Priority::Normal
        };
        (approach.unwrap_or(Approach::North), priority)
    }

    /// Accumulate `delta_secs` and spawn one vehicle per elapsed interval
    pub fn update(&mut self, delta_secs: f32, world: &mut SimWorld) -> Vec<VehicleId> {
        self.timer += delta_secs;
        let mut spawned = Vec::new();
        while self.timer >= self.interval {
            self.timer -= self.interval;
            let (approach, priority) = self.draw();
            spawned.push(world.spawn(approach, priority));
        }
        spawned
    }
}
