//! Random-walk traffic trend predictor
//!
//! A stand-in forecaster: each prediction nudges the last value by a small
//! random step. Only its latest value is exported.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SEED_HISTORY_LEN: usize = 10;
const HISTORY_CAP: usize = 50;
const MAX_STEP: i32 = 8;
const MIN_PREDICTION: u32 = 5;
const MAX_PREDICTION: u32 = 60;

#[derive(Debug, Clone)]
pub struct TrendPredictor {
    history: Vec<u32>,
    rng: StdRng,
}

impl TrendPredictor {
    /// Create a predictor with ten synthetic historic values
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let history = (0..SEED_HISTORY_LEN)
            .map(|_| rng.random_range(20..=50))
            .collect();
        Self { history, rng }
    }

    pub fn history(&self) -> &[u32] {
        &self.history
    }

    pub fn latest(&self) -> Option<u32> {
        self.history.last().copied()
    }

    pub fn predict_next(&mut self) -> u32 {
        let last = self.latest().unwrap_or(MIN_PREDICTION) as i32;
        let step = self.rng.random_range(-MAX_STEP..=MAX_STEP);
        let next = (last + step).clamp(MIN_PREDICTION as i32, MAX_PREDICTION as i32) as u32;

        self.history.push(next);
        if self.history.len() > HISTORY_CAP {
            self.history.remove(0);
        }
        next
    }
}
