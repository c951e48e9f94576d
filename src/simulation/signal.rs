//! Signal groups: one light per approach
//!
//! Pure data. Only the scheduler changes a group's phase.

use serde::Serialize;

use super::error::{SimError, SimResult};
use super::types::{Approach, Phase};

/// The light governing one approach
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalGroup {
    pub approach: Approach,
    pub phase: Phase,
    /// Seconds until this group's next phase change
    pub remaining: f32,
}

impl SignalGroup {
    pub fn new(approach: Approach) -> Self {
        Self {
            approach,
            phase: Phase::Red,
            remaining: 0.0,
        }
    }

    pub fn set(&mut self, phase: Phase, remaining: f32) {
        self.phase = phase;
        self.remaining = remaining.max(0.0);
    }

    pub fn is_red(&self) -> bool {
        self.phase == Phase::Red
    }
}

/// Find the group governing `approach`.
///
/// A missing group is a wiring bug, so it is reported rather than treated as green.
pub fn group_for(signals: &[SignalGroup], approach: Approach) -> SimResult<&SignalGroup> {
    signals
        .iter()
        .find(|g| g.approach == approach)
        .ok_or(SimError::MissingSignalGroup(approach))
}
