//! Core types for the intersection simulation
//!
//! Directions are a closed enum backed by a small lookup table, so every
//! per-approach predicate is derived from the same axis/sign data.

use serde::Serialize;
use std::fmt;

/// A unique identifier for simulation entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SimId(pub usize);

/// A wrapper type for vehicle IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VehicleId(pub SimId);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0 .0)
    }
}

/// Axis of travel through the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Static geometry for one approach
#[derive(Debug, Clone, Copy)]
struct ApproachGeometry {
    axis: Axis,
    /// Direction of travel along `axis` (+1 or -1)
    sign: f32,
    /// Which side of the road the lane sits on, along the other axis
    lane_side: f32,
}

/// The compass direction a vehicle enters from.
///
/// North traffic enters at negative `y` and drives towards positive `y`,
/// East traffic enters at positive `x` and drives towards negative `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Approach {
    North,
    South,
    East,
    West,
}

impl Approach {
    pub const ALL: [Approach; 4] = [
        Approach::North,
        Approach::South,
        Approach::East,
        Approach::West,
    ];

    fn geometry(self) -> ApproachGeometry {
        match self {
            Approach::North => ApproachGeometry { axis: Axis::Y, sign: 1.0, lane_side: -1.0 },
            Approach::South => ApproachGeometry { axis: Axis::Y, sign: -1.0, lane_side: 1.0 },
            Approach::East => ApproachGeometry { axis: Axis::X, sign: -1.0, lane_side: -1.0 },
            Approach::West => ApproachGeometry { axis: Axis::X, sign: 1.0, lane_side: 1.0 },
        }
    }

    pub fn axis(self) -> Axis {
        self.geometry().axis
    }

    /// Index into per-approach arrays, in `ALL` order
    pub fn index(self) -> usize {
        match self {
            Approach::North => 0,
            Approach::South => 1,
            Approach::East => 2,
            Approach::West => 3,
        }
    }

    /// The pair of opposing approaches this approach belongs to
    pub fn pair(self) -> ApproachPair {
        match self.axis() {
            Axis::Y => ApproachPair::NorthSouth,
            Axis::X => ApproachPair::EastWest,
        }
    }

    /// Signed distance travelled towards and past the centre.
    /// Negative before the centre, positive after it.
    pub fn progress(self, position: Position) -> f32 {
        let geometry = self.geometry();
        let coordinate = match geometry.axis {
            Axis::X => position.x,
            Axis::Y => position.y,
        };
        geometry.sign * coordinate
    }

    /// Position of a vehicle on this approach with the given progress
    pub fn position_at(self, progress: f32, lane_offset: f32) -> Position {
        let geometry = self.geometry();
        let along = geometry.sign * progress;
        let across = geometry.lane_side * lane_offset;
        match geometry.axis {
            Axis::X => Position::new(along, across),
            Axis::Y => Position::new(across, along),
        }
    }

    /// Move `position` forward by `distance` along this approach's direction of travel
    pub fn step(self, position: Position, distance: f32) -> Position {
        let geometry = self.geometry();
        let delta = geometry.sign * distance;
        match geometry.axis {
            Axis::X => Position::new(position.x + delta, position.y),
            Axis::Y => Position::new(position.x, position.y + delta),
        }
    }

    pub fn short_name(self) -> char {
        match self {
            Approach::North => 'N',
            Approach::South => 'S',
            Approach::East => 'E',
            Approach::West => 'W',
        }
    }
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// One of the two pairs of opposing approaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ApproachPair {
    NorthSouth,
    EastWest,
}

impl ApproachPair {
    pub fn approaches(self) -> [Approach; 2] {
        match self {
            ApproachPair::NorthSouth => [Approach::North, Approach::South],
            ApproachPair::EastWest => [Approach::East, Approach::West],
        }
    }

    pub fn other(self) -> ApproachPair {
        match self {
            ApproachPair::NorthSouth => ApproachPair::EastWest,
            ApproachPair::EastWest => ApproachPair::NorthSouth,
        }
    }

    pub fn contains(self, approach: Approach) -> bool {
        approach.pair() == self
    }
}

impl fmt::Display for ApproachPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApproachPair::NorthSouth => write!(f, "N/S"),
            ApproachPair::EastWest => write!(f, "E/W"),
        }
    }
}

/// A 2D position in the simulation, intersection centre at the origin
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Signal phase of one approach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    Green,
    Yellow,
    Red,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Green => "GREEN",
            Phase::Yellow => "YELLOW",
            Phase::Red => "RED",
        };
        f.pad(name)
    }
}
