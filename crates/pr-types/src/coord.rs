//! Plot coordinates and bounds clamping.

use serde::{Deserialize, Serialize};

/// Side length of a plot; valid coordinates are `0..MAP_SIZE` on each axis.
pub const MAP_SIZE: i32 = 512;

/// Largest valid coordinate component.
pub const MAX_COORD: i32 = MAP_SIZE - 1;

/// Queries allowed per plot before the probe starts returning 0.
pub const QUERY_BUDGET: u32 = 100;

/// A point on the plot. Components are always within `[0, MAX_COORD]` when
/// produced through [`Coord::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Build a coordinate with both components clamped into plot bounds.
    pub fn clamped(x: i32, y: i32) -> Self {
        Self {
            x: clamp_axis(x),
            y: clamp_axis(y),
        }
    }

    pub fn in_bounds(&self) -> bool {
        (0..MAP_SIZE).contains(&self.x) && (0..MAP_SIZE).contains(&self.y)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Clamp a single axis value into `[0, MAX_COORD]`. Idempotent on in-range
/// values.
pub fn clamp_axis(z: i32) -> i32 {
    z.clamp(0, MAX_COORD)
}
