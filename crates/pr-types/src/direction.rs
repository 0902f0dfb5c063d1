//! Cardinal directions with a fixed scan cycle.

use serde::{Deserialize, Serialize};

use crate::coord::Coord;

/// The four compass directions, cycled N → E → S → W → N during local search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Next direction in the fixed cycle.
    pub fn next(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// Neighbour of `from` at `stride` units along this direction, clamped to
    /// plot bounds. North is +y, east is +x.
    pub fn step(self, from: Coord, stride: i32) -> Coord {
        match self {
            Self::North => Coord::clamped(from.x, from.y + stride),
            Self::East => Coord::clamped(from.x + stride, from.y),
            Self::South => Coord::clamped(from.x, from.y - stride),
            Self::West => Coord::clamped(from.x - stride, from.y),
        }
    }
}

impl Default for Direction {
    fn default() -> Self {
        Self::North
    }
}
