//! Value-ranked backlog of sampled coordinates.

use std::collections::BTreeMap;

use pr_types::Coord;

/// Coordinates awaiting local expansion, bucketed by the value they returned
/// when queried.
///
/// Buckets are ordered by value; within a bucket coordinates come back in
/// LIFO order, so the most recently discovered point at a given value is
/// expanded first. Every coordinate held here was queried exactly once and
/// has not yet been popped for expansion.
#[derive(Debug, Default, Clone)]
pub struct ValueBacklog {
    buckets: BTreeMap<i32, Vec<Coord>>,
}

impl ValueBacklog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly queried coordinate under its observed value.
    pub fn insert(&mut self, value: i32, coord: Coord) {
        self.buckets.entry(value).or_default().push(coord);
    }

    /// Remove and return the coordinate with the highest recorded value.
    /// Emptied buckets are dropped from the map.
    pub fn pop_best(&mut self) -> Option<(i32, Coord)> {
        let (&value, bucket) = self.buckets.iter_mut().next_back()?;
        let coord = bucket.pop()?;
        if bucket.is_empty() {
            self.buckets.remove(&value);
        }
        Some((value, coord))
    }

    /// Highest value currently held, without removing anything.
    pub fn peek_best_value(&self) -> Option<i32> {
        self.buckets.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
