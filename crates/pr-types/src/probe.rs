//! The query capability handed to a strategy.

use crate::coord::Coord;

/// Bounded query access to one plot's hidden values.
///
/// A probe owns the query budget and the history of everything asked so far.
/// Once the budget reaches zero, [`Probe::query`] keeps returning 0 without
/// recording anything, so strategies should stop on their own rather than
/// burn no-op calls.
pub trait Probe {
    /// Queries left before the probe goes dead.
    fn queries_remaining(&self) -> u32;

    /// Reveal the plot value at `coord`, spending one query. Returns 0 once
    /// the budget is exhausted.
    fn query(&mut self, coord: Coord) -> i32;

    /// Value previously revealed at `coord`, if it was ever queried this
    /// session. Costs nothing; strategies use this to avoid wasting budget
    /// on coordinates they already know.
    fn queried_value(&self, coord: Coord) -> Option<i32>;

    fn was_queried(&self, coord: Coord) -> bool {
        self.queried_value(coord).is_some()
    }
}
