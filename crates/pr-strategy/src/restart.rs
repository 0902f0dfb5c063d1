//! Random-restart hill climber.
//!
//! Rolls random starting points spread away from everything queried so far,
//! rejecting starts below a value threshold, then climbs by querying the
//! eight surrounding offsets of the best point seen and moving to whichever
//! pays most. When the neighbourhood is exhausted it restarts somewhere new.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use pr_types::{Coord, Probe, MAP_SIZE, MAX_COORD};

use crate::Prospector;

/// Tuning for [`RandomRestartProspector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomRestartConfig {
    /// Starting points below this value are rejected (and their query spent).
    pub min_start_value: i32,
    /// Offset for the four cardinal climb candidates.
    pub axis_distance: i32,
    /// Offset for the four diagonal climb candidates.
    pub diag_distance: i32,
    /// Minimum Euclidean distance between a candidate and every coordinate
    /// already queried this session.
    pub min_point_distance: i32,
    /// Cap on rerolls when hunting for a spread-out start; the last roll is
    /// accepted if the cap is hit.
    pub max_placement_attempts: u32,
}

impl Default for RandomRestartConfig {
    fn default() -> Self {
        Self {
            min_start_value: 300,
            axis_distance: 10,
            diag_distance: 7,
            min_point_distance: 10,
            max_placement_attempts: 1000,
        }
    }
}

impl RandomRestartConfig {
    pub fn with_min_start_value(mut self, v: i32) -> Self {
        self.min_start_value = v;
        self
    }

    pub fn with_min_point_distance(mut self, d: i32) -> Self {
        self.min_point_distance = d;
        self
    }
}

/// The random-restart strategy.
pub struct RandomRestartProspector {
    config: RandomRestartConfig,
    rng: StdRng,
}

impl RandomRestartProspector {
    pub fn new(config: RandomRestartConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic variant for tests and reproducible runs.
    pub fn seeded(config: RandomRestartConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomRestartProspector {
    fn default() -> Self {
        Self::new(RandomRestartConfig::default())
    }
}

impl Prospector for RandomRestartProspector {
    fn name(&self) -> &str {
        "random_restart"
    }

    fn prospect(&mut self, probe: &mut dyn Probe) {
        // Coordinates this session has queried, for the spread check. The
        // probe only exposes membership, and every query goes through us.
        let mut visited: Vec<Coord> = Vec::new();

        while probe.queries_remaining() > 0 {
            let Some(start) = self.find_start(probe, &mut visited) else {
                break;
            };
            debug!(%start, "restart accepted");
            self.climb_around(start, probe, &mut visited);
        }
    }
}

impl RandomRestartProspector {
    /// Query random spread-out points until one clears the start threshold
    /// or the budget runs out. Returns the last point queried either way.
    fn find_start(&mut self, probe: &mut dyn Probe, visited: &mut Vec<Coord>) -> Option<Coord> {
        let mut last = None;
        while probe.queries_remaining() > 0 {
            let candidate = self.spread_coord(visited);
            let value = probe.query(candidate);
            visited.push(candidate);
            last = Some(candidate);
            if value >= self.config.min_start_value {
                break;
            }
        }
        last
    }

    /// Random coordinate at least `min_point_distance` from everything
    /// visited, giving up after a bounded number of rolls.
    fn spread_coord(&mut self, visited: &[Coord]) -> Coord {
        let mut candidate = self.random_coord();
        for _ in 0..self.config.max_placement_attempts {
            if self.is_spread(candidate, visited) {
                return candidate;
            }
            candidate = self.random_coord();
        }
        candidate
    }

    fn random_coord(&mut self) -> Coord {
        Coord::new(
            self.rng.random_range(0..MAP_SIZE),
            self.rng.random_range(0..MAP_SIZE),
        )
    }

    fn is_spread(&self, coord: Coord, visited: &[Coord]) -> bool {
        visited
            .iter()
            .all(|q| euclid(coord, *q) >= self.config.min_point_distance)
    }

    /// Greedy neighbourhood climb: query every surviving surrounding offset
    /// of the current best point, move to the best response, repeat until
    /// the neighbourhood is picked clean or the budget is gone.
    fn climb_around(&mut self, start: Coord, probe: &mut dyn Probe, visited: &mut Vec<Coord>) {
        let mut best_coord = start;
        let mut best_value = 0;

        while probe.queries_remaining() > 0 {
            let candidates = self.surrounding(best_coord, visited);
            if candidates.is_empty() {
                return;
            }
            for coord in candidates {
                if probe.queries_remaining() == 0 {
                    return;
                }
                let value = probe.query(coord);
                visited.push(coord);
                if value > best_value {
                    best_value = value;
                    best_coord = coord;
                }
            }
        }
    }

    /// The up-to-eight in-bounds offsets around `coord`, filtered by the
    /// spread check against everything already visited.
    fn surrounding(&self, coord: Coord, visited: &[Coord]) -> Vec<Coord> {
        let axis = self.config.axis_distance;
        let diag = self.config.diag_distance;
        let mut candidates = Vec::with_capacity(8);

        if coord.x >= axis {
            candidates.push(Coord::new(coord.x - axis, coord.y));
        }
        if coord.y >= axis {
            candidates.push(Coord::new(coord.x, coord.y - axis));
        }
        if coord.x <= MAX_COORD - axis {
            candidates.push(Coord::new(coord.x + axis, coord.y));
        }
        if coord.y <= MAX_COORD - axis {
            candidates.push(Coord::new(coord.x, coord.y + axis));
        }
        if coord.x >= axis && coord.y >= axis {
            candidates.push(Coord::new(coord.x - diag, coord.y - diag));
        }
        if coord.x <= MAX_COORD - axis && coord.y <= MAX_COORD - axis {
            candidates.push(Coord::new(coord.x + diag, coord.y + diag));
        }
        if coord.x >= axis && coord.y <= MAX_COORD - axis {
            candidates.push(Coord::new(coord.x - diag, coord.y + diag));
        }
        if coord.y >= axis && coord.x <= MAX_COORD - axis {
            candidates.push(Coord::new(coord.x + diag, coord.y - diag));
        }

        candidates
            .into_iter()
            .filter(|c| self.is_spread(*c, visited))
            .collect()
    }
}

/// Integer Euclidean distance (truncated).
fn euclid(a: Coord, b: Coord) -> i32 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    (dx * dx + dy * dy).sqrt() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeProbe;
    use pr_types::QUERY_BUDGET;

    #[test]
    fn zero_budget_issues_no_queries() {
        let mut probe = FakeProbe::new(0, |_| 500);
        RandomRestartProspector::seeded(RandomRestartConfig::default(), 1).prospect(&mut probe);
        assert_eq!(probe.queries_used(), 0);
    }

    #[test]
    fn stays_within_budget_and_bounds() {
        let mut probe = FakeProbe::new(QUERY_BUDGET, |c| (c.x * 7 + c.y * 3) % 400);
        RandomRestartProspector::seeded(RandomRestartConfig::default(), 2).prospect(&mut probe);

        assert!(probe.queries_used() <= QUERY_BUDGET as usize);
        assert_eq!(probe.queries_remaining(), 0);
        for coord in probe.history().keys() {
            assert!(coord.in_bounds(), "out of bounds: {coord}");
        }
    }

    #[test]
    fn random_placements_keep_their_distance() {
        // Threshold never met, so every query is a fresh random placement.
        let config = RandomRestartConfig::default();
        let mut probe = FakeProbe::new(QUERY_BUDGET, |_| 1);
        RandomRestartProspector::seeded(config, 3).prospect(&mut probe);

        let coords: Vec<Coord> = probe.history().keys().copied().collect();
        for (i, a) in coords.iter().enumerate() {
            for b in coords.iter().skip(i + 1) {
                assert!(
                    euclid(*a, *b) >= config.min_point_distance,
                    "{a} and {b} too close"
                );
            }
        }
    }

    #[test]
    fn climbs_once_a_start_is_accepted() {
        // Value grows with x; any accepted start has x >= 300 and the climb
        // can only raise the best value from there.
        let mut probe = FakeProbe::new(QUERY_BUDGET, |c| c.x);
        RandomRestartProspector::seeded(RandomRestartConfig::default(), 4).prospect(&mut probe);

        assert!(probe.best_seen().unwrap() >= 300);
    }

    #[test]
    fn euclid_truncates() {
        assert_eq!(euclid(Coord::new(0, 0), Coord::new(7, 7)), 9);
        assert_eq!(euclid(Coord::new(0, 0), Coord::new(10, 0)), 10);
        assert_eq!(euclid(Coord::new(3, 4), Coord::new(0, 0)), 5);
    }
}
