//! Grid-seeded steepest-ascent prospector.
//!
//! Two phases: a coarse lattice scan seeds a value-ranked backlog, then the
//! remaining budget is spent walking outward from the best known points,
//! probing cardinal neighbours at a fixed stride and chasing strict
//! improvements. The direction of the last improvement is remembered across
//! walks to exploit smooth value landscapes.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use pr_types::{clamp_axis, Coord, Direction, Probe, MAX_COORD};

use crate::backlog::ValueBacklog;
use crate::Prospector;

/// Tuning for [`GridWalkProspector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridWalkConfig {
    /// Seed lattice points per axis. Values below 2 are treated as 2.
    pub grid_dim: i32,
    /// Step distance for cardinal probes during the walk phase.
    pub stride: i32,
}

impl Default for GridWalkConfig {
    fn default() -> Self {
        Self {
            grid_dim: 8,
            stride: 12,
        }
    }
}

impl GridWalkConfig {
    pub fn with_grid_dim(mut self, n: i32) -> Self {
        self.grid_dim = n;
        self
    }

    pub fn with_stride(mut self, stride: i32) -> Self {
        self.stride = stride;
        self
    }
}

/// The grid-and-walk strategy.
pub struct GridWalkProspector {
    config: GridWalkConfig,
}

impl GridWalkProspector {
    pub fn new(config: GridWalkConfig) -> Self {
        Self { config }
    }
}

impl Default for GridWalkProspector {
    fn default() -> Self {
        Self::new(GridWalkConfig::default())
    }
}

impl Prospector for GridWalkProspector {
    fn name(&self) -> &str {
        "grid_walk"
    }

    fn prospect(&mut self, probe: &mut dyn Probe) {
        let mut session = WalkSession::new(probe, self.config.stride);
        session.seed_grid(self.config.grid_dim.max(2));
        debug!(
            seeded = session.backlog.len(),
            remaining = session.probe.queries_remaining(),
            "grid seeding complete"
        );

        while session.probe.queries_remaining() > 0 {
            let Some((value, coord)) = session.backlog.pop_best() else {
                // Reachable on plateaus: every expansion came up empty and
                // the seeds are used up. Nothing left to grow from.
                warn!(
                    remaining = session.probe.queries_remaining(),
                    "backlog drained before budget"
                );
                break;
            };
            session.last_pop_value = value;
            session.walk_from(coord);
        }
    }
}

/// Mutable state for one prospect invocation. Never outlives or leaks across
/// sessions.
struct WalkSession<'a> {
    probe: &'a mut dyn Probe,
    backlog: ValueBacklog,
    last_pop_value: i32,
    last_direction: Direction,
    stride: i32,
}

impl<'a> WalkSession<'a> {
    fn new(probe: &'a mut dyn Probe, stride: i32) -> Self {
        Self {
            probe,
            backlog: ValueBacklog::new(),
            last_pop_value: 0,
            last_direction: Direction::North,
            stride,
        }
    }

    /// Phase one: query an evenly spaced `dim` x `dim` lattice and seed the
    /// backlog. Clamp collisions at the boundary are skipped for free, and
    /// the scan stops early if the budget runs dry.
    fn seed_grid(&mut self, dim: i32) {
        for i in 0..dim {
            for j in 0..dim {
                if self.probe.queries_remaining() == 0 {
                    return;
                }
                let coord = Coord::new(lattice_axis(i, dim), lattice_axis(j, dim));
                if self.probe.was_queried(coord) {
                    continue;
                }
                let value = self.probe.query(coord);
                self.backlog.insert(value, coord);
            }
        }
    }

    /// Phase two step: probe cardinal neighbours of `origin` at the session
    /// stride, starting from the last direction that paid off. The first
    /// neighbour strictly beating the popped value goes into the backlog and
    /// ends the scan; otherwise all four directions are tried and the origin
    /// is abandoned.
    fn walk_from(&mut self, origin: Coord) {
        let start = self.last_direction;
        let mut dir = start;
        loop {
            if self.probe.queries_remaining() == 0 {
                return;
            }
            let neighbour = dir.step(origin, self.stride);
            // An already-known neighbour can never be a fresh improvement;
            // skip it rather than spend budget re-learning it.
            if !self.probe.was_queried(neighbour) {
                let value = self.probe.query(neighbour);
                if value > self.last_pop_value {
                    debug!(%origin, %neighbour, value, ?dir, "improving step");
                    self.backlog.insert(value, neighbour);
                    self.last_direction = dir;
                    return;
                }
            }
            dir = dir.next();
            if dir == start {
                return;
            }
        }
    }
}

/// Lattice coordinate for index `i` of `dim` points along one axis:
/// `ceil(i * MAX_COORD / (dim - 1))`, clamped into bounds.
fn lattice_axis(i: i32, dim: i32) -> i32 {
    let num = i * MAX_COORD;
    let den = dim - 1;
    clamp_axis((num + den - 1) / den)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeProbe;
    use pr_types::QUERY_BUDGET;

    #[test]
    fn lattice_spans_full_axis() {
        let points: Vec<i32> = (0..8).map(|i| lattice_axis(i, 8)).collect();
        assert_eq!(points, vec![0, 73, 146, 219, 292, 365, 438, 511]);
    }

    #[test]
    fn lattice_in_bounds_for_small_dims() {
        for dim in 2..=16 {
            for i in 0..dim {
                let z = lattice_axis(i, dim);
                assert!((0..=MAX_COORD).contains(&z), "dim={dim} i={i} z={z}");
            }
        }
    }

    #[test]
    fn zero_budget_issues_no_queries() {
        let mut probe = FakeProbe::new(0, |_| 42);
        GridWalkProspector::default().prospect(&mut probe);
        assert_eq!(probe.queries_used(), 0);
    }

    #[test]
    fn seed_respects_small_budget() {
        let mut probe = FakeProbe::new(10, |_| 1);
        GridWalkProspector::default().prospect(&mut probe);
        assert_eq!(probe.queries_used(), 10);
        assert_eq!(probe.queries_remaining(), 0);
    }

    #[test]
    fn all_queries_in_bounds_and_distinct() {
        let mut probe = FakeProbe::new(QUERY_BUDGET, |c| (c.x + c.y) % 37);
        GridWalkProspector::default().prospect(&mut probe);
        assert!(probe.queries_used() <= QUERY_BUDGET as usize);
        for coord in probe.history().keys() {
            assert!(coord.in_bounds(), "out of bounds: {coord}");
        }
    }

    #[test]
    fn flat_plot_drains_backlog_and_exits() {
        // 2x2 seed grid at the corners. Each corner has two in-bounds fresh
        // neighbours (the clamped ones land back on the corner itself), none
        // improving on a flat plot, so the backlog drains with budget left.
        let config = GridWalkConfig::default().with_grid_dim(2);
        let mut probe = FakeProbe::new(QUERY_BUDGET, |_| 7);
        GridWalkProspector::new(config).prospect(&mut probe);

        // 4 seeds + 2 walk probes per corner.
        assert_eq!(probe.queries_used(), 12);
        assert_eq!(probe.queries_remaining(), QUERY_BUDGET - 12);
    }

    #[test]
    fn climbs_to_single_peak_on_stride_lattice() {
        // Peak three strides east of the (219, 219) seed, on a smooth slope.
        let peak = Coord::new(255, 219);
        let value = move |c: Coord| 1000 - ((c.x - peak.x).abs() + (c.y - peak.y).abs());

        let mut probe = FakeProbe::new(QUERY_BUDGET, value);
        GridWalkProspector::default().prospect(&mut probe);

        assert_eq!(probe.best_seen(), Some(1000));
        assert!(probe.was_queried(peak));
    }

    #[test]
    fn walk_inserts_exactly_one_on_improvement() {
        let mut probe = FakeProbe::new(QUERY_BUDGET, |c| c.x);
        let mut session = WalkSession::new(&mut probe, 12);
        session.last_pop_value = 100;
        session.walk_from(Coord::new(100, 100));

        assert_eq!(session.backlog.len(), 1);
        let (value, coord) = session.backlog.pop_best().unwrap();
        assert_eq!(coord, Coord::new(112, 100));
        assert_eq!(value, 112);
        assert_eq!(session.last_direction, Direction::East);
    }

    #[test]
    fn walk_inserts_nothing_without_improvement() {
        let mut probe = FakeProbe::new(QUERY_BUDGET, |_| 5);
        let mut session = WalkSession::new(&mut probe, 12);
        session.last_pop_value = 5; // ties are not improvements
        session.walk_from(Coord::new(100, 100));

        assert!(session.backlog.is_empty());
        assert_eq!(session.last_direction, Direction::North);
        assert_eq!(session.probe.queries_remaining(), QUERY_BUDGET - 4);
    }

    #[test]
    fn walk_resumes_from_last_successful_direction() {
        let mut probe = FakeProbe::new(QUERY_BUDGET, |c| c.x);
        let mut session = WalkSession::new(&mut probe, 12);
        session.last_pop_value = 100;
        session.walk_from(Coord::new(100, 100));
        assert_eq!(session.last_direction, Direction::East);

        // Next walk starts scanning east: exactly one query finds the
        // improvement immediately.
        let before = session.probe.queries_remaining();
        session.last_pop_value = 112;
        session.walk_from(Coord::new(112, 100));
        assert_eq!(session.probe.queries_remaining(), before - 1);
        assert_eq!(session.last_direction, Direction::East);
    }
}
