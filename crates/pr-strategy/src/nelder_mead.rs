//! Bounded Nelder-Mead with probabilistic restarts.
//!
//! Runs the classic downhill-simplex method (on the negated plot value, so
//! descent means improvement) over the plot rectangle, restarting from
//! low-density regions when a simplex converges. Restart points are chosen by
//! sampling a handful of uniform candidates and keeping the one least covered
//! by a sum of Gaussians centred on earlier start/best points, so successive
//! passes explore fresh territory.
//!
//! Evaluations are memoized through the probe's query history: re-evaluating
//! a rounded coordinate that was already queried costs no budget.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use pr_types::{Coord, Probe, MAP_SIZE, QUERY_BUDGET};

use crate::Prospector;

/// Gaussian length parameter for the restart density.
const GAUSS_LENGTH: f32 = 0.01;

/// Tuning for [`NelderMeadProspector`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NelderMeadConfig {
    /// Maximum restarts before giving up.
    pub max_restarts: u32,
    /// Ceiling on objective evaluations (memoized hits included).
    pub max_evals: u32,
    /// Uniform candidates considered per restart.
    pub random_points_per_restart: u32,
    /// Simplex iterations allowed per restart.
    pub max_iterations_per_restart: u32,
    /// Reflection coefficient.
    pub alpha: f32,
    /// Contraction coefficient.
    pub beta: f32,
    /// Expansion coefficient.
    pub gamma: f32,
    /// Flat-simplex convergence threshold (stddev of vertex values).
    pub epsilon: f32,
    /// Small-simplex convergence threshold (normalized extent).
    pub sigma: f32,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_restarts: 100,
            max_evals: QUERY_BUDGET,
            random_points_per_restart: 5,
            max_iterations_per_restart: 15,
            alpha: 1.0,
            beta: 0.5,
            gamma: 2.0,
            epsilon: 1.0,
            sigma: 10.0 / MAP_SIZE as f32,
        }
    }
}

impl NelderMeadConfig {
    pub fn with_max_evals(mut self, n: u32) -> Self {
        self.max_evals = n;
        self
    }

    pub fn with_max_restarts(mut self, n: u32) -> Self {
        self.max_restarts = n;
        self
    }
}

/// The restarted Nelder-Mead strategy.
pub struct NelderMeadProspector {
    config: NelderMeadConfig,
    rng: StdRng,
}

impl NelderMeadProspector {
    pub fn new(config: NelderMeadConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic variant for tests and reproducible runs.
    pub fn seeded(config: NelderMeadConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for NelderMeadProspector {
    fn default() -> Self {
        Self::new(NelderMeadConfig::default())
    }
}

impl Prospector for NelderMeadProspector {
    fn name(&self) -> &str {
        "nelder_mead"
    }

    fn prospect(&mut self, probe: &mut dyn Probe) {
        let bounds = Bounds {
            min: Vec2::new(-0.5, -0.5),
            max: Vec2::new(MAP_SIZE as f32 - 0.5, MAP_SIZE as f32 - 0.5),
        };
        let mut objective = Objective {
            probe,
            evals: 0,
            max_evals: self.config.max_evals,
        };
        self.minimize(&mut objective, &bounds);
    }
}

impl NelderMeadProspector {
    fn minimize(&mut self, objective: &mut Objective<'_>, bounds: &Bounds) {
        let range = bounds.range();
        let mut used: Vec<RestartRecord> = Vec::new();

        'restarts: for restart in 0..self.config.max_restarts {
            let initial = self.restart_point(&used, bounds);
            debug!(restart, x = f64::from(initial.x), y = f64::from(initial.y), "simplex restart");

            // Simplex edge between 2% and 10% of the shorter axis.
            let a = (0.02 + 0.08 * self.rng.random::<f32>()) * range.x.min(range.y);
            let mut simplex = initial_simplex(initial, a, bounds);
            let mut values = [0.0f32; 3];
            for (slot, vertex) in values.iter_mut().zip(simplex.vertices()) {
                let Some(v) = objective.eval(vertex) else {
                    break 'restarts;
                };
                *slot = v;
            }

            for _ in 0..self.config.max_iterations_per_restart {
                sort_by_value(&mut simplex, &mut values);
                let best = simplex.p1;
                let worst = simplex.p3;
                let centroid = (simplex.p1 + simplex.p2) * 0.5;

                if std_dev(&values) < self.config.epsilon {
                    break; // flat simplex
                }
                let extent = simplex.bounds();
                let normalized = ((extent.max.x - extent.min.x) / range.x)
                    .max((extent.max.y - extent.min.y) / range.y);
                if normalized < self.config.sigma {
                    break; // small simplex
                }
                if simplex.area() < 2.0 {
                    break; // degenerate simplex
                }

                let reflection = bounds.snap(centroid + (centroid - worst) * self.config.alpha);
                let Some(at_reflection) = objective.eval(reflection) else {
                    break 'restarts;
                };

                if at_reflection < values[0] {
                    // Better than the best vertex: try stretching further out.
                    let expansion =
                        bounds.snap(centroid + (reflection - centroid) * self.config.gamma);
                    let Some(at_expansion) = objective.eval(expansion) else {
                        break 'restarts;
                    };
                    if at_expansion < at_reflection {
                        simplex.p3 = expansion;
                        values[2] = at_expansion;
                    } else {
                        simplex.p3 = reflection;
                        values[2] = at_reflection;
                    }
                } else if at_reflection <= values[1] {
                    simplex.p3 = reflection;
                    values[2] = at_reflection;
                } else {
                    // Worse than the second vertex: keep it only if it still
                    // beats the worst, then contract.
                    if at_reflection < values[2] {
                        simplex.p3 = reflection;
                        values[2] = at_reflection;
                    }
                    let contraction = centroid + (worst - centroid) * self.config.beta;
                    let Some(at_contraction) = objective.eval(contraction) else {
                        break 'restarts;
                    };
                    if at_contraction <= values[1] {
                        // Contraction did not help either; shrink the whole
                        // simplex toward the best vertex (not the centroid).
                        simplex.p2 = (simplex.p2 + best) * 0.5;
                        simplex.p3 = (simplex.p3 + best) * 0.5;
                    } else {
                        simplex.p3 = contraction;
                        values[2] = at_contraction;
                    }
                }
            }

            used.push(RestartRecord {
                initial,
                best: simplex.p1,
            });
        }
    }

    /// Pick the next restart point: the least-covered of a few uniform
    /// samples, judged by a Gaussian density over earlier start/best points.
    fn restart_point(&mut self, used: &[RestartRecord], bounds: &Bounds) -> Vec2 {
        let range = bounds.range();
        let mut best_density = f32::INFINITY;
        let mut best_point = Vec2::new(0.0, 0.0);

        for _ in 0..=self.config.random_points_per_restart {
            let candidate = Vec2::new(
                bounds.min.x + range.x * self.rng.random::<f32>(),
                bounds.min.y + range.y * self.rng.random::<f32>(),
            );
            let density = gauss_density(candidate, used, bounds);
            if density < best_density {
                best_density = density;
                best_point = candidate;
            }
        }

        best_point
    }
}

/// Budget-capped, history-memoized objective: the negated plot value at the
/// nearest integer coordinate.
struct Objective<'a> {
    probe: &'a mut dyn Probe,
    evals: u32,
    max_evals: u32,
}

impl Objective<'_> {
    /// `None` once the evaluation ceiling is hit; callers unwind cleanly.
    fn eval(&mut self, p: Vec2) -> Option<f32> {
        if self.evals >= self.max_evals {
            return None;
        }
        self.evals += 1;

        let coord = Coord::clamped(p.x.round() as i32, p.y.round() as i32);
        let value = match self.probe.queried_value(coord) {
            Some(known) => known,
            None => self.probe.query(coord),
        };
        Some(-(value as f32))
    }
}

/// One completed restart, kept for the restart-density penalty.
struct RestartRecord {
    initial: Vec2,
    best: Vec2,
}

/// Sum of Gaussians centred on every recorded start and best point.
fn gauss_density(x: Vec2, used: &[RestartRecord], bounds: &Bounds) -> f32 {
    let range = bounds.range();
    let divisor = 2.0 * std::f32::consts::PI * GAUSS_LENGTH * range.x * range.y;

    used.iter()
        .flat_map(|r| [r.best, r.initial])
        .map(|point| {
            let ratio = (x - point).div_elem(range);
            let exponent = (ratio.x * ratio.x + ratio.y * ratio.y) / (-2.0 * GAUSS_LENGTH);
            exponent.exp() / divisor
        })
        .sum()
}

/// Right-triangle simplex of size `a` anchored at `p1`, snapped to bounds.
fn initial_simplex(p1: Vec2, a: f32, bounds: &Bounds) -> Simplex {
    let p = a * (3.0f32.sqrt() + 1.0) / (2.0 * 2.0f32.sqrt());
    let q = a * (3.0f32.sqrt() - 1.0) / (2.0 * 2.0f32.sqrt());

    Simplex {
        p1,
        p2: bounds.snap(Vec2::new(p1.x + p, p1.y + q)),
        p3: bounds.snap(Vec2::new(p1.x + q, p1.y + p)),
    }
}

/// Sort vertices (and their values) from best (smallest) to worst.
fn sort_by_value(simplex: &mut Simplex, values: &mut [f32; 3]) {
    let mut pairs = [
        (simplex.p1, values[0]),
        (simplex.p2, values[1]),
        (simplex.p3, values[2]),
    ];
    pairs.sort_by(|a, b| a.1.total_cmp(&b.1));
    simplex.p1 = pairs[0].0;
    simplex.p2 = pairs[1].0;
    simplex.p3 = pairs[2].0;
    *values = [pairs[0].1, pairs[1].1, pairs[2].1];
}

fn std_dev(values: &[f32; 3]) -> f32 {
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    let sum_sq: f32 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (sum_sq / values.len() as f32).sqrt()
}

/// A 2-D float vector over the plot rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Vec2 {
    x: f32,
    y: f32,
}

impl Vec2 {
    fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn div_elem(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x / other.x, self.y / other.y)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;
    fn add(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x + o.x, self.y + o.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x - o.x, self.y - o.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f32) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }
}

/// Axis-aligned bounding rectangle.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: Vec2,
    max: Vec2,
}

impl Bounds {
    fn snap(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.min(self.max.x).max(self.min.x),
            p.y.min(self.max.y).max(self.min.y),
        )
    }

    fn range(&self) -> Vec2 {
        Vec2::new(self.max.x - self.min.x, self.max.y - self.min.y)
    }
}

/// A triangle of candidate points.
#[derive(Debug, Clone, Copy)]
struct Simplex {
    p1: Vec2,
    p2: Vec2,
    p3: Vec2,
}

impl Simplex {
    fn vertices(&self) -> [Vec2; 3] {
        [self.p1, self.p2, self.p3]
    }

    fn bounds(&self) -> Bounds {
        Bounds {
            min: Vec2::new(
                self.p1.x.min(self.p2.x).min(self.p3.x),
                self.p1.y.min(self.p2.y).min(self.p3.y),
            ),
            max: Vec2::new(
                self.p1.x.max(self.p2.x).max(self.p3.x),
                self.p1.y.max(self.p2.y).max(self.p3.y),
            ),
        }
    }

    /// Shoelace formula.
    fn area(&self) -> f32 {
        ((self.p1.x - self.p3.x) * (self.p2.y - self.p3.y)
            - (self.p2.x - self.p3.x) * (self.p1.y - self.p3.y))
            .abs()
            / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeProbe;

    #[test]
    fn objective_memoizes_through_history() {
        let mut probe = FakeProbe::new(QUERY_BUDGET, |c| c.x + c.y);
        let mut objective = Objective {
            probe: &mut probe,
            evals: 0,
            max_evals: 10,
        };

        let p = Vec2::new(100.2, 50.4);
        assert_eq!(objective.eval(p), Some(-150.0));
        let spent = objective.probe.queries_remaining();

        // Same rounded coordinate: counts as an eval, costs no budget.
        assert_eq!(objective.eval(Vec2::new(99.9, 50.1)), Some(-150.0));
        assert_eq!(objective.probe.queries_remaining(), spent);
        assert_eq!(objective.evals, 2);
    }

    #[test]
    fn objective_stops_at_eval_ceiling() {
        let mut probe = FakeProbe::new(QUERY_BUDGET, |_| 1);
        let mut objective = Objective {
            probe: &mut probe,
            evals: 0,
            max_evals: 2,
        };
        assert!(objective.eval(Vec2::new(0.0, 0.0)).is_some());
        assert!(objective.eval(Vec2::new(50.0, 50.0)).is_some());
        assert!(objective.eval(Vec2::new(100.0, 100.0)).is_none());
    }

    #[test]
    fn objective_rounds_and_clamps_into_bounds() {
        let mut probe = FakeProbe::new(QUERY_BUDGET, |c| c.x);
        let mut objective = Objective {
            probe: &mut probe,
            evals: 0,
            max_evals: 10,
        };
        // Bound corner: -0.5 rounds away from zero, the clamp pulls it back.
        objective.eval(Vec2::new(-0.5, 511.5));
        for coord in probe.history().keys() {
            assert!(coord.in_bounds());
        }
    }

    #[test]
    fn simplex_area_shoelace() {
        let s = Simplex {
            p1: Vec2::new(0.0, 0.0),
            p2: Vec2::new(4.0, 0.0),
            p3: Vec2::new(0.0, 3.0),
        };
        assert!((s.area() - 6.0).abs() < 1e-6);
    }

    #[test]
    fn sort_orders_best_first() {
        let mut simplex = Simplex {
            p1: Vec2::new(1.0, 0.0),
            p2: Vec2::new(2.0, 0.0),
            p3: Vec2::new(3.0, 0.0),
        };
        let mut values = [5.0, -2.0, 1.0];
        sort_by_value(&mut simplex, &mut values);
        assert_eq!(values, [-2.0, 1.0, 5.0]);
        assert_eq!(simplex.p1, Vec2::new(2.0, 0.0));
        assert_eq!(simplex.p3, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn std_dev_flat_is_zero() {
        assert_eq!(std_dev(&[3.0, 3.0, 3.0]), 0.0);
        assert!(std_dev(&[0.0, 10.0, 20.0]) > 1.0);
    }

    #[test]
    fn snap_pins_to_rectangle() {
        let bounds = Bounds {
            min: Vec2::new(-0.5, -0.5),
            max: Vec2::new(511.5, 511.5),
        };
        assert_eq!(bounds.snap(Vec2::new(-3.0, 600.0)), Vec2::new(-0.5, 511.5));
        assert_eq!(bounds.snap(Vec2::new(10.0, 10.0)), Vec2::new(10.0, 10.0));
    }

    #[test]
    fn full_run_stays_within_budget_and_bounds() {
        let peak = Coord::new(310, 180);
        let value = move |c: Coord| {
            let dx = (c.x - peak.x) as f64;
            let dy = (c.y - peak.y) as f64;
            (1000.0 - (dx * dx + dy * dy).sqrt()) as i32
        };
        let mut probe = FakeProbe::new(QUERY_BUDGET, value);
        NelderMeadProspector::seeded(NelderMeadConfig::default(), 7).prospect(&mut probe);

        assert!(probe.queries_used() > 0);
        assert!(probe.queries_used() <= QUERY_BUDGET as usize);
        for coord in probe.history().keys() {
            assert!(coord.in_bounds(), "out of bounds: {coord}");
        }
        // 100 evaluations of a smooth bowl should comfortably beat the
        // plot-wide average value.
        assert!(probe.best_seen().unwrap() > 700);
    }

    #[test]
    fn zero_budget_issues_no_queries() {
        let mut probe = FakeProbe::new(0, |_| 42);
        NelderMeadProspector::seeded(NelderMeadConfig::default(), 9).prospect(&mut probe);
        assert_eq!(probe.queries_used(), 0);
    }
}
