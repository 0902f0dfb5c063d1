//! Plots and the budgeted probe over them.

use std::collections::HashMap;

use pr_types::{Coord, PrResult, Probe, MAP_SIZE, QUERY_BUDGET};

/// A fully known value grid, row-major, `MAP_SIZE` per side. Strategies never
/// see this directly; they go through [`PlotProbe`].
#[derive(Debug, Clone)]
pub struct Plot {
    values: Vec<i32>,
}

impl Plot {
    /// Wrap a row-major value grid. The length must be exactly
    /// `MAP_SIZE * MAP_SIZE`.
    pub fn new(values: Vec<i32>) -> PrResult<Self> {
        let expected = (MAP_SIZE * MAP_SIZE) as usize;
        if values.len() != expected {
            return Err(pr_types::validation_error!(
                "plot has {} values, expected {expected}",
                values.len()
            ));
        }
        Ok(Self { values })
    }

    pub fn value_at(&self, coord: Coord) -> i32 {
        debug_assert!(coord.in_bounds());
        self.values[(coord.y * MAP_SIZE + coord.x) as usize]
    }

    /// The true global maximum; handy for judging how close a run got.
    pub fn max_value(&self) -> i32 {
        self.values.iter().copied().max().unwrap_or(0)
    }
}

/// Budgeted query access to one [`Plot`]. One probe per strategy per plot;
/// never reused across sessions.
#[derive(Debug)]
pub struct PlotProbe<'a> {
    plot: &'a Plot,
    remaining: u32,
    history: HashMap<Coord, i32>,
}

impl<'a> PlotProbe<'a> {
    pub fn new(plot: &'a Plot) -> Self {
        Self::with_budget(plot, QUERY_BUDGET)
    }

    pub fn with_budget(plot: &'a Plot, budget: u32) -> Self {
        Self {
            plot,
            remaining: budget,
            history: HashMap::new(),
        }
    }

    /// Everything queried this session.
    pub fn history(&self) -> &HashMap<Coord, i32> {
        &self.history
    }

    /// Highest value revealed so far; this is the session's score.
    pub fn best_value(&self) -> i32 {
        self.history.values().copied().max().unwrap_or(0)
    }
}

impl Probe for PlotProbe<'_> {
    fn queries_remaining(&self) -> u32 {
        self.remaining
    }

    fn query(&mut self, coord: Coord) -> i32 {
        if self.remaining == 0 {
            return 0;
        }
        self.remaining -= 1;
        let value = self.plot.value_at(coord);
        self.history.insert(coord, value);
        value
    }

    fn queried_value(&self, coord: Coord) -> Option<i32> {
        self.history.get(&coord).copied()
    }
}
