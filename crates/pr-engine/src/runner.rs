//! Runs strategies over plots and reports how they did.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use pr_strategy::Prospector;
use pr_types::{Probe, QUERY_BUDGET};

use crate::plot::{Plot, PlotProbe};

/// What one strategy achieved on one plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotOutcome {
    pub id: Uuid,
    pub prospector: String,
    /// Highest value the strategy surfaced; its score for the plot.
    pub best_value: i32,
    /// True plot maximum, for judging how close the run got.
    pub plot_max: i32,
    pub queries_used: u32,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl PlotOutcome {
    /// Fraction of the plot's true maximum that was found, in [0, 1].
    pub fn efficiency(&self) -> f64 {
        if self.plot_max <= 0 {
            return 0.0;
        }
        f64::from(self.best_value.max(0)) / f64::from(self.plot_max)
    }
}

/// Aggregate over a series of plots for one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub prospector: String,
    pub outcomes: Vec<PlotOutcome>,
    pub mean_best: f64,
    pub best: i32,
}

/// Run one strategy over one plot with the given budget.
pub fn run_plot(prospector: &mut dyn Prospector, plot: &Plot, budget: u32) -> PlotOutcome {
    let started_at = Utc::now();
    let clock = Instant::now();

    let mut probe = PlotProbe::with_budget(plot, budget);
    prospector.prospect(&mut probe);

    let outcome = PlotOutcome {
        id: Uuid::new_v4(),
        prospector: prospector.name().to_string(),
        best_value: probe.best_value(),
        plot_max: plot.max_value(),
        queries_used: budget - probe.queries_remaining(),
        started_at,
        duration_ms: clock.elapsed().as_millis() as u64,
    };
    info!(
        prospector = %outcome.prospector,
        best = outcome.best_value,
        plot_max = outcome.plot_max,
        queries = outcome.queries_used,
        "plot complete"
    );
    outcome
}

/// Run one strategy over a series of plots with the default budget.
pub fn run_series(prospector: &mut dyn Prospector, plots: &[Plot]) -> RunSummary {
    let mut outcomes = Vec::with_capacity(plots.len());
    for (i, plot) in plots.iter().enumerate() {
        debug!(plot = i, prospector = prospector.name(), "starting plot");
        outcomes.push(run_plot(prospector, plot, QUERY_BUDGET));
    }

    let best = outcomes.iter().map(|o| o.best_value).max().unwrap_or(0);
    let mean_best = if outcomes.is_empty() {
        0.0
    } else {
        outcomes.iter().map(|o| f64::from(o.best_value)).sum::<f64>() / outcomes.len() as f64
    };

    RunSummary {
        prospector: prospector.name().to_string(),
        outcomes,
        mean_best,
        best,
    }
}
