//! # pr-engine
//!
//! Simulation side of Prospector: in-memory plots, the budgeted probe the
//! strategies query through, synthetic terrain generation, and a runner that
//! races strategies over plots and reports outcomes.

pub mod plot;
pub mod runner;
pub mod terrain;

pub use plot::{Plot, PlotProbe};
pub use runner::{run_plot, run_series, PlotOutcome, RunSummary};
