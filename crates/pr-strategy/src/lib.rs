//! # pr-strategy
//!
//! Bounded-query prospecting strategies for Prospector.
//!
//! Each strategy implements [`Prospector`] and spends a plot's query budget
//! through the [`Probe`](pr_types::Probe) capability, trying to surface the
//! highest hidden value it can. Scoring is external: a strategy's only job is
//! to choose good coordinates.

mod backlog;
mod grid_walk;
mod nelder_mead;
mod restart;

pub use backlog::ValueBacklog;
pub use grid_walk::{GridWalkConfig, GridWalkProspector};
pub use nelder_mead::{NelderMeadConfig, NelderMeadProspector};
pub use restart::{RandomRestartConfig, RandomRestartProspector};

use pr_types::Probe;

/// Common trait for all prospecting strategies.
pub trait Prospector {
    /// Human-readable strategy name.
    fn name(&self) -> &str;

    /// Spend the probe's budget searching the plot. Session state is created
    /// fresh per call; invocations never contaminate each other.
    fn prospect(&mut self, probe: &mut dyn Probe);
}
