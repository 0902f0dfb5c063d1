//! Race the prospecting strategies over a batch of synthetic plots.
//!
//! Environment:
//! - `PROSPECT_PLOTS`: number of plots to generate (default 10)
//! - `PROSPECT_SEED`: RNG seed for plot generation (default random)
//! - `PROSPECT_JSON`: set to emit full summaries as JSON instead of a table
//! - `RUST_LOG`: tracing filter, e.g. `pr_strategy=debug`

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pr_engine::{run_series, terrain};
use pr_strategy::{
    GridWalkProspector, NelderMeadProspector, Prospector, RandomRestartProspector,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let n_plots: usize = match std::env::var("PROSPECT_PLOTS") {
        Ok(v) => v.parse()?,
        Err(_) => 10,
    };
    let seed: u64 = match std::env::var("PROSPECT_SEED") {
        Ok(v) => v.parse()?,
        Err(_) => rand::rng().random(),
    };

    info!(n_plots, seed, "generating plots");
    let mut rng = StdRng::seed_from_u64(seed);
    let plots: Vec<_> = (0..n_plots)
        .map(|_| {
            let n_hills = rng.random_range(3..=8);
            terrain::hilly_plot(&mut rng, n_hills)
        })
        .collect();

    let mut prospectors: Vec<Box<dyn Prospector>> = vec![
        Box::new(GridWalkProspector::default()),
        Box::new(RandomRestartProspector::default()),
        Box::new(NelderMeadProspector::default()),
    ];

    let summaries: Vec<_> = prospectors
        .iter_mut()
        .map(|p| run_series(p.as_mut(), &plots))
        .collect();

    if std::env::var("PROSPECT_JSON").is_ok() {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("{:<16} {:>10} {:>10} {:>12}", "strategy", "mean", "best", "plots");
    for summary in &summaries {
        println!(
            "{:<16} {:>10.1} {:>10} {:>12}",
            summary.prospector,
            summary.mean_best,
            summary.best,
            summary.outcomes.len()
        );
    }

    Ok(())
}
