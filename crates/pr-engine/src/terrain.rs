//! Synthetic plots for tests and simulation runs.

use rand::Rng;

use pr_types::MAP_SIZE;

use crate::plot::Plot;

/// Peak value of a generated plot after normalization.
pub const PEAK_VALUE: i32 = 1000;

/// Generate a plot as a sum of `n_hills` random Gaussian bumps, normalized so
/// the highest cell is exactly [`PEAK_VALUE`].
pub fn hilly_plot<R: Rng>(rng: &mut R, n_hills: usize) -> Plot {
    let size = MAP_SIZE as usize;
    let mut field = vec![0.0f64; size * size];

    for _ in 0..n_hills.max(1) {
        let cx = rng.random_range(0.0..MAP_SIZE as f64);
        let cy = rng.random_range(0.0..MAP_SIZE as f64);
        let amplitude = rng.random_range(200.0..1000.0);
        let sigma = rng.random_range(30.0..120.0);
        let denom = 2.0 * sigma * sigma;

        for y in 0..size {
            let dy = y as f64 - cy;
            for x in 0..size {
                let dx = x as f64 - cx;
                field[y * size + x] += amplitude * (-(dx * dx + dy * dy) / denom).exp();
            }
        }
    }

    let max = field.iter().copied().fold(0.0f64, f64::max);
    let scale = if max > 0.0 {
        PEAK_VALUE as f64 / max
    } else {
        0.0
    };
    let values = field.iter().map(|v| (v * scale).round() as i32).collect();

    // Length is size * size by construction.
    Plot::new(values).expect("generated grid has the right dimensions")
}
