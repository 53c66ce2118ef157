// src/analytics/sde_density.rs
//! Closed-form marginal densities of the forward SDEs
//!
//! # Mathematical Framework
//!
//! For a linear forward SDE the marginal at time `t` is the data distribution
//! scaled by `μ(t)` and convolved with `N(0, v(t))`:
//! ```text
//! p_t(x) = p_data(·; μ(t), √(v(t) + ε))(x),    ε = 0.05
//! ```
//! `ε` keeps the kernel from collapsing at `t = 0`, where `v(0) = 0`.
//!
//! The heatmap is stored spatial-major: `density[[i, j]] = p_{t_j}(x_i)`.

use crate::distributions::InitialDistribution;
use crate::error::SdeResult;
use crate::math_utils::{norm_pdf, rows_to_matrix};
use crate::models::forward_sde::SdeType;
use ndarray::Array2;
use rayon::prelude::*;

/// Variance added to `v(t)` before taking the kernel width
pub const DENSITY_VARIANCE_FLOOR: f64 = 0.05;

/// Width used for the reference data marginal
pub const DATA_MARGINAL_SIGMA: f64 = 0.2;

/// Marginal density `p_t(x)` at one grid cell
pub fn marginal_density(sde: SdeType, dist: InitialDistribution, x: f64, t: f64) -> f64 {
    let mu = sde.mu_decay(t);
    let sigma = (sde.variance(t) + DENSITY_VARIANCE_FLOOR).sqrt();
    dist.pdf(x, mu, sigma)
}

/// Density heatmap of shape `(x_grid.len(), t_grid.len())`
pub fn density_grid(
    sde: SdeType,
    dist: InitialDistribution,
    x_grid: &[f64],
    t_grid: &[f64],
) -> SdeResult<Array2<f64>> {
    // (μ, σ) depend only on t; compute once per column
    let columns: Vec<(f64, f64)> = t_grid
        .iter()
        .map(|&t| {
            (
                sde.mu_decay(t),
                (sde.variance(t) + DENSITY_VARIANCE_FLOOR).sqrt(),
            )
        })
        .collect();

    let rows: Vec<Vec<f64>> = x_grid
        .par_iter()
        .map(|&x| {
            columns
                .iter()
                .map(|&(mu, sigma)| dist.pdf(x, mu, sigma))
                .collect()
        })
        .collect();

    rows_to_matrix(rows, t_grid.len())
}

/// Data density on the spatial grid, lightly smoothed
pub fn data_marginal(dist: InitialDistribution, x_grid: &[f64]) -> Vec<f64> {
    x_grid
        .iter()
        .map(|&x| dist.pdf(x, 1.0, DATA_MARGINAL_SIGMA))
        .collect()
}

/// Standard normal prior on the spatial grid
pub fn prior_marginal(x_grid: &[f64]) -> Vec<f64> {
    x_grid.iter().map(|&x| norm_pdf(x, 0.0, 1.0)).collect()
}
