// src/mc/density.rs
//! Monte Carlo Kernel Density Estimate for Bridge Marginals
//!
//! # Mathematical Framework
//!
//! Given pairs `(x_i, y_i)` drawn from (source, target), the bridge marginal at
//! time `t` is the mixture
//! ```text
//! p_t(z) ≈ (1/N) Σᵢ N(z; a_t x_i + b_t y_i, (σ_t + h)²),    h = 0.05
//! ```
//! The pad `h` keeps the kernel finite where `σ_t = 0` (both ends of most
//! schedules). Accuracy scales with the number of pairs.

use super::bridge_engine::SamplePair;
use crate::error::{SdeError, SdeResult};
use crate::math_utils::{norm_pdf, rows_to_matrix};
use crate::models::bridge::{BridgeSchedule, BridgeType};
use ndarray::Array2;
use rayon::prelude::*;

/// Added to `σ_t` to form the kernel bandwidth
pub const KDE_BANDWIDTH_PAD: f64 = 0.05;

/// KDE heatmap of shape `(x_grid.len(), t_grid.len())`
///
/// # Errors
///
/// `InvalidConfiguration` if `pairs` is empty.
pub fn kde_grid(
    bridge: BridgeType,
    x_grid: &[f64],
    t_grid: &[f64],
    t_max: f64,
    sigma_max: f64,
    pairs: &[SamplePair],
) -> SdeResult<Array2<f64>> {
    if pairs.is_empty() {
        return Err(SdeError::InvalidConfiguration {
            field: "paths".to_string(),
            reason: "density estimate needs at least one sample pair".to_string(),
        });
    }

    let schedules: Vec<BridgeSchedule> = t_grid
        .iter()
        .map(|&t| bridge.schedule(t, t_max, sigma_max))
        .collect();
    let n = pairs.len() as f64;

    let rows: Vec<Vec<f64>> = x_grid
        .par_iter()
        .map(|&z| {
            schedules
                .iter()
                .map(|sched| {
                    let bandwidth = sched.sigma_t + KDE_BANDWIDTH_PAD;
                    pairs
                        .iter()
                        .map(|pair| norm_pdf(z, sched.mean(pair.x, pair.y), bandwidth))
                        .sum::<f64>()
                        / n
                })
                .collect()
        })
        .collect();

    rows_to_matrix(rows, t_grid.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math_utils::linspace;
    use approx::assert_relative_eq;

    fn pairs() -> Vec<SamplePair> {
        vec![
            SamplePair { x: -2.0, y: 2.0 },
            SamplePair { x: 0.0, y: 2.0 },
            SamplePair { x: 2.0, y: 2.0 },
        ]
    }

    #[test]
    fn test_single_pair_is_one_kernel() {
        let x_grid = [-1.0, 0.0, 1.0];
        let t_grid = [0.5];
        let pair = [SamplePair { x: -2.0, y: 2.0 }];
        let grid = kde_grid(BridgeType::Ddbm, &x_grid, &t_grid, 1.0, 0.8, &pair).unwrap();

        // DDBM at s = ½: mean 0, σ_t = σ_max
        for (i, &z) in x_grid.iter().enumerate() {
            assert_relative_eq!(grid[[i, 0]], norm_pdf(z, 0.0, 0.8 + KDE_BANDWIDTH_PAD));
        }
    }

    #[test]
    fn test_columns_carry_unit_mass() {
        let x_grid = linspace(-10.0, 10.0, 2001);
        let dx = x_grid[1] - x_grid[0];
        let t_grid = linspace(0.0, 1.0, 11);

        for bridge in BridgeType::ALL {
            let grid = kde_grid(bridge, &x_grid, &t_grid, 1.0, 0.8, &pairs()).unwrap();
            for j in 0..t_grid.len() {
                let mass = grid.column(j).sum() * dx;
                assert_relative_eq!(mass, 1.0, epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn test_endpoints_concentrate_on_pairs() {
        let x_grid = [-2.0, 2.0];
        let t_grid = [0.0, 1.0];
        let grid = kde_grid(BridgeType::I2sb, &x_grid, &t_grid, 1.0, 0.8, &pairs()).unwrap();

        // t = 0 sits on the sources, t = T on the (shared) target
        assert!(grid[[0, 0]] > 0.5);
        assert!(grid[[1, 1]] > 7.0);
        assert!(grid[[0, 1]] < 1e-6);
    }

    #[test]
    fn test_empty_pairs_rejected() {
        assert!(kde_grid(BridgeType::Ddbm, &[0.0], &[0.0], 1.0, 0.8, &[]).is_err());
    }
}
